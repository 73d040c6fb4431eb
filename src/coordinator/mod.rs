pub mod bank;
pub mod coordinator;
pub mod dispatcher;
pub mod pool;
pub mod queue;
pub mod timers;

pub use bank::Bank;
pub use bank::ServiceOutcome;
pub use coordinator::Command;
pub use coordinator::Coordinator;
pub use dispatcher::select_car;
pub use queue::RequestQueue;
