pub mod fsm;
pub mod fsm_tests;
pub mod timing;

pub use fsm::CancelToken;
pub use fsm::CarFSM;
pub use fsm::Step;
pub use fsm::TokenSource;
pub use timing::TimingModel;
