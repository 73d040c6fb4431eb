pub mod errors;
pub mod macros;
pub mod structs;

pub use errors::BankError;
pub use errors::CommitError;
pub use errors::ConfigError;
pub use errors::ParseError;
pub use structs::BankSnapshot;
pub use structs::CarSnapshot;
pub use structs::Direction;
pub use structs::Phase;
pub use structs::Request;
