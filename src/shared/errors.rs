/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Phase;

/***************************************/
/*               Errors                */
/***************************************/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("floor {floor} is outside the building (floors 0..{floor_count})")]
    InvalidRequest { floor: u8, floor_count: u8 },
    #[error(transparent)]
    Commit(#[from] CommitError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("car {index} is already committed ({phase:?})")]
    Busy { index: usize, phase: Phase },
    #[error("there is no car {index}")]
    UnknownCar { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` expects {1} argument(s)")]
    Arity(String, usize),
    #[error("`{0}` is not a valid number")]
    Number(String),
    #[error("`{0}` is not a direction (up/down)")]
    Direction(String),
    #[error("floor 0 has no up button")]
    UpFromGround,
}
