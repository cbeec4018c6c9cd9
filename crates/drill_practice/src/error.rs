use drill_engine::EngineError;
use drill_parser::ParseError;
use thiserror::Error;

use crate::problem::{ProblemId, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Problem {0} does not exist")]
    UnknownProblem(ProblemId),
    #[error("Problem {0} already exists")]
    DuplicateProblem(ProblemId),
    #[error("User {0} is not enrolled")]
    UnknownUser(UserId),
    #[error("Store state is poisoned")]
    Poisoned,
    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// Why a submission produced no verdict. No attempt is recorded for any of
/// these.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Problem with id {0} does not exist")]
    NotFound(ProblemId),
    #[error("Problem {problem} has an invalid {field}: {source}")]
    InvalidProblemData {
        problem: ProblemId,
        field: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("Answer did not follow correct format and could not be parsed: {0}")]
    InvalidAnswerFormat(#[source] ParseError),
    #[error("Answer matches problem symbolically. Please answer with a simplified version of the problem")]
    TrivialAnswerRejected,
    #[error("Answer is too complex to check: {0}")]
    ComplexityExceeded(#[from] EngineError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing config file: {0}")]
    Toml(#[from] toml::de::Error),
}
