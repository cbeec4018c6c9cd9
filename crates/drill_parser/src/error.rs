use drill_ast::AstError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    NomError(String),
    #[error("Unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("Empty input")]
    Empty,
    #[error("Invalid arguments to {function}: {reason}")]
    InvalidArguments { function: String, reason: String },
    #[error("Tuple is only allowed as a calculus operator argument")]
    MisplacedTuple,
    #[error("Invalid assumption: {0}")]
    InvalidAssumption(String),
    #[error(transparent)]
    Symbol(#[from] AstError),
}

impl ParseError {
    pub(crate) fn args(function: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidArguments {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}
