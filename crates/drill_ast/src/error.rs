//! Error types for drill_ast crate.

use thiserror::Error;

/// Errors that can occur in AST operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// Symbol names must be identifiers: a letter or underscore followed by
    /// letters, digits or underscores.
    #[error("invalid symbol name '{0}'")]
    InvalidSymbol(String),
}
