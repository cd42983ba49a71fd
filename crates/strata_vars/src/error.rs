//! Error types for variable resolution.

use thiserror::Error;

/// Result type alias for variable operations.
pub type VarsResult<T> = Result<T, VarsError>;

/// Errors that can occur while resolving blueprint variables.
#[derive(Error, Debug, PartialEq)]
pub enum VarsError {
    #[error("Missing required variable: {0}")]
    MissingVariable(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Variable '{name}' expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Invalid resource in variable '{name}': {message}")]
    InvalidResource { name: String, message: String },
}
