//! Error types for the resource model.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while assembling or serializing a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Duplicate resource logical id: {0}")]
    DuplicateResource(String),

    #[error("Duplicate output name: {0}")]
    DuplicateOutput(String),

    #[error("Invalid logical id '{0}': must be non-empty and alphanumeric")]
    InvalidLogicalId(String),

    #[error("Resource '{from}' references unknown resource '{target}'")]
    DanglingReference { from: String, target: String },

    #[error("Invalid policy statement: {0}")]
    InvalidStatement(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
