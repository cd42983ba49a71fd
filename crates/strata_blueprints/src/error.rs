//! Error types for blueprints.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for blueprint operations.
pub type BlueprintResult<T> = Result<T, BlueprintError>;

/// Errors that can occur while building or configuring blueprints.
#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("Variable error: {0}")]
    Variables(#[from] strata_vars::VarsError),

    #[error("Template error: {0}")]
    Template(#[from] strata_template::TemplateError),

    #[error(
        "Configuration error: InternetGatewayId ({internet_gateway_id}) and NatGatewayId ({nat_gateway_id}) \
         cannot both be set; a subnet is either public or routed through an existing NAT gateway"
    )]
    GatewayConflict {
        internet_gateway_id: String,
        nat_gateway_id: String,
    },

    #[error(
        "Configuration error: NatGatewayId ({nat_gateway_id}) cannot be combined with CreateNatGateway; \
         reuse the existing NAT gateway or create a new one"
    )]
    AmbiguousNatGateway { nat_gateway_id: String },

    #[error("Configuration error: CreateNatGateway requires InternetGatewayId")]
    NatGatewayWithoutInternetGateway,

    #[error("Configuration error: one of InternetGatewayId or NatGatewayId must be set")]
    MissingGateway,

    #[error("Configuration error: LogConfiguration and LogGroup ({log_group}) cannot both be set")]
    LogConfigurationConflict { log_group: String },

    #[error("Configuration error: invalid CloudWatch log group name: {log_group}")]
    InvalidLogGroupName { log_group: String },

    #[error("Configuration error: invalid policy statement in {variable}: {message}")]
    InvalidPolicyStatement { variable: String, message: String },

    #[error("Blueprint not found: {0}")]
    UnknownBlueprint(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Duplicate stack name in config: {0}")]
    DuplicateStack(String),

    #[error("Invalid stack config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("No value provided for config placeholder: ${{{0}}}")]
    MissingEnvironmentValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BlueprintError {
    /// Whether this error comes from a contradictory combination of inputs.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            BlueprintError::GatewayConflict { .. }
                | BlueprintError::AmbiguousNatGateway { .. }
                | BlueprintError::NatGatewayWithoutInternetGateway
                | BlueprintError::MissingGateway
                | BlueprintError::LogConfigurationConflict { .. }
                | BlueprintError::InvalidLogGroupName { .. }
                | BlueprintError::InvalidPolicyStatement { .. }
        )
    }
}
