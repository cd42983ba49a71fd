//! Container log configuration and the log group it implies.
//!
//! The log group used by the container is computed once here. Both the
//! container definition and the execution role policy read it from the same
//! [`ContainerLogging`] value.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use strata_template::{Pseudo, Value};
use strata_vars::ResourceLiteral;

use crate::error::{BlueprintError, BlueprintResult};

/// The log driver that writes to CloudWatch Logs.
pub const AWSLOGS_DRIVER: &str = "awslogs";

fn log_group_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\.\-_/#A-Za-z0-9]{1,512}$").expect("log group pattern is valid"))
}

/// Whether `name` is a valid CloudWatch Logs group name.
///
/// The name ends up inside an `Fn::Sub` ARN, so anything outside this
/// character set would be read as a substitution.
pub fn is_valid_log_group_name(name: &str) -> bool {
    log_group_pattern().is_match(name)
}

/// Where the log group name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogGroupOrigin {
    /// Synthesized from the service name and declared by this template.
    ServiceName,
    /// Named by the `LogGroup` variable; managed elsewhere.
    Named,
    /// Taken from an explicit log configuration.
    Explicit,
}

/// Resolved logging for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerLogging {
    configuration: Value,
    log_group: Option<String>,
    origin: LogGroupOrigin,
}

impl ContainerLogging {
    /// Derive the logging setup from the service variables.
    pub fn resolve(
        service_name: &str,
        explicit: Option<&ResourceLiteral>,
        named_group: Option<&str>,
    ) -> BlueprintResult<Self> {
        let named_group = named_group.filter(|g| !g.is_empty());

        let logging = match (explicit, named_group) {
            (Some(_), Some(group)) => {
                return Err(BlueprintError::LogConfigurationConflict {
                    log_group: group.to_string(),
                })
            }
            (Some(literal), None) => {
                let driver = literal.get("LogDriver").and_then(|d| d.as_str());
                let log_group = match driver {
                    Some(AWSLOGS_DRIVER) => literal
                        .get("Options")
                        .and_then(|o| o.get("awslogs-group"))
                        .and_then(|g| g.as_str())
                        .map(String::from),
                    _ => None,
                };
                Self {
                    configuration: Value::Map(literal.to_properties()),
                    log_group,
                    origin: LogGroupOrigin::Explicit,
                }
            }
            (None, Some(group)) => Self::awslogs(service_name, group, LogGroupOrigin::Named),
            (None, None) => Self::awslogs(service_name, service_name, LogGroupOrigin::ServiceName),
        };

        if let Some(group) = logging.log_group.as_deref() {
            if !is_valid_log_group_name(group) {
                return Err(BlueprintError::InvalidLogGroupName {
                    log_group: group.to_string(),
                });
            }
        }

        debug!(
            "Container logging for {}: group {:?} ({:?})",
            service_name, logging.log_group, logging.origin
        );
        Ok(logging)
    }

    fn awslogs(service_name: &str, group: &str, origin: LogGroupOrigin) -> Self {
        let configuration = Value::object([
            ("LogDriver", Value::str(AWSLOGS_DRIVER)),
            (
                "Options",
                Value::object([
                    ("awslogs-group", Value::str(group)),
                    ("awslogs-region", Value::from(Pseudo::Region)),
                    ("awslogs-stream-prefix", Value::str(service_name)),
                ]),
            ),
        ]);

        Self {
            configuration,
            log_group: Some(group.to_string()),
            origin,
        }
    }

    /// Value for the container definition's `LogConfiguration`.
    pub fn configuration(&self) -> &Value {
        &self.configuration
    }

    /// The CloudWatch log group the container writes to, if any.
    pub fn log_group(&self) -> Option<&str> {
        self.log_group.as_deref()
    }

    pub fn origin(&self) -> LogGroupOrigin {
        self.origin
    }

    /// Whether the template should declare the log group resource.
    pub fn declares_log_group(&self) -> bool {
        self.origin == LogGroupOrigin::ServiceName
    }
}
