//! Naming context shared by every stack rendered from one config.

use serde::{Deserialize, Serialize};

/// Namespace and environment a blueprint is rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub namespace: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Default for Context {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            environment: default_environment(),
        }
    }
}

impl Context {
    pub fn new(namespace: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            environment: environment.into(),
        }
    }

    /// Fully qualified stack name: `<namespace>-<name>`.
    pub fn stack_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.namespace, name)
        }
    }
}
