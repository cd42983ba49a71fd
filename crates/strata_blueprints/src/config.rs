//! Stack configuration files.
//!
//! A config names a namespace and a list of stacks, each pointing at a
//! registered blueprint with its variables. YAML, JSON and TOML are accepted,
//! picked by file extension. `${key}` placeholders are replaced before parsing;
//! `$$` stands for a literal `$`, so `$${HOME}` survives as `${HOME}`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::blueprint::{render, RenderedStack};
use crate::context::Context;
use crate::error::{BlueprintError, BlueprintResult};
use crate::registry::BlueprintRegistry;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\$|\$\{([A-Za-z0-9_.\-]+)\}").expect("placeholder pattern is valid"))
}

/// Replace every `${key}` in `content` with its value and every `$$` with `$`.
pub fn substitute(content: &str, values: &BTreeMap<String, String>) -> BlueprintResult<String> {
    let pattern = placeholder_pattern();
    if let Some(missing) = pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|key| key.as_str().to_string()))
        .find(|key| !values.contains_key(key))
    {
        return Err(BlueprintError::MissingEnvironmentValue(missing));
    }

    let replaced = pattern.replace_all(content, |caps: &Captures| match caps.get(1) {
        Some(key) => values.get(key.as_str()).cloned().unwrap_or_default(),
        None => "$".to_string(),
    });
    Ok(replaced.into_owned())
}

/// Format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// One configured blueprint invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDefinition {
    pub name: String,
    pub blueprint: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub variables: BTreeMap<String, Json>,
}

/// A parsed stack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(flatten)]
    pub context: Context,
    #[serde(default)]
    pub stacks: Vec<StackDefinition>,
}

impl StackConfig {
    /// Load a config file, substituting placeholders from `values`.
    pub fn load(path: &Path, values: &BTreeMap<String, String>) -> BlueprintResult<Self> {
        debug!("Loading stack config from {:?}", path);
        let format = ConfigFormat::from_path(path).ok_or_else(|| BlueprintError::InvalidConfig {
            path: path.to_path_buf(),
            message: "expected a .yaml, .yml, .json or .toml file".to_string(),
        })?;

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&substitute(&content, values)?, format)?;
        info!(
            "Loaded {} stacks for namespace {} from {:?}",
            config.stacks.len(),
            config.context.namespace,
            path
        );
        Ok(config)
    }

    /// Parse config text that has already been substituted.
    pub fn parse(content: &str, format: ConfigFormat) -> BlueprintResult<Self> {
        let config: StackConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        config.check_unique_names()?;
        Ok(config)
    }

    fn check_unique_names(&self) -> BlueprintResult<()> {
        let mut seen = HashSet::new();
        for stack in &self.stacks {
            if !seen.insert(stack.name.as_str()) {
                return Err(BlueprintError::DuplicateStack(stack.name.clone()));
            }
        }
        Ok(())
    }

    pub fn stack(&self, name: &str) -> BlueprintResult<&StackDefinition> {
        self.stacks
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| BlueprintError::StackNotFound(name.to_string()))
    }

    pub fn enabled_stacks(&self) -> impl Iterator<Item = &StackDefinition> {
        self.stacks.iter().filter(|s| s.enabled)
    }

    /// Render one stack with a blueprint from `registry`.
    pub fn render_stack(
        &self,
        registry: &BlueprintRegistry,
        stack: &StackDefinition,
    ) -> BlueprintResult<RenderedStack> {
        let blueprint = registry.get_required(&stack.blueprint)?;
        render(blueprint.as_ref(), &self.context, &stack.name, &stack.variables)
    }

    /// Render every enabled stack, stopping at the first failure.
    pub fn render_all(&self, registry: &BlueprintRegistry) -> BlueprintResult<Vec<RenderedStack>> {
        self.enabled_stacks()
            .map(|stack| self.render_stack(registry, stack))
            .collect()
    }
}
