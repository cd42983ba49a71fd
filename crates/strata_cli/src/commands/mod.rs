//! CLI command definitions.
//!
//! This module defines the command structure for the Strata CLI.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use strata_blueprints::StackConfig;

pub mod describe;
pub mod list;
pub mod render;
pub mod validate;

/// Strata - declarative infrastructure blueprints
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Strata - declarative infrastructure blueprints")]
#[command(long_about = r#"
Strata renders stack configurations into CloudFormation-style templates
using a catalogue of built-in blueprints.

COMMANDS:
  render    → Render configured stacks to templates
  validate  → Render every stack and report failures without writing
  list      → List the built-in blueprints
  describe  → Show the variables a blueprint accepts

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Variable error
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "STRATA_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render stacks from a config file
    Render(render::RenderArgs),

    /// Validate every stack in a config file
    Validate(validate::ValidateArgs),

    /// List available blueprints
    List,

    /// Describe a blueprint's variables
    Describe(describe::DescribeArgs),
}

/// Config file and placeholder values shared by `render` and `validate`.
#[derive(Args)]
pub struct ConfigArgs {
    /// Stack config file (.yaml, .yml, .json or .toml)
    #[arg(short, long, env = "STRATA_CONFIG")]
    pub config: PathBuf,

    /// Placeholder value for the config, as key=value (repeatable)
    #[arg(short = 'e', long = "env", value_parser = parse_key_val)]
    pub values: Vec<(String, String)>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<StackConfig> {
        let values: BTreeMap<String, String> = self.values.iter().cloned().collect();
        StackConfig::load(&self.config, &values)
            .with_context(|| format!("Failed to load stack config {:?}", self.config))
    }
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
