//! Render command - Render configured stacks to templates.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use strata_blueprints::{BlueprintRegistry, RenderedStack, StackConfig};
use strata_template::OutputFormat;

use super::ConfigArgs;

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Render only this stack (renders every enabled stack if not specified)
    #[arg(short, long)]
    pub stack: Option<String>,

    /// Directory to write templates to (prints to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Template format
    #[arg(short, long, default_value = "json", value_parser = ["json", "yaml"])]
    pub format: String,
}

/// Render the selected stacks of a config.
pub fn render_stacks(config: &StackConfig, stack: Option<&str>) -> Result<Vec<RenderedStack>> {
    let registry = BlueprintRegistry::builtin();
    let selected = match stack {
        Some(name) => vec![config.stack(name)?],
        None => config.enabled_stacks().collect(),
    };

    selected
        .into_iter()
        .map(|definition| {
            config
                .render_stack(&registry, definition)
                .with_context(|| format!("Failed to render stack {}", definition.name))
        })
        .collect()
}

/// Write each stack to `<dir>/<stack name>.<ext>` and return the paths.
pub fn write_stacks(stacks: &[RenderedStack], dir: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
    stacks
        .iter()
        .map(|stack| {
            let path = dir.join(format!("{}.{}", stack.stack_name, format.extension()));
            stack
                .template
                .write_to(&path, format)
                .with_context(|| format!("Failed to write {:?}", path))?;
            Ok(path)
        })
        .collect()
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format).unwrap_or_default();
    let config = args.config.load()?;
    let stacks = render_stacks(&config, args.stack.as_deref())?;

    if stacks.is_empty() {
        println!("⚠️  No enabled stacks to render");
        return Ok(());
    }

    match &args.output {
        Some(dir) => {
            for path in write_stacks(&stacks, dir, format)? {
                println!("✅ {}", path.display());
            }
        }
        None => {
            for (i, stack) in stacks.iter().enumerate() {
                if i > 0 && format == OutputFormat::Yaml {
                    println!("---");
                }
                println!("{}", stack.template.render(format)?);
            }
        }
    }

    info!("Rendered {} stack(s)", stacks.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use strata_blueprints::BlueprintError;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
namespace: test
stacks:
  - name: cluster
    blueprint: ecs.Cluster
  - name: subnet
    blueprint: network.Network
    variables:
      VpcId: vpc-1
      AvailabilityZone: us-east-1a
      CidrBlock: 10.0.0.0/24
      NatGatewayId: nat-1
"#;

    #[test]
    fn test_render_and_write_all() {
        let dir = tempdir().unwrap();
        let config = StackConfig::parse(CONFIG, strata_blueprints::ConfigFormat::Yaml).unwrap();
        let stacks = render_stacks(&config, None).unwrap();
        assert_eq!(stacks.len(), 2);

        let paths = write_stacks(&stacks, dir.path(), OutputFormat::Yaml).unwrap();
        assert_eq!(paths[1], dir.path().join("test-subnet.yaml"));
        let yaml = fs::read_to_string(&paths[1]).unwrap();
        assert!(yaml.contains("nat-1"));
    }

    #[test]
    fn test_render_single_stack() {
        let config = StackConfig::parse(CONFIG, strata_blueprints::ConfigFormat::Yaml).unwrap();
        let stacks = render_stacks(&config, Some("cluster")).unwrap();
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].stack_name, "test-cluster");

        let err = render_stacks(&config, Some("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlueprintError>(),
            Some(BlueprintError::StackNotFound(_))
        ));
    }

    #[test]
    fn test_execute_writes_to_output_dir() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("stacks.yaml");
        fs::write(&config_path, CONFIG.replace("nat-1", "${nat}")).unwrap();

        let args = RenderArgs {
            config: ConfigArgs {
                config: config_path,
                values: vec![("nat".to_string(), "nat-9".to_string())],
            },
            stack: Some("subnet".to_string()),
            output: Some(dir.path().join("out")),
            format: "json".to_string(),
        };
        execute(args).unwrap();

        let json = fs::read_to_string(dir.path().join("out").join("test-subnet.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["Resources"]["DefaultRoute"]["Properties"]["NatGatewayId"], "nat-9");
    }
}
