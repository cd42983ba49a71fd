//! Validate command - Render every stack without writing anything.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use strata_blueprints::{BlueprintError, BlueprintRegistry, StackConfig};

use super::ConfigArgs;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Outcome of validating one stack.
pub struct StackReport {
    pub name: String,
    pub error: Option<BlueprintError>,
}

/// Render each enabled stack and collect the failures instead of stopping at the first.
pub fn validate_config(config: &StackConfig) -> Vec<StackReport> {
    let registry = BlueprintRegistry::builtin();
    config
        .enabled_stacks()
        .map(|stack| StackReport {
            name: stack.name.clone(),
            error: config.render_stack(&registry, stack).err(),
        })
        .collect()
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating stack config: {:?}", args.config.config);
    let config = args.config.load()?;
    let reports = validate_config(&config);

    println!("📋 Validating {} stack(s)...", reports.len());
    let total = reports.len();
    let mut first_failure = None;
    let mut failed = 0;

    for report in reports {
        match report.error {
            None => println!("   ✅ {}", report.name),
            Some(err) => {
                println!("   ❌ {}: {}", report.name, err);
                failed += 1;
                if first_failure.is_none() {
                    first_failure = Some((report.name, err));
                }
            }
        }
    }

    println!();
    match first_failure {
        None => {
            println!("✅ All stacks are valid!");
            Ok(())
        }
        Some((name, err)) => Err(err).with_context(|| {
            format!("{} of {} stack(s) failed validation, first failure in {}", failed, total, name)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use strata_blueprints::ConfigFormat;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
namespace: test
stacks:
  - name: good
    blueprint: network.Network
    variables: {VpcId: vpc-1, AvailabilityZone: us-east-1a, CidrBlock: 10.0.0.0/24, InternetGatewayId: igw-1}
  - name: conflicting
    blueprint: network.Network
    variables: {VpcId: vpc-1, AvailabilityZone: us-east-1a, CidrBlock: 10.0.1.0/24, InternetGatewayId: igw-1, NatGatewayId: nat-1}
  - name: disabled
    blueprint: nope.Nope
    enabled: false
"#;

    #[test]
    fn test_validate_collects_failures() {
        let config = StackConfig::parse(CONFIG, ConfigFormat::Yaml).unwrap();
        let reports = validate_config(&config);

        assert_eq!(reports.len(), 2);
        assert!(reports[0].error.is_none());
        assert!(matches!(reports[1].error, Some(BlueprintError::GatewayConflict { .. })));
    }

    #[test]
    fn test_execute_fails_with_first_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stacks.yaml");
        fs::write(&path, CONFIG).unwrap();

        let err = execute(ValidateArgs {
            config: ConfigArgs {
                config: path,
                values: Vec::new(),
            },
        })
        .unwrap_err();
        assert!(err.chain().any(|c| matches!(
            c.downcast_ref::<BlueprintError>(),
            Some(BlueprintError::GatewayConflict { .. })
        )));
    }
}
