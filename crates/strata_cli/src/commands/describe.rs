//! Describe command - Show the variables a blueprint accepts.

use anyhow::Result;
use clap::Args;

use strata_blueprints::{Blueprint, BlueprintRegistry};
use strata_vars::{DefaultValue, VariableDef};

#[derive(Args)]
pub struct DescribeArgs {
    /// Blueprint id, e.g. network.Network
    pub blueprint: String,
}

fn default_label(def: &VariableDef) -> String {
    match &def.default {
        DefaultValue::Required => "required".to_string(),
        DefaultValue::Unset => "optional".to_string(),
        DefaultValue::Value(value) => format!("default: {}", value),
    }
}

/// Human-readable schema of a blueprint.
pub fn describe(blueprint: &dyn Blueprint) -> Vec<String> {
    let mut lines = vec![format!("{} - {}", blueprint.id(), blueprint.description())];
    let schema = blueprint.schema();
    if schema.is_empty() {
        lines.push("  (no variables)".to_string());
    }
    for def in schema.variables() {
        lines.push(format!("  {} ({}, {})", def.name, def.var_type, default_label(def)));
        lines.push(format!("      {}", def.description));
    }
    lines
}

pub fn execute(args: DescribeArgs) -> Result<()> {
    let registry = BlueprintRegistry::builtin();
    let blueprint = registry.get_required(&args.blueprint)?;
    for line in describe(blueprint.as_ref()) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blueprints::{Cluster, Network};

    #[test]
    fn test_describe_network() {
        let lines = describe(&Network);
        assert_eq!(lines[0], "network.Network - A subnet routed through an internet gateway or a NAT gateway");
        assert!(lines.contains(&"  VpcId (string, required)".to_string()));
        assert!(lines.contains(&"  CreateNatGateway (boolean, default: false)".to_string()));
    }

    #[test]
    fn test_describe_without_variables() {
        assert_eq!(describe(&Cluster)[1], "  (no variables)");
    }
}
