//! List command - List the built-in blueprints.

use anyhow::Result;

use strata_blueprints::BlueprintRegistry;

/// One line per blueprint: id and description, aligned.
pub fn format_listing(registry: &BlueprintRegistry) -> Vec<String> {
    let width = registry.ids().iter().map(|id| id.len()).max().unwrap_or(0);
    registry
        .iter()
        .map(|blueprint| format!("{:<width$}  {}", blueprint.id(), blueprint.description(), width = width))
        .collect()
}

pub fn execute() -> Result<()> {
    let registry = BlueprintRegistry::builtin();
    println!("📦 {} blueprint(s) available:\n", registry.len());
    for line in format_listing(&registry) {
        println!("  {}", line);
    }
    Ok(())
}
