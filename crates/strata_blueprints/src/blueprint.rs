//! The blueprint abstraction and the render entry point.

use std::collections::BTreeMap;

use serde_json::Value as Json;
use tracing::{debug, info};

use strata_template::Template;
use strata_vars::{ResolvedVariables, VariableSchema};

use crate::context::Context;
use crate::error::BlueprintResult;

/// A stateless transformation from resolved variables to a template.
///
/// Implementations declare their variables through [`Blueprint::schema`] and
/// build a fresh [`Template`] on every call. Contradictory inputs must be
/// rejected before any resource is added.
pub trait Blueprint: Send + Sync {
    /// Registry identifier, e.g. `network.Network`.
    fn id(&self) -> &'static str;

    /// Short human-readable description.
    fn description(&self) -> &'static str;

    /// Variables accepted by this blueprint.
    fn schema(&self) -> VariableSchema;

    /// Build the resource graph for one set of resolved variables.
    fn create_template(&self, ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template>;
}

/// A template rendered for a named stack.
#[derive(Debug, Clone)]
pub struct RenderedStack {
    /// Fully qualified stack name.
    pub stack_name: String,
    pub blueprint: &'static str,
    pub template: Template,
}

/// Resolve variables, build the template and check its references.
pub fn render(
    blueprint: &dyn Blueprint,
    ctx: &Context,
    name: &str,
    provided: &BTreeMap<String, Json>,
) -> BlueprintResult<RenderedStack> {
    let stack_name = ctx.stack_name(name);
    info!("Rendering stack {} with blueprint {}", stack_name, blueprint.id());

    let vars = blueprint.schema().resolve(provided)?;
    let template = blueprint.create_template(ctx, &vars)?;
    template.validate_references()?;

    debug!(
        "Stack {} rendered with {} resources",
        stack_name,
        template.resources().count()
    );

    Ok(RenderedStack {
        stack_name,
        blueprint: blueprint.id(),
        template,
    })
}
