//! Blueprint registry for looking up variants by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::blueprint::Blueprint;
use crate::ec2::{Instances, SecurityGroups};
use crate::ecs::{Cluster, SimpleEcsService, SimpleFargateService};
use crate::error::{BlueprintError, BlueprintResult};
use crate::iam_roles::{Ec2Role, LambdaRole, Roles};
use crate::kinesis::Streams;
use crate::network::Network;

/// A registry of blueprint implementations.
///
/// The registry maps blueprint ids to their implementations so stack
/// configs can refer to them by name.
#[derive(Default)]
pub struct BlueprintRegistry {
    blueprints: BTreeMap<String, Arc<dyn Blueprint>>,
}

impl BlueprintRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            blueprints: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in blueprint.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Cluster));
        registry.register(Arc::new(SimpleFargateService));
        registry.register(Arc::new(SimpleEcsService));
        registry.register(Arc::new(Network));
        registry.register(Arc::new(Roles::default()));
        registry.register(Arc::new(Ec2Role::default()));
        registry.register(Arc::new(LambdaRole::default()));
        registry.register(Arc::new(Streams));
        registry.register(Arc::new(Instances));
        registry.register(Arc::new(SecurityGroups));
        registry
    }

    /// Register a blueprint under its `id()`, replacing any previous entry.
    pub fn register(&mut self, blueprint: Arc<dyn Blueprint>) {
        let id = blueprint.id().to_string();
        debug!("Registering blueprint: {}", id);
        self.blueprints.insert(id, blueprint);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Blueprint>> {
        self.blueprints.get(id).cloned()
    }

    /// Get a blueprint by id, returning an error if not found.
    pub fn get_required(&self, id: &str) -> BlueprintResult<Arc<dyn Blueprint>> {
        self.get(id)
            .ok_or_else(|| BlueprintError::UnknownBlueprint(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blueprints.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.blueprints.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Blueprint>> {
        self.blueprints.values()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}
