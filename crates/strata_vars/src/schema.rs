//! Variable schema declaration and resolution.

use std::collections::BTreeMap;

use serde_json::Value as Json;
use tracing::debug;

use crate::error::{VarsError, VarsResult};
use crate::resolved::ResolvedVariables;
use crate::types::{coerce, VariableType};

/// What happens when a variable is not supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Resolution fails.
    Required,
    /// The variable stays absent from the resolved set.
    Unset,
    /// The value is used as if the caller had supplied it.
    Value(Json),
}

/// A single variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub var_type: VariableType,
    pub default: DefaultValue,
    pub description: String,
}

impl VariableDef {
    pub fn is_required(&self) -> bool {
        self.default == DefaultValue::Required
    }
}

/// Ordered list of variable declarations for one blueprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSchema {
    variables: Vec<VariableDef>,
}

impl VariableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable that must be supplied.
    pub fn required(self, name: impl Into<String>, var_type: VariableType, description: impl Into<String>) -> Self {
        self.declare(name, var_type, DefaultValue::Required, description)
    }

    /// Declare a variable with a default.
    pub fn optional(
        self,
        name: impl Into<String>,
        var_type: VariableType,
        default: Json,
        description: impl Into<String>,
    ) -> Self {
        self.declare(name, var_type, DefaultValue::Value(default), description)
    }

    /// Declare a variable that may be left out entirely.
    pub fn unset(self, name: impl Into<String>, var_type: VariableType, description: impl Into<String>) -> Self {
        self.declare(name, var_type, DefaultValue::Unset, description)
    }

    fn declare(
        mut self,
        name: impl Into<String>,
        var_type: VariableType,
        default: DefaultValue,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.variables.retain(|v| v.name != name);
        self.variables.push(VariableDef {
            name,
            var_type,
            default,
            description: description.into(),
        });
        self
    }

    /// Append every declaration of another schema.
    pub fn extend(mut self, other: VariableSchema) -> Self {
        for def in other.variables {
            self.variables.retain(|v| v.name != def.name);
            self.variables.push(def);
        }
        self
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn get(&self, name: &str) -> Option<&VariableDef> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Resolve supplied values against this schema.
    ///
    /// An explicit `null` is treated as "not supplied".
    pub fn resolve(&self, provided: &BTreeMap<String, Json>) -> VarsResult<ResolvedVariables> {
        if let Some(unknown) = provided.keys().find(|k| self.get(k).is_none()) {
            return Err(VarsError::UnknownVariable(unknown.clone()));
        }

        let mut values = BTreeMap::new();
        for def in &self.variables {
            let raw = match provided.get(&def.name).filter(|v| !v.is_null()) {
                Some(value) => value,
                None => match &def.default {
                    DefaultValue::Required => return Err(VarsError::MissingVariable(def.name.clone())),
                    DefaultValue::Unset => continue,
                    DefaultValue::Value(default) => default,
                },
            };

            let value = coerce(&def.name, &def.var_type, raw)?;
            debug!("Resolved variable {} as {}", def.name, value.type_name());
            values.insert(def.name.clone(), value);
        }

        Ok(ResolvedVariables::new(values))
    }
}
