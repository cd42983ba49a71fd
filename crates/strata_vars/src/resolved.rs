//! Resolved variable set with typed accessors.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use crate::error::{VarsError, VarsResult};
use crate::types::{json_type_name, ResourceLiteral, VarValue};

/// Concrete values for one blueprint invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedVariables {
    values: BTreeMap<String, VarValue>,
}

impl ResolvedVariables {
    pub(crate) fn new(values: BTreeMap<String, VarValue>) -> Self {
        Self { values }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> VarsResult<&VarValue> {
        self.values
            .get(name)
            .ok_or_else(|| VarsError::MissingVariable(name.to_string()))
    }

    fn wrong_type(name: &str, expected: &str, found: &VarValue) -> VarsError {
        VarsError::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }

    pub fn str(&self, name: &str) -> VarsResult<&str> {
        match self.require(name)? {
            VarValue::String(s) => Ok(s),
            other => Err(Self::wrong_type(name, "string", other)),
        }
    }

    /// A string variable, with the empty string treated as unset.
    pub fn opt_str(&self, name: &str) -> VarsResult<Option<&str>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(VarValue::String(s)) if s.is_empty() => Ok(None),
            Some(VarValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(Self::wrong_type(name, "string", other)),
        }
    }

    pub fn int(&self, name: &str) -> VarsResult<i64> {
        match self.require(name)? {
            VarValue::Integer(n) => Ok(*n),
            other => Err(Self::wrong_type(name, "integer", other)),
        }
    }

    pub fn bool(&self, name: &str) -> VarsResult<bool> {
        match self.require(name)? {
            VarValue::Boolean(b) => Ok(*b),
            other => Err(Self::wrong_type(name, "boolean", other)),
        }
    }

    pub fn list(&self, name: &str) -> VarsResult<&[Json]> {
        match self.require(name)? {
            VarValue::List(items) => Ok(items),
            other => Err(Self::wrong_type(name, "list", other)),
        }
    }

    /// A list whose entries are strings (numbers are stringified).
    pub fn string_list(&self, name: &str) -> VarsResult<Vec<String>> {
        self.list(name)?
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(|| VarsError::TypeMismatch {
                name: name.to_string(),
                expected: "list of strings".to_string(),
                found: format!("list containing {}", json_type_name(item)),
            }))
            .collect()
    }

    pub fn map(&self, name: &str) -> VarsResult<&Map<String, Json>> {
        match self.require(name)? {
            VarValue::Map(map) => Ok(map),
            other => Err(Self::wrong_type(name, "map", other)),
        }
    }

    /// A map whose values are scalars, stringified.
    pub fn string_map(&self, name: &str) -> VarsResult<BTreeMap<String, String>> {
        self.map(name)?
            .iter()
            .map(|(k, v)| {
                scalar_to_string(v)
                    .map(|s| (k.clone(), s))
                    .ok_or_else(|| VarsError::TypeMismatch {
                        name: name.to_string(),
                        expected: "map of strings".to_string(),
                        found: format!("map containing {}", json_type_name(v)),
                    })
            })
            .collect()
    }

    /// An optional typed resource literal.
    pub fn resource(&self, name: &str) -> VarsResult<Option<&ResourceLiteral>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(VarValue::Resource(r)) => Ok(Some(r)),
            Some(other) => Err(Self::wrong_type(name, "resource", other)),
        }
    }

    pub fn resources(&self, name: &str) -> VarsResult<&BTreeMap<String, ResourceLiteral>> {
        match self.require(name)? {
            VarValue::Resources(map) => Ok(map),
            other => Err(Self::wrong_type(name, "resource map", other)),
        }
    }
}

fn scalar_to_string(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
