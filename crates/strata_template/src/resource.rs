//! Resource and output declarations.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::value::Value;

fn logical_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("logical id pattern is valid"))
}

/// Check that a name can be used as a resource logical id or output name.
pub fn is_valid_logical_id(id: &str) -> bool {
    logical_id_pattern().is_match(id)
}

/// A single resource declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    pub logical_id: String,
    /// Resource type, e.g. `AWS::EC2::Route`.
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(rename = "Properties", skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind: kind.into(),
            depends_on: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Set a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set a property only when a value is present.
    pub fn with_opt<V: Into<Value>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.properties.insert(name.into(), value.into());
        }
        self
    }

    /// Merge a map of literal properties, e.g. from a typed resource variable.
    pub fn with_properties(mut self, properties: BTreeMap<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Logical ids this resource points at through properties or `DependsOn`.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self
            .properties
            .values()
            .flat_map(|v| v.referenced_resources())
            .collect();
        refs.extend(self.depends_on.iter().map(String::as_str));
        refs
    }
}

/// Handle to a resource that has been added to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    logical_id: String,
}

impl ResourceHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Ref` to this resource.
    pub fn reference(&self) -> Value {
        Value::Ref(self.logical_id.clone())
    }

    /// `Fn::GetAtt` on one of this resource's attributes.
    pub fn get_att(&self, attribute: impl Into<String>) -> Value {
        Value::GetAtt {
            resource: self.logical_id.clone(),
            attribute: attribute.into(),
        }
    }
}

/// A named template output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Value")]
    pub value: Value,
}

impl Output {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            description: None,
            value: value.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Convert a tag map into the `[{Key, Value}]` list form.
pub fn tags(tags: &BTreeMap<String, String>) -> Value {
    Value::List(
        tags.iter()
            .map(|(k, v)| Value::object([("Key", Value::str(k)), ("Value", Value::str(v))]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_validation() {
        assert!(is_valid_logical_id("DefaultRoute"));
        assert!(is_valid_logical_id("Stream1"));
        assert!(!is_valid_logical_id(""));
        assert!(!is_valid_logical_id("my-stream"));
        assert!(!is_valid_logical_id("has space"));
    }

    #[test]
    fn test_resource_references_include_depends_on() {
        let resource = Resource::new("Route", "AWS::EC2::Route")
            .with("RouteTableId", Value::Ref("RouteTable".into()))
            .depends_on("Attachment");
        assert_eq!(resource.references(), vec!["RouteTable", "Attachment"]);
    }

    #[test]
    fn test_with_opt_skips_none() {
        let resource = Resource::new("Role", "AWS::IAM::Role").with_opt::<&str>("RoleName", None);
        assert!(resource.property("RoleName").is_none());
    }

    #[test]
    fn test_tags_list() {
        let mut map = BTreeMap::new();
        map.insert("A".to_string(), "apple".to_string());
        let value = tags(&map);
        let first = &value.as_list().unwrap()[0];
        assert_eq!(first.get("Key").and_then(Value::as_str), Some("A"));
        assert_eq!(first.get("Value").and_then(Value::as_str), Some("apple"));
    }
}
