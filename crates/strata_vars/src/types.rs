//! Variable types, resolved values and type coercion.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};
use strata_template::{is_valid_logical_id, Value};

use crate::error::{VarsError, VarsResult};

/// Expected shape of an inline resource literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceShape {
    /// Resource or property type, e.g. `AWS::EC2::Instance`.
    pub kind: &'static str,
    /// Properties that must be present.
    pub required: &'static [&'static str],
    /// Properties that may be present. `None` accepts anything.
    pub known: Option<&'static [&'static str]>,
}

impl ResourceShape {
    pub const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            required: &[],
            known: None,
        }
    }

    pub const fn requires(mut self, required: &'static [&'static str]) -> Self {
        self.required = required;
        self
    }

    pub const fn known(mut self, known: &'static [&'static str]) -> Self {
        self.known = Some(known);
        self
    }

    fn validate(&self, name: &str, raw: &Json) -> VarsResult<ResourceLiteral> {
        let props = match raw {
            Json::Object(map) => map.clone(),
            Json::Null => Map::new(),
            other => {
                return Err(VarsError::InvalidResource {
                    name: name.to_string(),
                    message: format!("{} must be a map, found {}", self.kind, json_type_name(other)),
                })
            }
        };

        for required in self.required {
            if !props.contains_key(*required) {
                return Err(VarsError::InvalidResource {
                    name: name.to_string(),
                    message: format!("{} requires property '{}'", self.kind, required),
                });
            }
        }

        if let Some(known) = self.known {
            if let Some(unknown) = props.keys().find(|k| !known.contains(&k.as_str())) {
                return Err(VarsError::InvalidResource {
                    name: name.to_string(),
                    message: format!("{} has no property '{}'", self.kind, unknown),
                });
            }
        }

        Ok(ResourceLiteral {
            kind: self.kind,
            properties: props.into_iter().collect(),
        })
    }
}

/// An inline resource literal validated against a [`ResourceShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLiteral {
    pub kind: &'static str,
    pub properties: BTreeMap<String, Json>,
}

impl ResourceLiteral {
    pub fn get(&self, property: &str) -> Option<&Json> {
        self.properties.get(property)
    }

    /// Properties converted into template values.
    pub fn to_properties(&self) -> BTreeMap<String, Value> {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect()
    }
}

/// Declared type of a blueprint variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    String,
    Integer,
    Boolean,
    List,
    Map,
    /// A single inline resource literal.
    Resource(ResourceShape),
    /// A map of logical id to inline resource literal.
    ResourceMap(ResourceShape),
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::String => write!(f, "string"),
            VariableType::Integer => write!(f, "integer"),
            VariableType::Boolean => write!(f, "boolean"),
            VariableType::List => write!(f, "list"),
            VariableType::Map => write!(f, "map"),
            VariableType::Resource(shape) => write!(f, "resource<{}>", shape.kind),
            VariableType::ResourceMap(shape) => write!(f, "map<name, resource<{}>>", shape.kind),
        }
    }
}

/// A resolved, typed variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    List(Vec<Json>),
    Map(Map<String, Json>),
    Resource(ResourceLiteral),
    Resources(BTreeMap<String, ResourceLiteral>),
}

impl VarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            VarValue::String(_) => "string",
            VarValue::Integer(_) => "integer",
            VarValue::Boolean(_) => "boolean",
            VarValue::List(_) => "list",
            VarValue::Map(_) => "map",
            VarValue::Resource(_) => "resource",
            VarValue::Resources(_) => "resource map",
        }
    }
}

pub(crate) fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "float",
        Json::String(_) => "string",
        Json::Array(_) => "list",
        Json::Object(_) => "map",
    }
}

/// Coerce a raw value into the declared type.
///
/// Strings accept numbers and booleans, integers accept numeric strings,
/// booleans accept `"true"`/`"false"`. Nothing else is converted.
pub fn coerce(name: &str, var_type: &VariableType, raw: &Json) -> VarsResult<VarValue> {
    let mismatch = || VarsError::TypeMismatch {
        name: name.to_string(),
        expected: var_type.to_string(),
        found: json_type_name(raw).to_string(),
    };

    match var_type {
        VariableType::String => match raw {
            Json::String(s) => Ok(VarValue::String(s.clone())),
            Json::Number(n) => Ok(VarValue::String(n.to_string())),
            Json::Bool(b) => Ok(VarValue::String(b.to_string())),
            _ => Err(mismatch()),
        },
        VariableType::Integer => match raw {
            Json::Number(n) => n.as_i64().map(VarValue::Integer).ok_or_else(mismatch),
            Json::String(s) => s.trim().parse::<i64>().map(VarValue::Integer).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        VariableType::Boolean => match raw {
            Json::Bool(b) => Ok(VarValue::Boolean(*b)),
            Json::String(s) if s.eq_ignore_ascii_case("true") => Ok(VarValue::Boolean(true)),
            Json::String(s) if s.eq_ignore_ascii_case("false") => Ok(VarValue::Boolean(false)),
            _ => Err(mismatch()),
        },
        VariableType::List => match raw {
            Json::Array(items) => Ok(VarValue::List(items.clone())),
            _ => Err(mismatch()),
        },
        VariableType::Map => match raw {
            Json::Object(map) => Ok(VarValue::Map(map.clone())),
            _ => Err(mismatch()),
        },
        VariableType::Resource(shape) => shape.validate(name, raw).map(VarValue::Resource),
        VariableType::ResourceMap(shape) => {
            let entries = raw.as_object().ok_or_else(mismatch)?;
            let mut resources = BTreeMap::new();
            for (logical_id, literal) in entries {
                if !is_valid_logical_id(logical_id) {
                    return Err(VarsError::InvalidResource {
                        name: name.to_string(),
                        message: format!("'{}' is not a valid logical id", logical_id),
                    });
                }
                resources.insert(logical_id.clone(), shape.validate(name, literal)?);
            }
            Ok(VarValue::Resources(resources))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SG: ResourceShape = ResourceShape::new("AWS::EC2::SecurityGroup")
        .requires(&["GroupDescription"])
        .known(&["GroupDescription", "VpcId"]);

    #[test]
    fn test_string_coercion() {
        assert_eq!(coerce("A", &VariableType::String, &json!(1234)).unwrap(), VarValue::String("1234".into()));
        assert_eq!(coerce("A", &VariableType::String, &json!(true)).unwrap(), VarValue::String("true".into()));
        assert!(coerce("A", &VariableType::String, &json!(["x"])).is_err());
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce("CPU", &VariableType::Integer, &json!("1024")).unwrap(), VarValue::Integer(1024));
        let err = coerce("CPU", &VariableType::Integer, &json!(1.5)).unwrap_err();
        assert_eq!(
            err,
            VarsError::TypeMismatch {
                name: "CPU".into(),
                expected: "integer".into(),
                found: "float".into()
            }
        );
        assert!(coerce("CPU", &VariableType::Integer, &json!("lots")).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(coerce("B", &VariableType::Boolean, &json!("TRUE")).unwrap(), VarValue::Boolean(true));
        assert!(coerce("B", &VariableType::Boolean, &json!(1)).is_err());
    }

    #[test]
    fn test_resource_shape_validation() {
        let ok = coerce("SG", &VariableType::Resource(SG), &json!({"GroupDescription": "web"})).unwrap();
        assert!(matches!(ok, VarValue::Resource(r) if r.kind == "AWS::EC2::SecurityGroup"));

        let missing = coerce("SG", &VariableType::Resource(SG), &json!({})).unwrap_err();
        assert!(matches!(missing, VarsError::InvalidResource { .. }));

        let unknown = coerce(
            "SG",
            &VariableType::Resource(SG),
            &json!({"GroupDescription": "web", "Bogus": 1}),
        )
        .unwrap_err();
        assert!(matches!(unknown, VarsError::InvalidResource { message, .. } if message.contains("Bogus")));
    }

    #[test]
    fn test_resource_map_rejects_bad_logical_id() {
        let err = coerce(
            "Groups",
            &VariableType::ResourceMap(SG),
            &json!({"web-sg": {"GroupDescription": "web"}}),
        )
        .unwrap_err();
        assert!(matches!(err, VarsError::InvalidResource { .. }));
    }

    #[test]
    fn test_resource_map_accepts_empty_entries() {
        let shape = ResourceShape::new("AWS::Kinesis::Stream");
        let value = coerce("Streams", &VariableType::ResourceMap(shape), &json!({"Stream2": null})).unwrap();
        match value {
            VarValue::Resources(map) => assert!(map["Stream2"].properties.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
