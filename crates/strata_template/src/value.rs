//! Property values and intrinsic references.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Pseudo parameters supplied by the template engine at deploy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pseudo {
    Region,
    AccountId,
    StackName,
    Partition,
}

impl Pseudo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pseudo::Region => "AWS::Region",
            Pseudo::AccountId => "AWS::AccountId",
            Pseudo::StackName => "AWS::StackName",
            Pseudo::Partition => "AWS::Partition",
        }
    }
}

impl std::fmt::Display for Pseudo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource property or output value.
///
/// Literals serialize as-is. `Ref` and `GetAtt` point at another resource in
/// the same template and are checked by [`crate::Template::validate_references`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(serde_json::Value),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Ref(String),
    GetAtt { resource: String, attribute: String },
    Sub(String),
    Pseudo(Pseudo),
}

impl Value {
    /// A string literal.
    pub fn str(value: impl Into<String>) -> Self {
        Value::Literal(serde_json::Value::String(value.into()))
    }

    /// Build a map value from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list of string literals.
    pub fn str_list<S, I>(items: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Value::List(items.into_iter().map(Value::str).collect())
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Value::Sub(template.into())
    }

    /// The string content of a literal string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Literal(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Literal(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The logical id this value refers to, for `Ref` and `GetAtt`.
    pub fn target(&self) -> Option<&str> {
        match self {
            Value::Ref(id) => Some(id),
            Value::GetAtt { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// Every resource logical id referenced anywhere inside this value.
    pub fn referenced_resources(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Ref(id) => out.push(id),
            Value::GetAtt { resource, .. } => out.push(resource),
            Value::List(items) => items.iter().for_each(|v| v.collect_references(out)),
            Value::Map(map) => map.values().for_each(|v| v.collect_references(out)),
            Value::Literal(_) | Value::Sub(_) | Value::Pseudo(_) => {}
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Literal(v) => v.serialize(serializer),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            Value::Ref(id) => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("Ref", id)?;
                m.end()
            }
            Value::GetAtt { resource, attribute } => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("Fn::GetAtt", &[resource, attribute])?;
                m.end()
            }
            Value::Sub(template) => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("Fn::Sub", template)?;
                m.end()
            }
            Value::Pseudo(p) => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("Ref", p.as_str())?;
                m.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::str(s.as_str())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Literal(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Literal(b.into())
    }
}

impl From<Pseudo> for Value {
    fn from(p: Pseudo) -> Self {
        Value::Pseudo(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Arrays and objects become `List` and `Map` so blueprints can inspect them.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
            other => Value::Literal(other),
        }
    }
}
