//! IAM policy documents.

use crate::error::{TemplateError, TemplateResult};
use crate::value::Value;

/// IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
    /// Service principal for trust policies.
    pub service_principal: Option<String>,
}

impl Statement {
    pub fn allow<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> Self {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: Vec::new(),
            service_principal: None,
        }
    }

    pub fn on(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn on_all(mut self, resources: impl IntoIterator<Item = Value>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// `sts:AssumeRole` for the given service principal, e.g. `ec2.amazonaws.com`.
    pub fn assume_role(service: impl Into<String>) -> Self {
        Self {
            effect: Effect::Allow,
            actions: vec!["sts:AssumeRole".to_string()],
            resources: Vec::new(),
            service_principal: Some(service.into()),
        }
    }

    /// Parse a statement written as a literal map:
    /// `{Effect: Allow, Action: [..] | "..", Resource: [..] | ".."}`.
    pub fn from_literal(literal: &serde_json::Value) -> TemplateResult<Self> {
        let map = literal
            .as_object()
            .ok_or_else(|| TemplateError::InvalidStatement("statement must be a map".to_string()))?;

        let effect = match map.get("Effect").and_then(|e| e.as_str()).unwrap_or("Allow") {
            "Allow" => Effect::Allow,
            "Deny" => Effect::Deny,
            other => return Err(TemplateError::InvalidStatement(format!("unknown effect '{}'", other))),
        };

        let actions = string_or_list(map.get("Action"), "Action")?;
        if actions.is_empty() {
            return Err(TemplateError::InvalidStatement("Action cannot be empty".to_string()));
        }

        let resources = match map.get("Resource") {
            None => return Err(TemplateError::InvalidStatement("Resource is required".to_string())),
            Some(serde_json::Value::Array(items)) => items.iter().cloned().map(Value::from).collect(),
            Some(other) => vec![Value::from(other.clone())],
        };

        Ok(Self {
            effect,
            actions,
            resources,
            service_principal: None,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut entries = vec![
            ("Effect", Value::str(self.effect.as_str())),
            ("Action", Value::str_list(self.actions.iter().cloned())),
        ];
        if let Some(service) = &self.service_principal {
            entries.push((
                "Principal",
                Value::object([("Service", Value::List(vec![Value::str(service)]))]),
            ));
        }
        if !self.resources.is_empty() {
            entries.push(("Resource", Value::List(self.resources.clone())));
        }
        Value::object(entries)
    }
}

fn string_or_list(value: Option<&serde_json::Value>, field: &str) -> TemplateResult<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => Ok(vec![s.clone()]),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|i| {
                i.as_str()
                    .map(String::from)
                    .ok_or_else(|| TemplateError::InvalidStatement(format!("{} entries must be strings", field)))
            })
            .collect(),
        Some(_) => Err(TemplateError::InvalidStatement(format!(
            "{} must be a string or a list of strings",
            field
        ))),
    }
}

/// A policy document: a version plus statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyDocument {
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Trust policy allowing a single service to assume the role.
    pub fn trust(service: impl Into<String>) -> Self {
        Self::new(vec![Statement::assume_role(service)])
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("Version", Value::str(POLICY_VERSION)),
            ("Statement", Value::List(self.statements.iter().map(Statement::to_value).collect())),
        ])
    }
}

impl From<PolicyDocument> for Value {
    fn from(doc: PolicyDocument) -> Self {
        doc.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trust_policy_shape() {
        let doc = serde_json::to_value(PolicyDocument::trust("ecs-tasks.amazonaws.com").to_value()).unwrap();
        assert_eq!(doc["Version"], POLICY_VERSION);
        assert_eq!(doc["Statement"][0]["Action"], json!(["sts:AssumeRole"]));
        assert_eq!(doc["Statement"][0]["Principal"]["Service"], json!(["ecs-tasks.amazonaws.com"]));
        assert!(doc["Statement"][0].get("Resource").is_none());
    }

    #[test]
    fn test_statement_from_literal() {
        let statement = Statement::from_literal(&json!({
            "Effect": "Allow",
            "Action": "ecr:GetAuthorizationToken",
            "Resource": ["*"],
        }))
        .unwrap();
        assert_eq!(statement.actions, vec!["ecr:GetAuthorizationToken"]);
        assert_eq!(statement.resources, vec![Value::str("*")]);
    }

    #[test]
    fn test_statement_from_literal_requires_resource() {
        let err = Statement::from_literal(&json!({"Action": ["s3:GetObject"]})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidStatement(_)));
    }

    #[test]
    fn test_statement_from_literal_rejects_unknown_effect() {
        assert!(Statement::from_literal(&json!({"Effect": "Maybe", "Action": "x:Y", "Resource": "*"})).is_err());
    }
}
