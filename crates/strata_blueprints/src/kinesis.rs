//! Kinesis streams and the policies granting access to them.

use serde_json::json;
use tracing::{debug, warn};

use strata_template::{Output, Resource, Statement, Template, Value};
use strata_vars::{ResolvedVariables, ResourceLiteral, ResourceShape, VariableSchema, VariableType};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::BlueprintResult;
use crate::policies::{kinesis_read_statements, kinesis_read_write_statements};
use crate::roles::{attach_policy, PolicySpec};

const STREAM: ResourceShape = ResourceShape::new("AWS::Kinesis::Stream").known(&[
    "Name",
    "RetentionPeriodHours",
    "ShardCount",
    "StreamEncryption",
    "StreamModeDetails",
    "Tags",
]);

const DEFAULT_SHARD_COUNT: i64 = 1;

/// On-demand streams scale on their own and must not carry a shard count.
fn is_provisioned(literal: &ResourceLiteral) -> bool {
    let mode = literal
        .get("StreamModeDetails")
        .and_then(|details| details.get("StreamMode"))
        .and_then(|mode| mode.as_str());
    matches!(mode, None | Some("PROVISIONED"))
}

/// One or more Kinesis streams plus optional read and read/write policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streams;

impl Streams {
    fn grant(
        template: &mut Template,
        logical_id: &str,
        suffix: &str,
        roles: &[String],
        statements: Vec<Statement>,
    ) -> BlueprintResult<()> {
        if roles.is_empty() {
            return Ok(());
        }
        attach_policy(
            template,
            PolicySpec::new(logical_id, Value::sub(format!("${{AWS::StackName}}-{}", suffix)), statements),
            roles.iter().map(Value::str).collect(),
        )?;
        Ok(())
    }
}

impl Blueprint for Streams {
    fn id(&self) -> &'static str {
        "kinesis.Streams"
    }

    fn description(&self) -> &'static str {
        "Kinesis streams with read and read/write policies"
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new()
            .required(
                "Streams",
                VariableType::ResourceMap(STREAM),
                "Streams to create, keyed by logical id.",
            )
            .optional("ReadRoles", VariableType::List, json!([]), "Role names granted read access.")
            .optional(
                "ReadWriteRoles",
                VariableType::List,
                json!([]),
                "Role names granted read and write access.",
            )
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let streams = vars.resources("Streams")?;
        let read_roles = vars.string_list("ReadRoles")?;
        let read_write_roles = vars.string_list("ReadWriteRoles")?;

        if read_roles.is_empty() && read_write_roles.is_empty() {
            warn!("No ReadRoles or ReadWriteRoles given, no access policies will be created");
        }

        let mut template = Template::new("Kinesis streams");
        let mut stream_arns = Vec::new();

        for (name, literal) in streams {
            let mut properties = literal.to_properties();
            if is_provisioned(literal) {
                properties
                    .entry("ShardCount".to_string())
                    .or_insert_with(|| Value::from(DEFAULT_SHARD_COUNT));
            }

            let stream = template.add_resource(Resource::new(name.as_str(), literal.kind).with_properties(properties))?;
            template.add_output(Output::new(format!("{}StreamName", name), stream.reference()))?;
            template.add_output(Output::new(format!("{}StreamArn", name), stream.get_att("Arn")))?;
            stream_arns.push(stream.get_att("Arn"));
        }

        if stream_arns.is_empty() {
            warn!("Streams is empty, skipping access policies");
        } else {
            Self::grant(
                &mut template,
                "ReadPolicy",
                "read-policy",
                &read_roles,
                kinesis_read_statements(stream_arns.clone()),
            )?;
            Self::grant(
                &mut template,
                "ReadWritePolicy",
                "read-write-policy",
                &read_write_roles,
                kinesis_read_write_statements(stream_arns),
            )?;
        }

        debug!("Declared {} streams", streams.len());
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::Value as Json;

    fn build(vars: Json) -> BlueprintResult<Template> {
        let vars: BTreeMap<String, Json> = serde_json::from_value(vars).unwrap();
        let resolved = Streams.schema().resolve(&vars)?;
        Streams.create_template(&Context::default(), &resolved)
    }

    #[test]
    fn test_on_demand_stream_has_no_shard_count() {
        let template = build(json!({
            "Streams": {
                "Events": {"StreamModeDetails": {"StreamMode": "ON_DEMAND"}},
                "Orders": {"StreamModeDetails": {"StreamMode": "PROVISIONED"}},
            },
        }))
        .unwrap();

        let events = template.resource("Events").unwrap();
        assert_eq!(events.property("ShardCount"), None);
        assert!(events.property("StreamModeDetails").is_some());
        assert_eq!(
            template.resource("Orders").unwrap().property("ShardCount"),
            Some(&Value::from(1i64))
        );
    }

    #[test]
    fn test_streams_and_policies() {
        let template = build(json!({
            "Streams": {
                "Stream1": {
                    "RetentionPeriodHours": 12,
                    "ShardCount": 4,
                    "StreamEncryption": {"EncryptionType": "KMS", "KeyId": "kms-1203123"},
                },
                "Stream2": {},
            },
            "ReadRoles": ["Role1", "Role2"],
            "ReadWriteRoles": ["Role3", "Role4"],
        }))
        .unwrap();

        assert_eq!(
            template.resource("Stream1").unwrap().property("ShardCount"),
            Some(&Value::from(4i64))
        );
        assert_eq!(
            template.resource("Stream2").unwrap().property("ShardCount"),
            Some(&Value::from(1i64))
        );
        assert!(template.output("Stream2StreamArn").is_some());

        let read = template.resource("ReadPolicy").unwrap();
        let document = read.property("PolicyDocument").unwrap();
        let statement = &document.get("Statement").unwrap().as_list().unwrap()[0];
        assert_eq!(statement.get("Resource").unwrap().as_list().unwrap().len(), 2);
        assert!(template.contains_resource("ReadWritePolicy"));
        template.validate_references().unwrap();
    }

    #[test]
    fn test_policies_only_for_given_roles() {
        let template = build(json!({"Streams": {"Stream1": {}}, "ReadRoles": ["Reader"]})).unwrap();
        assert!(template.contains_resource("ReadPolicy"));
        assert!(!template.contains_resource("ReadWritePolicy"));
    }

    #[test]
    fn test_unknown_stream_property() {
        assert!(build(json!({"Streams": {"Stream1": {"Shards": 2}}})).is_err());
    }
}
