//! Pass-through EC2 instances and security groups.

use tracing::debug;

use strata_template::{Output, Resource, Template};
use strata_vars::{ResolvedVariables, ResourceShape, VariableSchema, VariableType};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::BlueprintResult;

const INSTANCE: ResourceShape = ResourceShape::new("AWS::EC2::Instance").requires(&["ImageId"]);

const SECURITY_GROUP: ResourceShape = ResourceShape::new("AWS::EC2::SecurityGroup").requires(&["GroupDescription"]);

/// Instance attributes exported as `<Name><Output>`.
const INSTANCE_OUTPUTS: &[(&str, &str)] = &[
    ("AZ", "AvailabilityZone"),
    ("PrivateDnsName", "PrivateDnsName"),
    ("PrivateIp", "PrivateIp"),
    ("PublicIp", "PublicIp"),
    ("PublicDnsName", "PublicDnsName"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Instances;

impl Blueprint for Instances {
    fn id(&self) -> &'static str {
        "ec2.Instances"
    }

    fn description(&self) -> &'static str {
        "EC2 instances declared inline"
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new().required(
            "Instances",
            VariableType::ResourceMap(INSTANCE),
            "Instances to create, keyed by logical id.",
        )
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let mut template = Template::new("EC2 instances");

        for (name, literal) in vars.resources("Instances")? {
            let instance =
                template.add_resource(Resource::new(name.as_str(), literal.kind).with_properties(literal.to_properties()))?;
            template.add_output(Output::new(format!("{}InstanceId", name), instance.reference()))?;
            for (suffix, attribute) in INSTANCE_OUTPUTS {
                template.add_output(Output::new(format!("{}{}", name, suffix), instance.get_att(*attribute)))?;
            }
            debug!("Declared instance {}", name);
        }

        Ok(template)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityGroups;

impl Blueprint for SecurityGroups {
    fn id(&self) -> &'static str {
        "ec2.SecurityGroups"
    }

    fn description(&self) -> &'static str {
        "EC2 security groups declared inline"
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new().required(
            "SecurityGroups",
            VariableType::ResourceMap(SECURITY_GROUP),
            "Security groups to create, keyed by logical id.",
        )
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let mut template = Template::new("EC2 security groups");

        for (name, literal) in vars.resources("SecurityGroups")? {
            let group =
                template.add_resource(Resource::new(name.as_str(), literal.kind).with_properties(literal.to_properties()))?;
            template.add_output(Output::new(format!("{}Id", name), group.reference()))?;
        }

        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::{json, Value as Json};
    use strata_template::Value;
    use strata_vars::VarsError;

    use crate::error::BlueprintError;

    fn build(blueprint: &dyn Blueprint, vars: Json) -> BlueprintResult<Template> {
        let vars: BTreeMap<String, Json> = serde_json::from_value(vars).unwrap();
        let resolved = blueprint.schema().resolve(&vars)?;
        blueprint.create_template(&Context::default(), &resolved)
    }

    #[test]
    fn test_instances() {
        let template = build(&Instances, json!({"Instances": {"MyInstance": {"ImageId": "ami-abc12345"}}})).unwrap();

        let instance = template.resource("MyInstance").unwrap();
        assert_eq!(instance.property("ImageId"), Some(&Value::str("ami-abc12345")));
        assert_eq!(template.outputs().count(), 6);
        assert_eq!(
            template.output("MyInstanceAZ").unwrap().value,
            Value::GetAtt {
                resource: "MyInstance".into(),
                attribute: "AvailabilityZone".into()
            }
        );
    }

    #[test]
    fn test_instance_requires_image() {
        let err = build(&Instances, json!({"Instances": {"MyInstance": {}}})).unwrap_err();
        assert!(matches!(err, BlueprintError::Variables(VarsError::InvalidResource { .. })));
    }

    #[test]
    fn test_security_groups() {
        let template = build(
            &SecurityGroups,
            json!({"SecurityGroups": {"MySG1": {"GroupDescription": "My first SecurityGroup"}}}),
        )
        .unwrap();

        assert!(template.contains_resource("MySG1"));
        assert_eq!(template.output("MySG1Id").unwrap().value, Value::Ref("MySG1".into()));
    }
}
