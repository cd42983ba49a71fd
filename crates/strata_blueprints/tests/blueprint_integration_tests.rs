//! Integration tests for the built-in blueprints.

use std::collections::BTreeMap;
use std::fs;

use serde_json::{json, Value as Json};
use strata_blueprints::{
    render, BlueprintError, BlueprintRegistry, Context, RenderedStack, StackConfig,
};
use strata_template::{OutputFormat, Value};
use tempfile::tempdir;

fn vars(value: Json) -> BTreeMap<String, Json> {
    serde_json::from_value(value).unwrap()
}

fn render_with(id: &str, value: Json) -> Result<RenderedStack, BlueprintError> {
    let registry = BlueprintRegistry::builtin();
    let blueprint = registry.get_required(id)?;
    render(blueprint.as_ref(), &Context::new("test", "test"), "stack", &vars(value))
}

fn network(extra: Json) -> Result<RenderedStack, BlueprintError> {
    let mut base = json!({
        "VpcId": "vpc-abc1234",
        "AvailabilityZone": "us-east-1a",
        "CidrBlock": "10.0.0.0/24",
    });
    if let (Json::Object(base), Json::Object(extra)) = (&mut base, extra) {
        base.extend(extra);
    }
    render_with("network.Network", base)
}

fn fargate(extra: Json) -> Result<RenderedStack, BlueprintError> {
    let mut base = json!({
        "ServiceName": "WorkerService",
        "Image": "fake_repo/image:12345",
        "Command": ["/bin/run", "--args 1"],
        "Cluster": "fake-fargate-cluster",
        "CPU": 1024,
        "Memory": 2048,
        "Count": 3,
        "Subnets": ["net-123456", "net-5678910"],
        "SecurityGroup": "sg-abc1234",
        "Environment": {"DATABASE_URL": "sql://fake_db/fake_db", "DEBUG": "false"},
    });
    if let (Json::Object(base), Json::Object(extra)) = (&mut base, extra) {
        base.extend(extra);
    }
    render_with("ecs.SimpleFargateService", base)
}

fn network_type(stack: &RenderedStack) -> String {
    stack.template.output("NetworkType").unwrap().value.as_str().unwrap().to_string()
}

#[test]
fn test_single_gateway_classification() {
    for create in [json!(null), json!(false)] {
        let private = network(json!({"NatGatewayId": "nat-1", "CreateNatGateway": create})).unwrap();
        assert_eq!(network_type(&private), "private");

        let public = network(json!({"InternetGatewayId": "igw-1", "CreateNatGateway": create})).unwrap();
        assert_eq!(network_type(&public), "public");
    }
}

#[test]
fn test_contradictory_gateways_fail() {
    let cases = [
        json!({"InternetGatewayId": "igw-1", "NatGatewayId": "nat-1"}),
        json!({"InternetGatewayId": "igw-1", "NatGatewayId": "nat-1", "CreateNatGateway": true}),
        json!({"NatGatewayId": "nat-1", "CreateNatGateway": true}),
    ];
    for case in cases {
        let err = network(case.clone()).unwrap_err();
        assert!(err.is_configuration_error(), "{} should be rejected, got {}", case, err);
    }
}

#[test]
fn test_create_nat_gateway_scenario() {
    let stack = network(json!({"InternetGatewayId": "igw-1", "CreateNatGateway": true})).unwrap();
    let template = &stack.template;

    let nats: Vec<_> = template.resources_of_kind("AWS::EC2::NatGateway").collect();
    assert_eq!(nats.len(), 1);
    let nat_tags = nats[0].property("Tags").unwrap().as_list().unwrap();
    assert!(nat_tags.iter().any(|t| {
        t.get("Key") == Some(&Value::str("InternetGatewayId")) && t.get("Value") == Some(&Value::str("igw-1"))
    }));

    let route = template.resource("DefaultRoute").unwrap();
    assert_eq!(route.property("NatGatewayId"), Some(&Value::Ref("NatGateway".into())));
    assert!(route.property("GatewayId").is_none());
    assert_eq!(network_type(&stack), "public");
}

#[test]
fn test_existing_nat_gateway_scenario() {
    let stack = network(json!({"NatGatewayId": "nat-1"})).unwrap();
    let template = &stack.template;

    assert_eq!(template.resources_of_kind("AWS::EC2::NatGateway").count(), 0);
    assert_eq!(
        template.resource("DefaultRoute").unwrap().property("NatGatewayId"),
        Some(&Value::str("nat-1"))
    );
    assert_eq!(network_type(&stack), "private");
}

#[test]
fn test_external_execution_role_is_reexported() {
    let arn = "arn:aws:iam::123456789012:role/ecsTaskExecutionRole";
    let stack = fargate(json!({"TaskExecutionRoleArn": arn})).unwrap();
    let template = &stack.template;

    assert_eq!(template.resources_of_kind("AWS::IAM::Role").count(), 0);
    assert_eq!(template.resources_of_kind("AWS::IAM::Policy").count(), 0);
    assert_eq!(template.output("TaskExecutionRoleArn").unwrap().value, Value::str(arn));
}

#[test]
fn test_default_log_group_round_trip() {
    let stack = fargate(json!({})).unwrap();
    let template = &stack.template;

    let container = &template
        .resource("TaskDefinition")
        .unwrap()
        .property("ContainerDefinitions")
        .unwrap()
        .as_list()
        .unwrap()[0];
    let group = container
        .get("LogConfiguration")
        .and_then(|c| c.get("Options"))
        .and_then(|o| o.get("awslogs-group"))
        .and_then(Value::as_str)
        .unwrap();
    assert_eq!(group, "WorkerService");

    let policy = template.resource("TaskExecutionRolePolicy").unwrap();
    let statements = policy
        .property("PolicyDocument")
        .and_then(|d| d.get("Statement"))
        .and_then(Value::as_list)
        .unwrap();
    let authorized: Vec<&str> = statements
        .iter()
        .filter_map(|s| s.get("Resource")?.as_list())
        .flatten()
        .filter_map(|r| match r {
            Value::Sub(arn) => arn.split(":log-group:").nth(1)?.strip_suffix(":*"),
            _ => None,
        })
        .collect();
    assert_eq!(authorized, vec![group]);

    let log_group = template.resource("LogGroup").unwrap();
    assert_eq!(log_group.property("LogGroupName"), Some(&Value::str(group)));
    assert_eq!(log_group.property("RetentionInDays"), Some(&Value::from(30i64)));
}

#[test]
fn test_explicit_log_configuration_scopes_policy() {
    let stack = fargate(json!({
        "LogConfiguration": {
            "LogDriver": "awslogs",
            "Options": {"awslogs-group": "central", "awslogs-region": "us-east-1"},
        }
    }))
    .unwrap();

    assert!(!stack.template.contains_resource("LogGroup"));
    let json = stack.template.to_json().unwrap();
    assert!(json.contains(":log-group:central:*"));
    assert!(!json.contains(":log-group:WorkerService:*"));
}

#[test]
fn test_unknown_and_mistyped_variables() {
    let unknown = network(json!({"NatGatewayId": "nat-1", "Bogus": 1})).unwrap_err();
    assert!(matches!(unknown, BlueprintError::Variables(_)));

    let mistyped = fargate(json!({"CPU": "lots"})).unwrap_err();
    assert!(matches!(mistyped, BlueprintError::Variables(_)));

    let coerced = fargate(json!({"CPU": "512"})).unwrap();
    assert_eq!(
        coerced.template.resource("TaskDefinition").unwrap().property("Cpu"),
        Some(&Value::str("512"))
    );
}

#[test]
fn test_every_builtin_describes_itself() {
    let registry = BlueprintRegistry::builtin();
    for blueprint in registry.iter() {
        assert!(!blueprint.description().is_empty());
        assert!(blueprint.id().contains('.'));
    }
    assert!(registry.get_required("ecs.SimpleECSService").is_ok());
}

#[test]
fn test_config_renders_all_stacks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stacks.yaml");
    fs::write(
        &path,
        r#"
namespace: acme
environment: prod
stacks:
  - name: subnet
    blueprint: network.Network
    variables:
      VpcId: ${vpc_id}
      AvailabilityZone: us-east-1a
      CidrBlock: 10.0.0.0/24
      InternetGatewayId: igw-1
      CreateNatGateway: "true"
  - name: cluster
    blueprint: ecs.Cluster
  - name: skipped
    blueprint: ecs.Cluster
    enabled: false
"#,
    )
    .unwrap();

    let values = [("vpc_id".to_string(), "vpc-42".to_string())].into_iter().collect();
    let config = StackConfig::load(&path, &values).unwrap();
    let stacks = config.render_all(&BlueprintRegistry::builtin()).unwrap();

    let names: Vec<_> = stacks.iter().map(|s| s.stack_name.as_str()).collect();
    assert_eq!(names, vec!["acme-subnet", "acme-cluster"]);

    let out = dir.path().join("out").join("acme-subnet.json");
    stacks[0].template.write_to(&out, OutputFormat::Json).unwrap();
    let doc: Json = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["Resources"]["Subnet"]["Properties"]["VpcId"], "vpc-42");
    assert_eq!(doc["Resources"]["DefaultRoute"]["Properties"]["NatGatewayId"]["Ref"], "NatGateway");
}

#[test]
fn test_config_unknown_blueprint() {
    let config: StackConfig = serde_json::from_value(json!({
        "namespace": "acme",
        "stacks": [{"name": "x", "blueprint": "nope.Nope"}],
    }))
    .unwrap();
    let err = config.render_all(&BlueprintRegistry::builtin()).unwrap_err();
    assert!(matches!(err, BlueprintError::UnknownBlueprint(id) if id == "nope.Nope"));
}
