//! Permission statements shared by the blueprints.

use serde_json::Value as Json;

use strata_template::{Statement, Value};

use crate::error::{BlueprintError, BlueprintResult};

/// ARN of a CloudWatch log group, including its streams.
pub fn log_group_arn(log_group: &str) -> Value {
    Value::sub(format!(
        "arn:${{AWS::Partition}}:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:{}:*",
        log_group
    ))
}

/// Statements an ECS task execution role needs to pull images and ship logs.
///
/// Log permissions are only granted for `log_group`, and only when one is in use.
pub fn ecs_task_execution_statements(log_group: Option<&str>) -> Vec<Statement> {
    let mut statements = vec![Statement::allow([
        "ecr:GetAuthorizationToken",
        "ecr:BatchCheckLayerAvailability",
        "ecr:GetDownloadUrlForLayer",
        "ecr:BatchGetImage",
    ])
    .on("*")];

    if let Some(group) = log_group {
        statements.push(
            Statement::allow(["logs:CreateLogStream", "logs:PutLogEvents"]).on(log_group_arn(group)),
        );
    }

    statements
}

const KINESIS_READ_ACTIONS: &[&str] = &[
    "kinesis:DescribeStream",
    "kinesis:DescribeStreamSummary",
    "kinesis:GetRecords",
    "kinesis:GetShardIterator",
    "kinesis:ListShards",
    "kinesis:ListStreams",
];

const KINESIS_WRITE_ACTIONS: &[&str] = &["kinesis:PutRecord", "kinesis:PutRecords"];

/// Read access to the given stream ARNs.
pub fn kinesis_read_statements(stream_arns: Vec<Value>) -> Vec<Statement> {
    vec![Statement::allow(KINESIS_READ_ACTIONS.iter().copied()).on_all(stream_arns)]
}

/// Read and write access to the given stream ARNs.
pub fn kinesis_read_write_statements(stream_arns: Vec<Value>) -> Vec<Statement> {
    let actions = KINESIS_READ_ACTIONS.iter().chain(KINESIS_WRITE_ACTIONS).copied();
    vec![Statement::allow(actions).on_all(stream_arns)]
}

/// Parse the literal statements of a `PolicyStatements` variable.
pub fn statements_from_literals(variable: &str, literals: &[Json]) -> BlueprintResult<Vec<Statement>> {
    literals
        .iter()
        .map(|literal| {
            Statement::from_literal(literal).map_err(|e| BlueprintError::InvalidPolicyStatement {
                variable: variable.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}
