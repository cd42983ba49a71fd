//! ECS clusters and single-container services.
//!
//! Both service variants share [`ServiceConfig`] and differ only in their
//! [`LaunchMode`]. The container's log group is resolved once through
//! [`ContainerLogging`] and the same value scopes the execution role policy.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use strata_template::{Output, Resource, Template, Value};
use strata_vars::{ResolvedVariables, ResourceShape, VariableSchema, VariableType};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::BlueprintResult;
use crate::logging::ContainerLogging;
use crate::policies::ecs_task_execution_statements;
use crate::roles::{PolicySpec, RoleDefinition, RoleService, RoleSource};

const LOG_CONFIGURATION: ResourceShape = ResourceShape::new("AWS::ECS::TaskDefinition.LogConfiguration")
    .requires(&["LogDriver"])
    .known(&["LogDriver", "Options", "SecretOptions"]);

/// A bare ECS cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cluster;

impl Blueprint for Cluster {
    fn id(&self) -> &'static str {
        "ecs.Cluster"
    }

    fn description(&self) -> &'static str {
        "An ECS cluster"
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new()
    }

    fn create_template(&self, _ctx: &Context, _vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let mut template = Template::new("ECS cluster");
        let cluster = template.add_resource(Resource::new("Cluster", "AWS::ECS::Cluster"))?;

        template.add_output(Output::new("ClusterId", cluster.reference()))?;
        template.add_output(Output::new("ClusterArn", cluster.get_att("Arn")))?;
        Ok(template)
    }
}

/// How tasks of a service are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Serverless tasks in the given subnets, one ENI per task.
    Fargate {
        subnets: Vec<String>,
        security_group: String,
    },
    /// Tasks on the cluster's container instances.
    Ec2,
}

impl LaunchMode {
    pub fn launch_type(&self) -> &'static str {
        match self {
            LaunchMode::Fargate { .. } => "FARGATE",
            LaunchMode::Ec2 => "EC2",
        }
    }

    fn task_properties(&self, config: &ServiceConfig) -> BTreeMap<String, Value> {
        let mut properties = BTreeMap::new();
        if let LaunchMode::Fargate { .. } = self {
            properties.insert("Cpu".to_string(), Value::str(config.cpu.to_string()));
            properties.insert("Memory".to_string(), Value::str(config.memory.to_string()));
            properties.insert("NetworkMode".to_string(), Value::str("awsvpc"));
            properties.insert(
                "RequiresCompatibilities".to_string(),
                Value::str_list([self.launch_type()]),
            );
        }
        properties
    }

    fn network_configuration(&self) -> Option<Value> {
        match self {
            LaunchMode::Fargate {
                subnets,
                security_group,
            } => Some(Value::object([(
                "AwsvpcConfiguration",
                Value::object([
                    ("SecurityGroups", Value::str_list([security_group.as_str()])),
                    ("Subnets", Value::str_list(subnets.iter().cloned())),
                ]),
            )])),
            LaunchMode::Ec2 => None,
        }
    }
}

/// Variables common to every service variant.
fn service_schema() -> VariableSchema {
    VariableSchema::new()
        .required("ServiceName", VariableType::String, "A simple name for the service.")
        .required("Image", VariableType::String, "The docker image to use for the task.")
        .optional(
            "Command",
            VariableType::List,
            json!([]),
            "The command and its arguments to run inside the container. Defaults to the image's command.",
        )
        .required(
            "Cluster",
            VariableType::String,
            "The name or ARN of the ECS cluster to run the tasks on.",
        )
        .required("CPU", VariableType::Integer, "The CPU units used by each task.")
        .required("Memory", VariableType::Integer, "The memory (in megabytes) reserved for each task.")
        .optional("Count", VariableType::Integer, json!(1), "The number of tasks to run.")
        .optional("TaskRoleArn", VariableType::String, json!(""), "An optional role to run the task as.")
        .optional(
            "TaskExecutionRoleArn",
            VariableType::String,
            json!(""),
            "An optional task execution role ARN. If not provided, one is created.",
        )
        .optional("Environment", VariableType::Map, json!({}), "Environment variables for the container.")
        .unset(
            "LogConfiguration",
            VariableType::Resource(LOG_CONFIGURATION),
            "An explicit container log configuration. Defaults to awslogs with a group named after the service.",
        )
        .optional(
            "LogGroup",
            VariableType::String,
            json!(""),
            "An existing CloudWatch log group to send logs to.",
        )
        .optional(
            "LogRetentionDays",
            VariableType::Integer,
            json!(30),
            "Retention for the log group created for the service.",
        )
        .optional(
            "ContainerPort",
            VariableType::Integer,
            json!(0),
            "A port exposed by the container. 0 exposes nothing.",
        )
}

/// Resolved settings for one service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub service_name: String,
    pub image: String,
    pub command: Vec<String>,
    pub cluster: String,
    pub cpu: i64,
    pub memory: i64,
    pub count: i64,
    pub task_role_arn: Option<String>,
    pub environment: BTreeMap<String, String>,
    pub logging: ContainerLogging,
    pub log_retention_days: i64,
    pub container_port: Option<i64>,
    pub execution_role: RoleSource,
}

impl ServiceConfig {
    /// Read the shared service variables. Fails before any resource exists.
    pub fn from_vars(vars: &ResolvedVariables) -> BlueprintResult<Self> {
        let service_name = vars.str("ServiceName")?.to_string();
        let logging = ContainerLogging::resolve(
            &service_name,
            vars.resource("LogConfiguration")?,
            vars.opt_str("LogGroup")?,
        )?;
        let execution_role = RoleSource::from_arn(
            vars.opt_str("TaskExecutionRoleArn")?,
            RoleDefinition::new("TaskExecutionRole", RoleService::EcsTasks),
        );

        Ok(Self {
            image: vars.str("Image")?.to_string(),
            command: vars.string_list("Command")?,
            cluster: vars.str("Cluster")?.to_string(),
            cpu: vars.int("CPU")?,
            memory: vars.int("Memory")?,
            count: vars.int("Count")?,
            task_role_arn: vars.opt_str("TaskRoleArn")?.map(String::from),
            environment: vars.string_map("Environment")?,
            logging,
            log_retention_days: vars.int("LogRetentionDays")?,
            container_port: Some(vars.int("ContainerPort")?).filter(|p| *p > 0),
            execution_role,
            service_name,
        })
    }

    fn container_definition(&self, mode: &LaunchMode) -> Value {
        let mut container = BTreeMap::new();
        container.insert("Name".to_string(), Value::str(&self.service_name));
        container.insert("Image".to_string(), Value::str(&self.image));
        container.insert("Essential".to_string(), Value::from(true));
        container.insert("LogConfiguration".to_string(), self.logging.configuration().clone());

        if !self.command.is_empty() {
            container.insert("Command".to_string(), Value::str_list(self.command.iter().cloned()));
        }
        if !self.environment.is_empty() {
            let environment = self
                .environment
                .iter()
                .map(|(k, v)| Value::object([("Name", Value::str(k)), ("Value", Value::str(v))]))
                .collect::<Vec<_>>();
            container.insert("Environment".to_string(), Value::List(environment));
        }
        if let Some(port) = self.container_port {
            container.insert(
                "PortMappings".to_string(),
                Value::List(vec![Value::object([("ContainerPort", Value::from(port))])]),
            );
        }
        if let LaunchMode::Ec2 = mode {
            container.insert("Cpu".to_string(), Value::from(self.cpu));
            container.insert("Memory".to_string(), Value::from(self.memory));
        }

        Value::Map(container)
    }
}

/// Build a single-container service template for the given launch mode.
fn create_service_template(config: &ServiceConfig, mode: &LaunchMode) -> BlueprintResult<Template> {
    let mut template = Template::new(format!(
        "{} service {}",
        mode.launch_type(),
        config.service_name
    ));

    if config.logging.declares_log_group() {
        let log_group = template.add_resource(
            Resource::new("LogGroup", "AWS::Logs::LogGroup")
                .with_opt("LogGroupName", config.logging.log_group())
                .with("RetentionInDays", config.log_retention_days),
        )?;
        template.add_output(Output::new("LogGroupName", log_group.reference()))?;
    }

    let policy = PolicySpec::new(
        "TaskExecutionRolePolicy",
        Value::sub("${AWS::StackName}-task-execution-role-policy"),
        ecs_task_execution_statements(config.logging.log_group()),
    );
    let execution_role = config.execution_role.assemble(&mut template, policy)?;
    if let Some(role) = &execution_role.role {
        template.add_output(Output::new("TaskExecutionRoleName", role.reference()))?;
    }
    template.add_output(Output::new("TaskExecutionRoleArn", execution_role.arn.clone()))?;

    let mut task = Resource::new("TaskDefinition", "AWS::ECS::TaskDefinition")
        .with("ContainerDefinitions", vec![config.container_definition(mode)])
        .with("ExecutionRoleArn", execution_role.arn)
        .with("Family", config.service_name.as_str())
        .with_opt("TaskRoleArn", config.task_role_arn.as_deref())
        .with_properties(mode.task_properties(config));
    if config.logging.declares_log_group() {
        task = task.depends_on("LogGroup");
    }
    let task = template.add_resource(task)?;
    template.add_output(Output::new("TaskDefinitionArn", task.reference()))?;

    let service = template.add_resource(
        Resource::new("Service", "AWS::ECS::Service")
            .with("Cluster", config.cluster.as_str())
            .with("DesiredCount", config.count)
            .with("LaunchType", mode.launch_type())
            .with_opt("NetworkConfiguration", mode.network_configuration())
            .with("ServiceName", config.service_name.as_str())
            .with("TaskDefinition", task.reference()),
    )?;
    template.add_output(Output::new("ServiceArn", service.reference()))?;
    template.add_output(Output::new("ServiceName", service.get_att("Name")))?;

    debug!(
        "Built {} service {} (external execution role: {})",
        mode.launch_type(),
        config.service_name,
        config.execution_role.is_external()
    );
    Ok(template)
}

/// A Fargate service running one container.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFargateService;

impl Blueprint for SimpleFargateService {
    fn id(&self) -> &'static str {
        "ecs.SimpleFargateService"
    }

    fn description(&self) -> &'static str {
        "A single-container ECS service on Fargate"
    }

    fn schema(&self) -> VariableSchema {
        service_schema()
            .required("Subnets", VariableType::List, "The VPC subnets to deploy the tasks in.")
            .required("SecurityGroup", VariableType::String, "The security group attached to the tasks.")
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let config = ServiceConfig::from_vars(vars)?;
        let mode = LaunchMode::Fargate {
            subnets: vars.string_list("Subnets")?,
            security_group: vars.str("SecurityGroup")?.to_string(),
        };
        create_service_template(&config, &mode)
    }
}

/// An ECS service on EC2 container instances running one container.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEcsService;

impl Blueprint for SimpleEcsService {
    fn id(&self) -> &'static str {
        "ecs.SimpleECSService"
    }

    fn description(&self) -> &'static str {
        "A single-container ECS service on EC2 container instances"
    }

    fn schema(&self) -> VariableSchema {
        service_schema()
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let config = ServiceConfig::from_vars(vars)?;
        create_service_template(&config, &LaunchMode::Ec2)
    }
}
