//! Standalone IAM role blueprints.
//!
//! Each blueprint can carry built-in statements (see `with_statements`) that
//! are combined with the `PolicyStatements` variable.

use serde_json::json;
use tracing::{debug, warn};

use strata_template::{Output, Resource, ResourceHandle, Statement, Template, Value};
use strata_vars::{ResolvedVariables, VariableSchema, VariableType};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::BlueprintResult;
use crate::policies::statements_from_literals;
use crate::roles::{attach_policy, create_role, PolicySpec, RoleDefinition, RoleService};

fn policy_statements_variable(schema: VariableSchema) -> VariableSchema {
    schema.optional(
        "PolicyStatements",
        VariableType::List,
        json!([]),
        "IAM policy statements granted to the created roles.",
    )
}

fn combined_statements(builtin: &[Statement], vars: &ResolvedVariables) -> BlueprintResult<Vec<Statement>> {
    let mut statements = builtin.to_vec();
    statements.extend(statements_from_literals("PolicyStatements", vars.list("PolicyStatements")?)?);
    Ok(statements)
}

fn stack_policy_name() -> Value {
    Value::sub("${AWS::StackName}-policy")
}

/// Any number of EC2 and Lambda roles sharing one policy.
#[derive(Debug, Clone, Default)]
pub struct Roles {
    statements: Vec<Statement>,
}

impl Roles {
    pub fn with_statements(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    fn add_roles(
        template: &mut Template,
        names: &[String],
        service: RoleService,
        created: &mut Vec<ResourceHandle>,
    ) -> BlueprintResult<()> {
        for name in names {
            let role = create_role(template, &RoleDefinition::new(name.as_str(), service))?;
            template.add_output(Output::new(format!("{}RoleName", name), role.reference()))?;
            template.add_output(Output::new(format!("{}RoleArn", name), role.get_att("Arn")))?;

            if service == RoleService::Ec2 {
                let profile = template.add_resource(
                    Resource::new(format!("{}InstanceProfile", name), "AWS::IAM::InstanceProfile")
                        .with("Roles", vec![role.reference()]),
                )?;
                template.add_output(Output::new(format!("{}InstanceProfile", name), profile.reference()))?;
            }

            created.push(role);
        }
        Ok(())
    }
}

impl Blueprint for Roles {
    fn id(&self) -> &'static str {
        "iam_roles.Roles"
    }

    fn description(&self) -> &'static str {
        "EC2 and Lambda roles sharing one policy"
    }

    fn schema(&self) -> VariableSchema {
        policy_statements_variable(
            VariableSchema::new()
                .optional("Ec2Roles", VariableType::List, json!([]), "Names of EC2 roles to create.")
                .optional("LambdaRoles", VariableType::List, json!([]), "Names of Lambda roles to create."),
        )
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let ec2_roles = vars.string_list("Ec2Roles")?;
        let lambda_roles = vars.string_list("LambdaRoles")?;
        let statements = combined_statements(&self.statements, vars)?;

        if ec2_roles.is_empty() && lambda_roles.is_empty() {
            warn!("No Ec2Roles or LambdaRoles given, the template declares no roles");
        }

        let mut template = Template::new("IAM roles");
        let mut created = Vec::new();
        Self::add_roles(&mut template, &ec2_roles, RoleService::Ec2, &mut created)?;
        Self::add_roles(&mut template, &lambda_roles, RoleService::Lambda, &mut created)?;

        if !created.is_empty() {
            let refs = created.iter().map(ResourceHandle::reference).collect();
            attach_policy(&mut template, PolicySpec::new("Policy", stack_policy_name(), statements), refs)?;
        }

        debug!("Declared {} roles", created.len());
        Ok(template)
    }
}

/// Build a single role, with an optional instance profile and policy.
fn create_single_role(
    service: RoleService,
    builtin: &[Statement],
    vars: &ResolvedVariables,
    instance_profile: bool,
) -> BlueprintResult<Template> {
    let statements = combined_statements(builtin, vars)?;
    let name = vars.opt_str("Name")?;
    let path = vars.opt_str("Path")?;
    let definition = RoleDefinition::new("Role", service)
        .with_path(path)
        .with_name(name)
        .with_managed_policies(vars.string_list("AttachedPolicies")?);

    let mut template = Template::new(format!("IAM role for {}", service.principal()));
    let role = create_role(&mut template, &definition)?;
    template.add_output(Output::new("RoleName", role.reference()))?;
    template.add_output(Output::new("RoleArn", role.get_att("Arn")))?;

    if instance_profile {
        let profile = template.add_resource(
            Resource::new("InstanceProfile", "AWS::IAM::InstanceProfile")
                .with_opt("InstanceProfileName", name)
                .with_opt("Path", path)
                .with("Roles", vec![role.reference()]),
        )?;
        template.add_output(Output::new("InstanceProfileName", profile.reference()))?;
        template.add_output(Output::new("InstanceProfileArn", profile.get_att("Arn")))?;
    }

    let policy = attach_policy(
        &mut template,
        PolicySpec::new("Policy", stack_policy_name(), statements),
        vec![role.reference()],
    )?;
    if let Some(policy) = policy {
        template.add_output(Output::new("PolicyName", policy.reference()))?;
    }

    Ok(template)
}

fn single_role_schema() -> VariableSchema {
    policy_statements_variable(
        VariableSchema::new()
            .optional(
                "AttachedPolicies",
                VariableType::List,
                json!([]),
                "Managed policy ARNs to attach to the role.",
            )
            .optional("Name", VariableType::String, json!(""), "An explicit role name.")
            .optional("Path", VariableType::String, json!("/"), "The IAM path of the role."),
    )
}

/// A role assumable by EC2 instances.
#[derive(Debug, Clone, Default)]
pub struct Ec2Role {
    statements: Vec<Statement>,
}

impl Ec2Role {
    pub fn with_statements(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl Blueprint for Ec2Role {
    fn id(&self) -> &'static str {
        "iam_roles.Ec2Role"
    }

    fn description(&self) -> &'static str {
        "A role assumable by EC2, optionally with an instance profile"
    }

    fn schema(&self) -> VariableSchema {
        single_role_schema().optional(
            "InstanceProfile",
            VariableType::Boolean,
            json!(false),
            "Also create an instance profile for the role.",
        )
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        create_single_role(RoleService::Ec2, &self.statements, vars, vars.bool("InstanceProfile")?)
    }
}

/// A role assumable by Lambda functions.
#[derive(Debug, Clone, Default)]
pub struct LambdaRole {
    statements: Vec<Statement>,
}

impl LambdaRole {
    pub fn with_statements(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl Blueprint for LambdaRole {
    fn id(&self) -> &'static str {
        "iam_roles.LambdaRole"
    }

    fn description(&self) -> &'static str {
        "A role assumable by Lambda"
    }

    fn schema(&self) -> VariableSchema {
        single_role_schema()
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        create_single_role(RoleService::Lambda, &self.statements, vars, false)
    }
}
