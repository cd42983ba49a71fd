//! IAM role and permission assembly.

use tracing::debug;

use strata_template::{PolicyDocument, Resource, ResourceHandle, Statement, Template, TemplateResult, Value};

/// AWS service allowed to assume a generated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleService {
    EcsTasks,
    Ec2,
    Lambda,
}

impl RoleService {
    /// Service principal used in the trust policy.
    pub fn principal(&self) -> &'static str {
        match self {
            RoleService::EcsTasks => "ecs-tasks.amazonaws.com",
            RoleService::Ec2 => "ec2.amazonaws.com",
            RoleService::Lambda => "lambda.amazonaws.com",
        }
    }

    pub fn trust_policy(&self) -> PolicyDocument {
        PolicyDocument::trust(self.principal())
    }
}

/// A role to be declared in a template.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDefinition {
    pub logical_id: String,
    pub service: RoleService,
    pub path: Option<String>,
    pub role_name: Option<String>,
    pub managed_policy_arns: Vec<String>,
}

impl RoleDefinition {
    pub fn new(logical_id: impl Into<String>, service: RoleService) -> Self {
        Self {
            logical_id: logical_id.into(),
            service,
            path: None,
            role_name: None,
            managed_policy_arns: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Option<&str>) -> Self {
        self.path = path.map(String::from);
        self
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.role_name = name.map(String::from);
        self
    }

    pub fn with_managed_policies(mut self, arns: Vec<String>) -> Self {
        self.managed_policy_arns = arns;
        self
    }

    fn to_resource(&self) -> Resource {
        let managed = (!self.managed_policy_arns.is_empty())
            .then(|| Value::str_list(self.managed_policy_arns.iter().cloned()));

        Resource::new(&self.logical_id, "AWS::IAM::Role")
            .with("AssumeRolePolicyDocument", self.service.trust_policy())
            .with_opt("ManagedPolicyArns", managed)
            .with_opt("Path", self.path.as_deref())
            .with_opt("RoleName", self.role_name.as_deref())
    }
}

/// Inline permission policy attached to generated roles.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySpec {
    pub logical_id: String,
    pub policy_name: Value,
    pub statements: Vec<Statement>,
}

impl PolicySpec {
    pub fn new(logical_id: impl Into<String>, policy_name: Value, statements: Vec<Statement>) -> Self {
        Self {
            logical_id: logical_id.into(),
            policy_name,
            statements,
        }
    }
}

/// Attach a policy to the given roles. Nothing is declared when there are no statements.
pub fn attach_policy(
    template: &mut Template,
    spec: PolicySpec,
    roles: Vec<Value>,
) -> TemplateResult<Option<ResourceHandle>> {
    if spec.statements.is_empty() {
        debug!("No statements for {}, skipping policy", spec.logical_id);
        return Ok(None);
    }

    let policy = template.add_resource(
        Resource::new(spec.logical_id, "AWS::IAM::Policy")
            .with("PolicyName", spec.policy_name)
            .with("PolicyDocument", PolicyDocument::new(spec.statements))
            .with("Roles", Value::List(roles)),
    )?;
    Ok(Some(policy))
}

/// Where a blueprint's role comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleSource {
    /// Reuse a role created elsewhere.
    External { arn: String },
    /// Declare the role in this template.
    Create(RoleDefinition),
}

impl RoleSource {
    /// Use the ARN when one is supplied, otherwise create `definition`.
    pub fn from_arn(arn: Option<&str>, definition: RoleDefinition) -> Self {
        match arn.filter(|a| !a.is_empty()) {
            Some(arn) => RoleSource::External { arn: arn.to_string() },
            None => RoleSource::Create(definition),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, RoleSource::External { .. })
    }

    /// Declare the role and its policy, or neither for an external ARN.
    pub fn assemble(&self, template: &mut Template, policy: PolicySpec) -> TemplateResult<AssembledRole> {
        match self {
            RoleSource::External { arn } => {
                debug!("Using external role {}", arn);
                Ok(AssembledRole {
                    arn: Value::str(arn),
                    role: None,
                    policy: None,
                })
            }
            RoleSource::Create(definition) => {
                let role = template.add_resource(definition.to_resource())?;
                let policy = attach_policy(template, policy, vec![role.reference()])?;
                Ok(AssembledRole {
                    arn: role.get_att("Arn"),
                    role: Some(role),
                    policy,
                })
            }
        }
    }
}

/// Result of [`RoleSource::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRole {
    /// The role ARN: a literal for external roles, `Fn::GetAtt` otherwise.
    pub arn: Value,
    pub role: Option<ResourceHandle>,
    pub policy: Option<ResourceHandle>,
}

/// Declare a role directly, without a policy.
pub fn create_role(template: &mut Template, definition: &RoleDefinition) -> TemplateResult<ResourceHandle> {
    template.add_resource(definition.to_resource())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(statements: Vec<Statement>) -> PolicySpec {
        PolicySpec::new("RolePolicy", Value::str("policy"), statements)
    }

    #[test]
    fn test_external_role_creates_nothing() {
        let mut template = Template::new("test");
        let source = RoleSource::from_arn(
            Some("arn:aws:iam::123456789012:role/existing"),
            RoleDefinition::new("Role", RoleService::EcsTasks),
        );
        let assembled = source
            .assemble(&mut template, policy(vec![Statement::allow(["ecr:BatchGetImage"]).on("*")]))
            .unwrap();

        assert_eq!(assembled.arn, Value::str("arn:aws:iam::123456789012:role/existing"));
        assert!(assembled.role.is_none());
        assert_eq!(template.resources().count(), 0);
    }

    #[test]
    fn test_created_role_without_statements_has_no_policy() {
        let mut template = Template::new("test");
        let source = RoleSource::from_arn(Some(""), RoleDefinition::new("Role", RoleService::Lambda));
        let assembled = source.assemble(&mut template, policy(Vec::new())).unwrap();

        assert!(assembled.policy.is_none());
        assert!(template.contains_resource("Role"));
        assert!(!template.contains_resource("RolePolicy"));
        assert_eq!(assembled.arn, Value::GetAtt { resource: "Role".into(), attribute: "Arn".into() });
    }

    #[test]
    fn test_created_role_with_statements() {
        let mut template = Template::new("test");
        let source = RoleSource::Create(RoleDefinition::new("Role", RoleService::Ec2).with_path(Some("/")));
        source
            .assemble(&mut template, policy(vec![Statement::allow(["s3:GetObject"]).on("*")]))
            .unwrap();

        let role = template.resource("Role").unwrap();
        assert_eq!(role.property("Path"), Some(&Value::str("/")));
        let trust = role.property("AssumeRolePolicyDocument").unwrap();
        let statement = &trust.get("Statement").unwrap().as_list().unwrap()[0];
        assert_eq!(
            statement.get("Principal").and_then(|p| p.get("Service")),
            Some(&Value::List(vec![Value::str("ec2.amazonaws.com")]))
        );

        let policy = template.resource("RolePolicy").unwrap();
        assert_eq!(policy.property("Roles"), Some(&Value::List(vec![Value::Ref("Role".into())])));
        template.validate_references().unwrap();
    }
}
