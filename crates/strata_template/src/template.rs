//! Template document: owns resources and outputs for one blueprint invocation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::resource::{is_valid_logical_id, Output, Resource, ResourceHandle};

/// Value of the `AWSTemplateFormatVersion` key.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Serialization format of a rendered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// A resource graph plus its outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "Resources")]
    resources: BTreeMap<String, Resource>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: (!description.is_empty()).then_some(description),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Add a resource, rejecting invalid or duplicate logical ids.
    pub fn add_resource(&mut self, resource: Resource) -> TemplateResult<ResourceHandle> {
        let id = resource.logical_id.clone();
        if !is_valid_logical_id(&id) {
            return Err(TemplateError::InvalidLogicalId(id));
        }
        if self.resources.contains_key(&id) {
            return Err(TemplateError::DuplicateResource(id));
        }

        debug!("Adding resource {} ({})", id, resource.kind);
        self.resources.insert(id.clone(), resource);
        Ok(ResourceHandle::new(id))
    }

    /// Add an output, rejecting invalid or duplicate names.
    pub fn add_output(&mut self, output: Output) -> TemplateResult<()> {
        if !is_valid_logical_id(&output.name) {
            return Err(TemplateError::InvalidLogicalId(output.name));
        }
        if self.outputs.contains_key(&output.name) {
            return Err(TemplateError::DuplicateOutput(output.name));
        }

        self.outputs.insert(output.name.clone(), output);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn contains_resource(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources of the given type, e.g. `AWS::EC2::NatGateway`.
    pub fn resources_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.values().filter(move |r| r.kind == kind)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.values()
    }

    /// Ensure every `Ref`, `Fn::GetAtt` and `DependsOn` targets a resource in this template.
    pub fn validate_references(&self) -> TemplateResult<()> {
        for resource in self.resources.values() {
            for target in resource.references() {
                if !self.resources.contains_key(target) {
                    return Err(TemplateError::DanglingReference {
                        from: resource.logical_id.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        for output in self.outputs.values() {
            for target in output.value.referenced_resources() {
                if !self.resources.contains_key(target) {
                    return Err(TemplateError::DanglingReference {
                        from: format!("output {}", output.name),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> TemplateResult<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Write the serialized template to a file.
    pub fn write_to(&self, path: &Path, format: OutputFormat) -> TemplateResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(format)?)?;
        debug!("Wrote template to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut template = Template::new("test");
        template.add_resource(Resource::new("Subnet", "AWS::EC2::Subnet")).unwrap();
        let err = template.add_resource(Resource::new("Subnet", "AWS::EC2::Subnet")).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateResource(id) if id == "Subnet"));
    }

    #[test]
    fn test_invalid_logical_id_rejected() {
        let mut template = Template::new("test");
        let err = template.add_resource(Resource::new("my-subnet", "AWS::EC2::Subnet")).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidLogicalId(_)));
    }

    #[test]
    fn test_dangling_reference_detected() {
        let mut template = Template::new("test");
        template
            .add_resource(Resource::new("Route", "AWS::EC2::Route").with("RouteTableId", Value::Ref("Missing".into())))
            .unwrap();
        let err = template.validate_references().unwrap_err();
        assert!(matches!(err, TemplateError::DanglingReference { target, .. } if target == "Missing"));
    }

    #[test]
    fn test_dangling_output_detected() {
        let mut template = Template::new("test");
        template.add_output(Output::new("RoleArn", Value::GetAtt {
            resource: "Role".into(),
            attribute: "Arn".into(),
        })).unwrap();
        assert!(template.validate_references().is_err());
    }

    #[test]
    fn test_json_document_shape() {
        let mut template = Template::new("cluster");
        let cluster = template.add_resource(Resource::new("Cluster", "AWS::ECS::Cluster")).unwrap();
        template.add_output(Output::new("ClusterId", cluster.reference())).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
        assert_eq!(doc["AWSTemplateFormatVersion"], TEMPLATE_FORMAT_VERSION);
        assert_eq!(doc["Resources"]["Cluster"]["Type"], "AWS::ECS::Cluster");
        assert!(doc["Resources"]["Cluster"].get("Properties").is_none());
        assert_eq!(doc["Outputs"]["ClusterId"]["Value"]["Ref"], "Cluster");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("YML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }
}
