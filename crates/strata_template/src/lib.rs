//! # strata_template
//!
//! Resource model for Strata blueprints.
//!
//! This crate provides the typed building blocks a blueprint assembles into a
//! CloudFormation-style template document:
//!
//! - **Values**: literals, lists, maps and intrinsic references
//!   (`Ref`, `Fn::GetAtt`, `Fn::Sub`, pseudo parameters)
//! - **Resources**: logical id, resource type and properties
//! - **Outputs**: named exports of a value
//! - **IAM documents**: trust and permission policies
//! - **Templates**: ownership of the graph, reference validation and
//!   JSON/YAML serialization
//!
//! ## Example
//!
//! ```rust
//! use strata_template::{Output, Resource, Template, Value};
//!
//! let mut template = Template::new("ECS cluster");
//! let cluster = template.add_resource(Resource::new("Cluster", "AWS::ECS::Cluster")).unwrap();
//!
//! template.add_output(Output::new("ClusterId", cluster.reference())).unwrap();
//! template.add_output(Output::new("ClusterArn", cluster.get_att("Arn"))).unwrap();
//!
//! template.validate_references().unwrap();
//! let json = template.to_json().unwrap();
//! assert!(json.contains("AWS::ECS::Cluster"));
//! ```

pub mod error;
pub mod iam;
pub mod resource;
pub mod template;
pub mod value;

pub use error::{TemplateError, TemplateResult};
pub use iam::{Effect, PolicyDocument, Statement};
pub use resource::{is_valid_logical_id, tags, Output, Resource, ResourceHandle};
pub use template::{OutputFormat, Template, TEMPLATE_FORMAT_VERSION};
pub use value::{Pseudo, Value};
