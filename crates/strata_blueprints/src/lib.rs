//! # strata_blueprints
//!
//! Declarative infrastructure blueprints. Each blueprint declares a variable
//! schema and turns one resolved set of variables into a [`Template`].
//!
//! The interesting part is conditional topology selection:
//!
//! - [`GatewayInputs`] picks how a subnet reaches the outside world
//! - [`RoleSource`] either reuses an external role ARN or declares a role and its policy
//! - [`ContainerLogging`] derives one log group for both the container and its execution policy
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_blueprints::{render, BlueprintRegistry, Context};
//!
//! let registry = BlueprintRegistry::builtin();
//! let network = registry.get_required("network.Network")?;
//! let stack = render(network.as_ref(), &Context::new("acme", "prod"), "subnet", &variables)?;
//! println!("{}", stack.template.to_json()?);
//! ```
//!
//! [`Template`]: strata_template::Template

pub mod blueprint;
pub mod config;
pub mod context;
pub mod ec2;
pub mod ecs;
pub mod error;
pub mod iam_roles;
pub mod kinesis;
pub mod logging;
pub mod network;
pub mod policies;
pub mod registry;
pub mod roles;
pub mod topology;

pub use blueprint::{render, Blueprint, RenderedStack};
pub use config::{substitute, ConfigFormat, StackConfig, StackDefinition};
pub use context::Context;
pub use ec2::{Instances, SecurityGroups};
pub use ecs::{Cluster, LaunchMode, ServiceConfig, SimpleEcsService, SimpleFargateService};
pub use error::{BlueprintError, BlueprintResult};
pub use iam_roles::{Ec2Role, LambdaRole, Roles};
pub use kinesis::Streams;
pub use logging::{ContainerLogging, LogGroupOrigin, AWSLOGS_DRIVER};
pub use network::Network;
pub use registry::BlueprintRegistry;
pub use roles::{AssembledRole, PolicySpec, RoleDefinition, RoleService, RoleSource};
pub use topology::{GatewayInputs, GatewayTopology, NetworkType};
