//! A single subnet with its route table and default route.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use strata_template::{tags, Output, Resource, ResourceHandle, Template};
use strata_vars::{ResolvedVariables, VariableSchema, VariableType};

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::BlueprintResult;
use crate::topology::{GatewayInputs, GatewayTopology};

const DEFAULT_DESTINATION: &str = "0.0.0.0/0";

/// Subnet, route table and default route, routed through the selected gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct Network;

impl Network {
    /// Declare the elastic IP and NAT gateway placed in `subnet`.
    fn add_nat_gateway(
        template: &mut Template,
        subnet: &ResourceHandle,
        internet_gateway_id: &str,
        user_tags: &BTreeMap<String, String>,
    ) -> BlueprintResult<ResourceHandle> {
        let eip = template.add_resource(Resource::new("NatGatewayEIP", "AWS::EC2::EIP").with("Domain", "vpc"))?;

        let mut nat_tags = user_tags.clone();
        nat_tags.insert("InternetGatewayId".to_string(), internet_gateway_id.to_string());

        let nat = template.add_resource(
            Resource::new("NatGateway", "AWS::EC2::NatGateway")
                .with("AllocationId", eip.get_att("AllocationId"))
                .with("ConnectivityType", "public")
                .with("SubnetId", subnet.reference())
                .with("Tags", tags(&nat_tags)),
        )?;

        template.add_output(Output::new("NatGatewayId", nat.reference()))?;
        template.add_output(Output::new("NatGatewayEIP", eip.reference()))?;
        Ok(nat)
    }
}

impl Blueprint for Network {
    fn id(&self) -> &'static str {
        "network.Network"
    }

    fn description(&self) -> &'static str {
        "A subnet routed through an internet gateway or a NAT gateway"
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new()
            .required("VpcId", VariableType::String, "The VPC to create the subnet in.")
            .optional(
                "VpcDefaultSecurityGroup",
                VariableType::String,
                json!(""),
                "The default security group of the VPC, re-exported for convenience.",
            )
            .required("AvailabilityZone", VariableType::String, "The availability zone of the subnet.")
            .required("CidrBlock", VariableType::String, "The CIDR block of the subnet.")
            .optional(
                "InternetGatewayId",
                VariableType::String,
                json!(""),
                "An internet gateway to route through. Makes the subnet public.",
            )
            .optional(
                "NatGatewayId",
                VariableType::String,
                json!(""),
                "An existing NAT gateway to route through. Makes the subnet private.",
            )
            .optional(
                "CreateNatGateway",
                VariableType::Boolean,
                json!(false),
                "Create a NAT gateway in this subnet and route through it.",
            )
            .optional("Tags", VariableType::Map, json!({}), "Extra tags for the subnet resources.")
    }

    fn create_template(&self, _ctx: &Context, vars: &ResolvedVariables) -> BlueprintResult<Template> {
        let topology = GatewayInputs::new(
            vars.opt_str("InternetGatewayId")?,
            vars.opt_str("NatGatewayId")?,
            vars.bool("CreateNatGateway")?,
        )
        .select()?;

        let vpc_id = vars.str("VpcId")?;
        let availability_zone = vars.str("AvailabilityZone")?;
        let cidr_block = vars.str("CidrBlock")?;
        let user_tags = vars.string_map("Tags")?;
        let resource_tags = (!user_tags.is_empty()).then(|| tags(&user_tags));

        let mut template = Template::new(format!(
            "{} subnet {} in {}",
            topology.network_type(),
            cidr_block,
            availability_zone
        ));

        let subnet = template.add_resource(
            Resource::new("Subnet", "AWS::EC2::Subnet")
                .with("AvailabilityZone", availability_zone)
                .with("CidrBlock", cidr_block)
                .with("VpcId", vpc_id)
                .with_opt("Tags", resource_tags.clone()),
        )?;

        let route_table = template.add_resource(
            Resource::new("RouteTable", "AWS::EC2::RouteTable")
                .with("VpcId", vpc_id)
                .with_opt("Tags", resource_tags),
        )?;

        template.add_resource(
            Resource::new("SubnetRouteTableAssociation", "AWS::EC2::SubnetRouteTableAssociation")
                .with("RouteTableId", route_table.reference())
                .with("SubnetId", subnet.reference()),
        )?;

        let route = Resource::new("DefaultRoute", "AWS::EC2::Route")
            .with("DestinationCidrBlock", DEFAULT_DESTINATION)
            .with("RouteTableId", route_table.reference());
        let route = match &topology {
            GatewayTopology::InternetGateway { internet_gateway_id } => {
                route.with("GatewayId", internet_gateway_id.as_str())
            }
            GatewayTopology::NewNatGateway { internet_gateway_id } => {
                let nat = Self::add_nat_gateway(&mut template, &subnet, internet_gateway_id, &user_tags)?;
                route.with("NatGatewayId", nat.reference())
            }
            GatewayTopology::ExistingNatGateway { nat_gateway_id } => {
                route.with("NatGatewayId", nat_gateway_id.as_str())
            }
        };
        let route = template.add_resource(route)?;

        template.add_output(Output::new("SubnetId", subnet.reference()))?;
        template.add_output(Output::new("RouteTableId", route_table.reference()))?;
        template.add_output(Output::new("DefaultRouteId", route.reference()))?;
        template.add_output(Output::new("NetworkType", topology.network_type().as_str()))?;
        template.add_output(Output::new("AvailabilityZone", availability_zone))?;
        template.add_output(Output::new("CidrBlock", cidr_block))?;
        template.add_output(Output::new("VpcId", vpc_id))?;
        if let Some(sg) = vars.opt_str("VpcDefaultSecurityGroup")? {
            template.add_output(Output::new("VpcDefaultSecurityGroup", sg))?;
        }

        debug!("Network {} routed via {:?}", cidr_block, topology);
        Ok(template)
    }
}
