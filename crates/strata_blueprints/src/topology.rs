//! Network gateway / NAT selection.
//!
//! A subnet's default route goes through exactly one of:
//!
//! - an existing internet gateway (public subnet)
//! - a NAT gateway created in this subnet (public subnet)
//! - an existing NAT gateway (private subnet)
//!
//! [`GatewayInputs::select`] maps the three optional inputs onto one of
//! these, or fails on a contradictory combination before any resource is
//! declared.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BlueprintError, BlueprintResult};

/// Public/private classification of a subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Public,
    Private,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Public => "public",
            NetworkType::Private => "private",
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw gateway inputs. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayInputs {
    pub internet_gateway_id: Option<String>,
    pub nat_gateway_id: Option<String>,
    pub create_nat_gateway: bool,
}

impl GatewayInputs {
    pub fn new(
        internet_gateway_id: Option<&str>,
        nat_gateway_id: Option<&str>,
        create_nat_gateway: bool,
    ) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(String::from);
        Self {
            internet_gateway_id: non_empty(internet_gateway_id),
            nat_gateway_id: non_empty(nat_gateway_id),
            create_nat_gateway,
        }
    }

    /// Pick the single topology these inputs describe.
    pub fn select(&self) -> BlueprintResult<GatewayTopology> {
        let topology = match (&self.internet_gateway_id, &self.nat_gateway_id, self.create_nat_gateway) {
            (Some(igw), Some(nat), _) => {
                return Err(BlueprintError::GatewayConflict {
                    internet_gateway_id: igw.clone(),
                    nat_gateway_id: nat.clone(),
                })
            }
            (None, Some(nat), true) => {
                return Err(BlueprintError::AmbiguousNatGateway {
                    nat_gateway_id: nat.clone(),
                })
            }
            (None, None, true) => return Err(BlueprintError::NatGatewayWithoutInternetGateway),
            (None, None, false) => return Err(BlueprintError::MissingGateway),
            (None, Some(nat), false) => GatewayTopology::ExistingNatGateway {
                nat_gateway_id: nat.clone(),
            },
            (Some(igw), None, true) => {
                info!("Creating a NAT gateway attached to {}", igw);
                GatewayTopology::NewNatGateway {
                    internet_gateway_id: igw.clone(),
                }
            }
            (Some(igw), None, false) => GatewayTopology::InternetGateway {
                internet_gateway_id: igw.clone(),
            },
        };

        debug!("Selected gateway topology {:?} ({})", topology, topology.network_type());
        Ok(topology)
    }
}

/// The route target chosen for a subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayTopology {
    /// Default route straight through an existing internet gateway.
    InternetGateway { internet_gateway_id: String },
    /// Create a NAT gateway attached to the internet gateway and route through it.
    NewNatGateway { internet_gateway_id: String },
    /// Default route through an existing NAT gateway.
    ExistingNatGateway { nat_gateway_id: String },
}

impl GatewayTopology {
    pub fn network_type(&self) -> NetworkType {
        match self {
            GatewayTopology::InternetGateway { .. } | GatewayTopology::NewNatGateway { .. } => NetworkType::Public,
            GatewayTopology::ExistingNatGateway { .. } => NetworkType::Private,
        }
    }

    pub fn creates_nat_gateway(&self) -> bool {
        matches!(self, GatewayTopology::NewNatGateway { .. })
    }

    pub fn internet_gateway_id(&self) -> Option<&str> {
        match self {
            GatewayTopology::InternetGateway { internet_gateway_id }
            | GatewayTopology::NewNatGateway { internet_gateway_id } => Some(internet_gateway_id),
            GatewayTopology::ExistingNatGateway { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(igw: Option<&str>, nat: Option<&str>, create: bool) -> BlueprintResult<GatewayTopology> {
        GatewayInputs::new(igw, nat, create).select()
    }

    #[test]
    fn test_single_input_classification() {
        let private = select(None, Some("nat-1"), false).unwrap();
        assert_eq!(private.network_type(), NetworkType::Private);
        assert!(!private.creates_nat_gateway());

        let public = select(Some("igw-1"), None, false).unwrap();
        assert_eq!(public.network_type(), NetworkType::Public);
        assert!(!public.creates_nat_gateway());
    }

    #[test]
    fn test_create_nat_gateway_is_public() {
        let topology = select(Some("igw-1"), None, true).unwrap();
        assert_eq!(topology.network_type(), NetworkType::Public);
        assert!(topology.creates_nat_gateway());
        assert_eq!(topology.internet_gateway_id(), Some("igw-1"));
    }

    #[test]
    fn test_both_gateways_conflict() {
        for create in [false, true] {
            let err = select(Some("igw-1"), Some("nat-1"), create).unwrap_err();
            assert!(matches!(err, BlueprintError::GatewayConflict { .. }));
        }
    }

    #[test]
    fn test_nat_gateway_and_create_is_ambiguous() {
        let err = select(None, Some("nat-1"), true).unwrap_err();
        assert!(matches!(err, BlueprintError::AmbiguousNatGateway { nat_gateway_id } if nat_gateway_id == "nat-1"));
    }

    #[test]
    fn test_no_gateway() {
        assert!(matches!(select(None, None, false), Err(BlueprintError::MissingGateway)));
        assert!(matches!(
            select(None, None, true),
            Err(BlueprintError::NatGatewayWithoutInternetGateway)
        ));
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let topology = select(Some("igw-1"), Some(""), false).unwrap();
        assert_eq!(topology.network_type(), NetworkType::Public);
    }
}
