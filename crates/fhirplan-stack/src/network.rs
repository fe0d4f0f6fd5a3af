//! Environment resolver — references to pre-existing network resources.
//!
//! The VPC and the private DNS zone are owned elsewhere; the stack only
//! looks them up by stable identifier. A lookup that does not resolve is
//! a misconfigured environment and aborts plan generation outright.

use tracing::debug;

use fhirplan_core::EnvConfig;

use crate::error::{StackError, StackResult};

/// Reference to the resolved virtual network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcRef {
    pub id: String,
    /// Address range used for internal-only ingress rules.
    pub cidr: String,
}

/// Reference to the resolved private DNS zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRef {
    pub id: String,
    pub domain: String,
}

/// The resolved network environment the stack deploys into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRefs {
    pub vpc: VpcRef,
    pub zone: ZoneRef,
}

/// Resolve the VPC and private zone named in the configuration.
pub fn resolve(config: &EnvConfig) -> StackResult<NetworkRefs> {
    let net = &config.network;

    if !net.vpc_id.starts_with("vpc-") {
        return Err(StackError::Lookup {
            resource: "vpc",
            value: net.vpc_id.clone(),
            reason: "identifier does not name an existing network",
        });
    }
    if !net.zone_id.starts_with('Z') {
        return Err(StackError::Lookup {
            resource: "dns zone",
            value: net.zone_id.clone(),
            reason: "identifier does not name an existing private zone",
        });
    }
    if net.vpc_cidr.split_once('/').is_none() {
        return Err(StackError::Lookup {
            resource: "vpc",
            value: net.vpc_cidr.clone(),
            reason: "network has no usable address range",
        });
    }

    debug!(vpc = %net.vpc_id, zone = %net.zone_id, "network environment resolved");
    Ok(NetworkRefs {
        vpc: VpcRef {
            id: net.vpc_id.clone(),
            cidr: net.vpc_cidr.clone(),
        },
        zone: ZoneRef {
            id: net.zone_id.clone(),
            domain: net.zone_domain.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::tests::test_config;

    #[test]
    fn resolves_valid_identifiers() {
        let config = test_config();
        let refs = resolve(&config).unwrap();
        assert_eq!(refs.vpc.id, "vpc-0a1b2c3d4e5f");
        assert_eq!(refs.vpc.cidr, "10.0.0.0/16");
        assert_eq!(refs.zone.domain, "internal.example.com");
    }

    #[test]
    fn unresolvable_vpc_is_a_hard_error() {
        let mut config = test_config();
        config.network.vpc_id = "igw-12345678".to_string();
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, StackError::Lookup { resource: "vpc", .. }));
    }

    #[test]
    fn unresolvable_zone_is_a_hard_error() {
        let mut config = test_config();
        config.network.zone_id = "not-a-zone".to_string();
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, StackError::Lookup { resource: "dns zone", .. }));
    }
}
