//! DNS binder — internal alias record for the service endpoint.

use tracing::debug;

use fhirplan_core::EnvConfig;
use fhirplan_graph::{DnsRecordSpec, PlanGraph, ResourceSpec};

use crate::error::StackResult;
use crate::network::ZoneRef;

pub const DNS_RECORD_ID: &str = "fhir-dns-record";

/// Bind `<subdomain>.<domain>` to the load balancer's canonical endpoint
/// inside the resolved private zone.
pub fn bind(
    graph: &mut PlanGraph,
    config: &EnvConfig,
    zone: &ZoneRef,
    load_balancer_id: &str,
) -> StackResult<String> {
    let record_name = format!("{}.{}", config.dns.subdomain, config.dns.domain);
    graph.add_with_deps(
        DNS_RECORD_ID,
        ResourceSpec::DnsRecord(DnsRecordSpec {
            zone_id: zone.id.clone(),
            record_name: record_name.clone(),
            alias_target: load_balancer_id.to_string(),
        }),
        &[load_balancer_id],
    )?;
    debug!(record = %record_name, zone = %zone.id, "dns record bound");
    Ok(record_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::tests::test_config;
    use crate::{compute, database, network};

    #[test]
    fn record_joins_subdomain_and_domain() {
        let config = test_config();
        let capacity = config.capacity().unwrap();
        let refs = network::resolve(&config).unwrap();
        let mut graph = PlanGraph::new("test");
        let db = database::provision(&mut graph, &config, &capacity).unwrap();
        let service = compute::provision(&mut graph, &config, &capacity, &refs, &db).unwrap();

        let name = bind(&mut graph, &config, &refs.zone, &service.load_balancer_id).unwrap();
        assert_eq!(name, "fhir.internal.example.com");

        let resource = graph.get(DNS_RECORD_ID).unwrap();
        let ResourceSpec::DnsRecord(spec) = &resource.spec else {
            panic!("expected dns record");
        };
        assert_eq!(spec.alias_target, compute::LOAD_BALANCER_ID);
        assert_eq!(spec.zone_id, "Z0123456789ABC");
        assert!(resource.depends_on.contains(&compute::LOAD_BALANCER_ID.to_string()));
    }
}
