//! The FHIR server stack — linear composition of all provisioners.

use tracing::info;

use fhirplan_core::EnvConfig;
use fhirplan_graph::{DeploymentPlan, PlanGraph, attr};

use crate::error::StackResult;
use crate::{compute, database, dns, network, notify};

pub struct FhirServerStack;

impl FhirServerStack {
    /// Synthesize the deployment plan for one environment.
    ///
    /// Single synchronous pass: network lookup → database → compute →
    /// DNS → notification routing → outputs. Any failure aborts plan
    /// generation; nothing is retried.
    pub fn synthesize(config: &EnvConfig) -> StackResult<DeploymentPlan> {
        config.validate()?;
        let capacity = config.capacity()?;
        let network = network::resolve(config)?;

        let mut graph =
            PlanGraph::new(&format!("fhir-server-{}", config.environment.name));

        let db = database::provision(&mut graph, config, &capacity)?;
        let service = compute::provision(&mut graph, config, &capacity, &network, &db)?;
        let record = dns::bind(&mut graph, config, &network.zone, &service.load_balancer_id)?;
        let routed = notify::wire(&mut graph, config);

        graph.add_output(
            "service-id",
            "Container service identifier",
            attr(&service.service_id, "arn"),
        );
        graph.add_output(
            "db-cluster-id",
            "Database cluster identifier",
            database::DB_CLUSTER_IDENTIFIER.to_string(),
        );
        graph.add_output(
            "db-endpoint",
            "Database endpoint: hostname, port, socket address",
            format!(
                "{} {} {}",
                db.endpoint.hostname,
                db.endpoint.port,
                db.endpoint.socket_address()
            ),
        );

        let plan = graph.synth()?;
        info!(
            stack = %plan.stack_name,
            tier = config.environment.tier.as_str(),
            resources = plan.resource_count(),
            alarms = plan.alarms().len(),
            routed,
            dns = %record,
            "deployment plan synthesized"
        );
        Ok(plan)
    }
}
