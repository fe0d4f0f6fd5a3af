//! Database provisioner — serverless PostgreSQL-compatible cluster.
//!
//! Declares the generated password secret, the cluster itself, and the
//! five performance alarms. Returns typed references so the compute
//! provisioner can wire the connection string and the secret grant.

use tracing::debug;

use fhirplan_core::units::mb_to_bytes;
use fhirplan_core::{CapacityProfile, EnvConfig};
use fhirplan_graph::{
    AlarmSpec, ComparisonOperator, DatabaseClusterSpec, MissingDataPolicy, PlanGraph,
    ResourceId, ResourceSpec, SecretSpec, attr,
};

use crate::error::StackResult;

/// Fixed cluster identifier: at most one FHIR database cluster can exist
/// per account/region pair.
pub const DB_CLUSTER_IDENTIFIER: &str = "fhir-server";

/// Engine default port, opened to the service by the compute provisioner.
pub const DB_PORT: u16 = 5432;

const DB_ENGINE: &str = "aurora-postgresql";
const DB_ENGINE_VERSION: &str = "14.4";

pub const DB_CLUSTER_ID: &str = "fhir-database";
pub const DB_SECRET_ID: &str = "db-password";

const METRIC_NAMESPACE: &str = "rds";

/// The cluster endpoint as known at plan time: the hostname is a
/// late-bound attribute token, the port is the engine default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub hostname: String,
    pub port: u16,
}

impl ClusterEndpoint {
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// An endpoint with no hostname cannot be wired into a connection
    /// string.
    pub fn is_usable(&self) -> bool {
        !self.hostname.is_empty() && self.port != 0
    }
}

/// Typed references handed to downstream provisioners. The password is
/// referenced through the secret store only; no plaintext leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseResources {
    pub cluster_id: ResourceId,
    pub secret_id: ResourceId,
    pub username: String,
    pub endpoint: ClusterEndpoint,
}

/// Declare the database cluster, its credential secret, and its alarms.
pub fn provision(
    graph: &mut PlanGraph,
    config: &EnvConfig,
    capacity: &CapacityProfile,
) -> StackResult<DatabaseResources> {
    graph.add(
        DB_SECRET_ID,
        ResourceSpec::Secret(SecretSpec {
            name: "fhir-server-db-password".to_string(),
            exclude_punctuation: true,
            include_space: false,
        }),
    )?;

    graph.add_with_deps(
        DB_CLUSTER_ID,
        ResourceSpec::DatabaseCluster(DatabaseClusterSpec {
            cluster_identifier: DB_CLUSTER_IDENTIFIER.to_string(),
            engine: DB_ENGINE.to_string(),
            engine_version: DB_ENGINE_VERSION.to_string(),
            default_database: config.database.name.clone(),
            master_username: config.database.username.clone(),
            password_secret: DB_SECRET_ID.to_string(),
            storage_encrypted: true,
            min_capacity: capacity.db.min,
            max_capacity: capacity.db.max,
        }),
        &[DB_SECRET_ID],
    )?;

    add_performance_alarms(graph, capacity)?;

    debug!(
        cluster = DB_CLUSTER_IDENTIFIER,
        min = capacity.db.min,
        max = capacity.db.max,
        "database cluster declared"
    );

    Ok(DatabaseResources {
        cluster_id: DB_CLUSTER_ID.to_string(),
        secret_id: DB_SECRET_ID.to_string(),
        username: config.database.username.clone(),
        endpoint: ClusterEndpoint {
            hostname: attr(DB_CLUSTER_ID, "endpoint"),
            port: DB_PORT,
        },
    })
}

/// Five single-period alarms on the cluster's performance metrics.
fn add_performance_alarms(graph: &mut PlanGraph, capacity: &CapacityProfile) -> StackResult<()> {
    let missing = if capacity.alarm_missing_data_tolerant {
        MissingDataPolicy::NotBreaching
    } else {
        MissingDataPolicy::Missing
    };

    let alarms = [
        (
            "db-freeable-memory-alarm",
            "FreeableMemory",
            ComparisonOperator::LessThanOrEqualToThreshold,
            mb_to_bytes(150) as f64,
        ),
        (
            "db-free-storage-alarm",
            "FreeLocalStorage",
            ComparisonOperator::LessThanOrEqualToThreshold,
            mb_to_bytes(250) as f64,
        ),
        (
            "db-cpu-alarm",
            "CPUUtilization",
            ComparisonOperator::GreaterThanOrEqualToThreshold,
            90.0,
        ),
        (
            "db-read-iops-alarm",
            "VolumeReadIOPs",
            ComparisonOperator::GreaterThanOrEqualToThreshold,
            20_000.0,
        ),
        (
            "db-write-iops-alarm",
            "VolumeWriteIOPs",
            ComparisonOperator::GreaterThanOrEqualToThreshold,
            5_000.0,
        ),
    ];

    for (id, metric, comparison, threshold) in alarms {
        graph.add_with_deps(
            id,
            ResourceSpec::MetricAlarm(
                AlarmSpec::new(metric, METRIC_NAMESPACE, comparison, threshold)
                    .with_dimension("DBClusterIdentifier", DB_CLUSTER_IDENTIFIER)
                    .with_missing_data(missing),
            ),
            &[DB_CLUSTER_ID],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::tests::test_config;

    fn provisioned() -> (PlanGraph, DatabaseResources) {
        let config = test_config();
        let capacity = config.capacity().unwrap();
        let mut graph = PlanGraph::new("test");
        let db = provision(&mut graph, &config, &capacity).unwrap();
        (graph, db)
    }

    #[test]
    fn declares_secret_cluster_and_five_alarms() {
        let (graph, _) = provisioned();
        // 1 secret + 1 cluster + 5 alarms
        assert_eq!(graph.resource_count(), 7);
    }

    #[test]
    fn cluster_is_encrypted_and_pinned() {
        let (graph, _) = provisioned();
        let resource = graph.get(DB_CLUSTER_ID).unwrap();
        let ResourceSpec::DatabaseCluster(spec) = &resource.spec else {
            panic!("expected database cluster");
        };
        assert!(spec.storage_encrypted);
        assert_eq!(spec.engine, "aurora-postgresql");
        assert_eq!(spec.engine_version, "14.4");
        assert_eq!(spec.cluster_identifier, "fhir-server");
        assert!(resource.depends_on.contains(&DB_SECRET_ID.to_string()));
    }

    #[test]
    fn secret_generation_policy_excludes_punctuation_and_spaces() {
        let (graph, _) = provisioned();
        let ResourceSpec::Secret(spec) = &graph.get(DB_SECRET_ID).unwrap().spec else {
            panic!("expected secret");
        };
        assert!(spec.exclude_punctuation);
        assert!(!spec.include_space);
    }

    #[test]
    fn alarm_thresholds_match_contract() {
        let (graph, _) = provisioned();
        let memory = graph.get("db-freeable-memory-alarm").unwrap();
        let ResourceSpec::MetricAlarm(a) = &memory.spec else {
            panic!("expected alarm");
        };
        assert_eq!(a.threshold, 157_286_400.0); // 150 MB
        assert_eq!(a.comparison, ComparisonOperator::LessThanOrEqualToThreshold);
        assert_eq!(a.evaluation_periods, 1);

        let ResourceSpec::MetricAlarm(a) = &graph.get("db-write-iops-alarm").unwrap().spec
        else {
            panic!("expected alarm");
        };
        assert_eq!(a.threshold, 5_000.0);
    }

    #[test]
    fn v2_alarms_tolerate_missing_data() {
        let (graph, _) = provisioned(); // test_config is profile v2
        let ResourceSpec::MetricAlarm(a) = &graph.get("db-cpu-alarm").unwrap().spec else {
            panic!("expected alarm");
        };
        assert_eq!(a.treat_missing_data, MissingDataPolicy::NotBreaching);
    }

    #[test]
    fn endpoint_is_late_bound_token() {
        let (_, db) = provisioned();
        assert_eq!(db.endpoint.hostname, "${fhir-database.endpoint}");
        assert_eq!(db.endpoint.port, 5432);
        assert_eq!(
            db.endpoint.socket_address(),
            "${fhir-database.endpoint}:5432"
        );
        assert!(db.endpoint.is_usable());
    }
}
