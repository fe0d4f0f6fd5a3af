//! Compute provisioner — load-balanced, autoscaled container service.
//!
//! Consumes the database references: the connection URL and username go
//! in as plain environment variables, the password only as a
//! secret-reference binding. The service is reachable solely from inside
//! the resolved network, through an internal load balancer.

use std::collections::BTreeMap;

use tracing::debug;

use fhirplan_core::units::{minutes, secs};
use fhirplan_core::{CapacityProfile, EnvConfig};
use fhirplan_graph::{
    AlarmSpec, ComparisonOperator, ContainerClusterSpec, GrantAccess, IngressRuleSpec,
    LoadBalancerSpec, MissingDataPolicy, PlanGraph, PortRange, ResourceId, ResourceSpec,
    ScalingMetric, ScalingPolicySpec, SecretGrantSpec, TargetGroupSpec, TaskServiceSpec,
    TrafficSource, secret_ref,
};

use crate::database::{DB_PORT, DatabaseResources};
use crate::error::{StackError, StackResult};
use crate::network::NetworkRefs;

pub const CLUSTER_ID: &str = "fhir-cluster";
pub const SERVICE_ID: &str = "fhir-service";
pub const LOAD_BALANCER_ID: &str = "fhir-load-balancer";
pub const TARGET_GROUP_ID: &str = "fhir-target-group";
const GRANT_ID: &str = "db-password-grant";

const CONTAINER_NAME: &str = "fhir-server";
const CONTAINER_PORT: u16 = 8080;
const HEALTH_CHECK_GRACE_SECS: u32 = 60;

// Short deregistration delay and fast health checks shorten rollout
// windows when tasks are swapped.
const DEREGISTRATION_DELAY_SECS: u32 = 17;
const HEALTH_CHECK_INTERVAL_SECS: u32 = 10;
const HEALTHY_THRESHOLD_COUNT: u32 = 2;

const SCALING_TARGET_PERCENT: u32 = 90;
const CPU_ALARM_THRESHOLD: f64 = 80.0;
const MEMORY_ALARM_THRESHOLD: f64 = 70.0;

const METRIC_NAMESPACE: &str = "ecs";

/// References to the declared compute resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeResources {
    pub service_id: ResourceId,
    pub load_balancer_id: ResourceId,
}

/// Declare the container cluster, service, load balancer, permissions,
/// network rules, autoscaling, and compute-side alarms.
pub fn provision(
    graph: &mut PlanGraph,
    config: &EnvConfig,
    capacity: &CapacityProfile,
    network: &NetworkRefs,
    db: &DatabaseResources,
) -> StackResult<ComputeResources> {
    // The service cannot be declared before the database cluster: the
    // connection string needs a resolvable endpoint.
    if !db.endpoint.is_usable() {
        return Err(StackError::MissingDbEndpoint);
    }

    graph.add(
        CLUSTER_ID,
        ResourceSpec::ContainerCluster(ContainerClusterSpec {
            name: "fhir-server-cluster".to_string(),
            container_insights: capacity.container_insights,
        }),
    )?;

    graph.add(
        LOAD_BALANCER_ID,
        ResourceSpec::LoadBalancer(LoadBalancerSpec {
            internal: true,
            vpc_id: network.vpc.id.clone(),
        }),
    )?;

    graph.add_with_deps(
        TARGET_GROUP_ID,
        ResourceSpec::TargetGroup(TargetGroupSpec {
            port: CONTAINER_PORT,
            deregistration_delay_secs: DEREGISTRATION_DELAY_SECS,
            health_check_interval_secs: HEALTH_CHECK_INTERVAL_SECS,
            healthy_threshold_count: HEALTHY_THRESHOLD_COUNT,
        }),
        &[LOAD_BALANCER_ID],
    )?;

    // The read grant must exist before the service starts: the task
    // identity pulls the password from the secret store at boot.
    graph.add_with_deps(
        GRANT_ID,
        ResourceSpec::SecretGrant(SecretGrantSpec {
            secret: db.secret_id.clone(),
            grantee: SERVICE_ID.to_string(),
            access: GrantAccess::Read,
        }),
        &[db.secret_id.as_str()],
    )?;

    let db_url = format!(
        "jdbc:postgresql://{}:{}/{}",
        db.endpoint.hostname, db.endpoint.port, config.database.name
    );

    let mut environment = BTreeMap::new();
    environment.insert(
        "SPRING_PROFILES_ACTIVE".to_string(),
        config.environment.tier.as_str().to_string(),
    );
    environment.insert("DB_URL".to_string(), db_url);
    environment.insert("DB_USERNAME".to_string(), db.username.clone());

    let mut secret_bindings = BTreeMap::new();
    secret_bindings.insert("DB_PASSWORD".to_string(), secret_ref(&db.secret_id));

    graph.add_with_deps(
        SERVICE_ID,
        ResourceSpec::TaskService(TaskServiceSpec {
            cluster: CLUSTER_ID.to_string(),
            container_name: CONTAINER_NAME.to_string(),
            image: config.image.reference(),
            container_port: CONTAINER_PORT,
            cpu_units: capacity.task_size.cpu_units,
            memory_mib: capacity.task_size.memory_mib,
            desired_count: capacity.task_counts.desired,
            environment,
            secret_bindings,
            health_check_grace_secs: HEALTH_CHECK_GRACE_SECS,
        }),
        &[CLUSTER_ID, TARGET_GROUP_ID, GRANT_ID, db.cluster_id.as_str()],
    )?;

    add_network_rules(graph, network, db)?;
    add_autoscaling(graph, capacity)?;
    add_utilization_alarms(graph, capacity)?;

    debug!(
        service = SERVICE_ID,
        cpu = capacity.task_size.cpu_units,
        memory_mib = capacity.task_size.memory_mib,
        desired = capacity.task_counts.desired,
        "compute service declared"
    );

    Ok(ComputeResources {
        service_id: SERVICE_ID.to_string(),
        load_balancer_id: LOAD_BALANCER_ID.to_string(),
    })
}

/// Database port opened from the service; all traffic to the service from
/// the network's address range. Internal-only exposure model: the CIDR
/// rule is broad on purpose and is not a boundary against internal
/// threats.
fn add_network_rules(
    graph: &mut PlanGraph,
    network: &NetworkRefs,
    db: &DatabaseResources,
) -> StackResult<()> {
    graph.add_with_deps(
        "db-ingress-from-service",
        ResourceSpec::IngressRule(IngressRuleSpec {
            target: db.cluster_id.clone(),
            source: TrafficSource::Resource { id: SERVICE_ID.to_string() },
            port: PortRange::Single { port: DB_PORT },
            description: "database default port from the FHIR service".to_string(),
        }),
        &[db.cluster_id.as_str(), SERVICE_ID],
    )?;

    graph.add_with_deps(
        "service-ingress-from-vpc",
        ResourceSpec::IngressRule(IngressRuleSpec {
            target: SERVICE_ID.to_string(),
            source: TrafficSource::Cidr { cidr: network.vpc.cidr.clone() },
            port: PortRange::All,
            description: "traffic from within the VPC to the service".to_string(),
        }),
        &[SERVICE_ID],
    )?;
    Ok(())
}

/// CPU and memory target tracking at 90 %, with asymmetric cooldowns:
/// slow scale-in, fast scale-out. Each policy declares its breach alarm
/// so alarm routing covers scaling events too.
fn add_autoscaling(graph: &mut PlanGraph, capacity: &CapacityProfile) -> StackResult<()> {
    let missing = missing_data_policy(capacity);
    for (policy_id, alarm_id, metric) in [
        ("autoscale-cpu", "autoscale-cpu-alarm", ScalingMetric::Cpu),
        ("autoscale-memory", "autoscale-memory-alarm", ScalingMetric::Memory),
    ] {
        graph.add_with_deps(
            policy_id,
            ResourceSpec::ScalingPolicy(ScalingPolicySpec {
                service: SERVICE_ID.to_string(),
                metric,
                target_utilization_percent: SCALING_TARGET_PERCENT,
                scale_in_cooldown_secs: minutes(2),
                scale_out_cooldown_secs: secs(30),
                min_capacity: capacity.task_counts.min,
                max_capacity: capacity.task_counts.max,
            }),
            &[SERVICE_ID],
        )?;
        graph.add_with_deps(
            alarm_id,
            ResourceSpec::MetricAlarm(
                AlarmSpec::new(
                    metric.metric_name(),
                    METRIC_NAMESPACE,
                    ComparisonOperator::GreaterThanOrEqualToThreshold,
                    SCALING_TARGET_PERCENT as f64,
                )
                .with_dimension("ServiceName", SERVICE_ID)
                .with_evaluation(3, 3)
                .with_missing_data(missing),
            ),
            &[policy_id],
        )?;
    }
    Ok(())
}

/// Service utilization alarms: CPU >= 80 %, memory >= 70 %, each needing
/// 2 of 3 breaching datapoints.
fn add_utilization_alarms(graph: &mut PlanGraph, capacity: &CapacityProfile) -> StackResult<()> {
    let missing = missing_data_policy(capacity);
    for (id, metric, threshold) in [
        ("service-cpu-alarm", "CPUUtilization", CPU_ALARM_THRESHOLD),
        ("service-memory-alarm", "MemoryUtilization", MEMORY_ALARM_THRESHOLD),
    ] {
        graph.add_with_deps(
            id,
            ResourceSpec::MetricAlarm(
                AlarmSpec::new(
                    metric,
                    METRIC_NAMESPACE,
                    ComparisonOperator::GreaterThanOrEqualToThreshold,
                    threshold,
                )
                .with_dimension("ServiceName", SERVICE_ID)
                .with_evaluation(2, 3)
                .with_missing_data(missing),
            ),
            &[SERVICE_ID],
        )?;
    }
    Ok(())
}

fn missing_data_policy(capacity: &CapacityProfile) -> MissingDataPolicy {
    if capacity.alarm_missing_data_tolerant {
        MissingDataPolicy::NotBreaching
    } else {
        MissingDataPolicy::Missing
    }
}
