//! Typed resource declarations.
//!
//! Each variant of [`ResourceSpec`] is one resource kind the stack can
//! declare. Specs are plain serializable data; wiring between resources
//! happens through logical-id references and `${id.attr}` attribute
//! tokens, never through embedded values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical identifier of a resource within a plan.
pub type ResourceId = String;

/// Build an attribute token for a value the provider only knows after the
/// referenced resource exists (e.g. a cluster endpoint hostname).
pub fn attr(id: &str, attribute: &str) -> String {
    format!("${{{id}.{attribute}}}")
}

/// A declared resource: logical id, typed spec, and explicit ordering
/// dependencies on other resources in the same plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub spec: ResourceSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSpec {
    Secret(SecretSpec),
    DatabaseCluster(DatabaseClusterSpec),
    MetricAlarm(AlarmSpec),
    ContainerCluster(ContainerClusterSpec),
    TaskService(TaskServiceSpec),
    LoadBalancer(LoadBalancerSpec),
    TargetGroup(TargetGroupSpec),
    ScalingPolicy(ScalingPolicySpec),
    IngressRule(IngressRuleSpec),
    SecretGrant(SecretGrantSpec),
    DnsRecord(DnsRecordSpec),
}

impl ResourceSpec {
    /// Short kind label for logs and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceSpec::Secret(_) => "secret",
            ResourceSpec::DatabaseCluster(_) => "database_cluster",
            ResourceSpec::MetricAlarm(_) => "metric_alarm",
            ResourceSpec::ContainerCluster(_) => "container_cluster",
            ResourceSpec::TaskService(_) => "task_service",
            ResourceSpec::LoadBalancer(_) => "load_balancer",
            ResourceSpec::TargetGroup(_) => "target_group",
            ResourceSpec::ScalingPolicy(_) => "scaling_policy",
            ResourceSpec::IngressRule(_) => "ingress_rule",
            ResourceSpec::SecretGrant(_) => "secret_grant",
            ResourceSpec::DnsRecord(_) => "dns_record",
        }
    }

    pub fn as_alarm(&self) -> Option<&AlarmSpec> {
        match self {
            ResourceSpec::MetricAlarm(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_alarm_mut(&mut self) -> Option<&mut AlarmSpec> {
        match self {
            ResourceSpec::MetricAlarm(a) => Some(a),
            _ => None,
        }
    }
}

// ── Secrets ───────────────────────────────────────────────────────

/// A generated credential owned by the secret store. The plan carries the
/// generation policy only; no plaintext value ever appears in the plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretSpec {
    pub name: String,
    pub exclude_punctuation: bool,
    pub include_space: bool,
}

/// Indirect reference to a secret, consumable without exposing the value.
pub fn secret_ref(secret_id: &str) -> String {
    attr(secret_id, "value")
}

// ── Database ──────────────────────────────────────────────────────

/// Serverless-scaling relational cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseClusterSpec {
    /// Fixed cluster identifier: at most one such cluster can exist per
    /// account/region pair.
    pub cluster_identifier: String,
    pub engine: String,
    pub engine_version: String,
    pub default_database: String,
    pub master_username: String,
    /// Logical id of the password secret.
    pub password_secret: ResourceId,
    pub storage_encrypted: bool,
    /// Serverless scaling bounds, provider scaling units.
    pub min_capacity: u32,
    pub max_capacity: u32,
}

// ── Alarms ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    GreaterThanOrEqualToThreshold,
    LessThanOrEqualToThreshold,
}

/// How the alarm treats evaluation periods with no metric data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Provider default: gaps count toward the alarm state.
    #[default]
    Missing,
    /// Gaps never trip the alarm.
    NotBreaching,
}

/// A metric threshold alarm. Actions stay empty unless a notification
/// sink is attached; an action-less alarm is state-only by design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmSpec {
    pub metric: String,
    pub namespace: String,
    /// Metric dimensions, e.g. cluster or service identifier.
    pub dimensions: BTreeMap<String, String>,
    pub comparison: ComparisonOperator,
    pub threshold: f64,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: u32,
    pub treat_missing_data: MissingDataPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarm_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ok_actions: Vec<String>,
}

impl AlarmSpec {
    /// Single-period threshold alarm with no actions attached.
    pub fn new(
        metric: &str,
        namespace: &str,
        comparison: ComparisonOperator,
        threshold: f64,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            namespace: namespace.to_string(),
            dimensions: BTreeMap::new(),
            comparison,
            threshold,
            evaluation_periods: 1,
            datapoints_to_alarm: 1,
            treat_missing_data: MissingDataPolicy::default(),
            alarm_actions: Vec::new(),
            ok_actions: Vec::new(),
        }
    }

    pub fn with_dimension(mut self, key: &str, value: &str) -> Self {
        self.dimensions.insert(key.to_string(), value.to_string());
        self
    }

    /// Require `datapoints` breaching datapoints out of `periods`.
    pub fn with_evaluation(mut self, datapoints: u32, periods: u32) -> Self {
        self.datapoints_to_alarm = datapoints;
        self.evaluation_periods = periods;
        self
    }

    pub fn with_missing_data(mut self, policy: MissingDataPolicy) -> Self {
        self.treat_missing_data = policy;
        self
    }
}

// ── Compute ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerClusterSpec {
    pub name: String,
    pub container_insights: bool,
}

/// Load-balanced container service definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskServiceSpec {
    /// Logical id of the container cluster.
    pub cluster: ResourceId,
    pub container_name: String,
    pub image: String,
    pub container_port: u16,
    pub cpu_units: u32,
    pub memory_mib: u32,
    pub desired_count: u32,
    /// Plain environment variables. Deterministic ordering for stable
    /// plan diffs.
    pub environment: BTreeMap<String, String>,
    /// Env var name → secret reference. Values are injected by the
    /// provider at task start, never written into the plan.
    pub secret_bindings: BTreeMap<String, String>,
    pub health_check_grace_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadBalancerSpec {
    /// Internal-only: never publicly reachable.
    pub internal: bool,
    pub vpc_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetGroupSpec {
    pub port: u16,
    /// Short delay so task replacement during rollouts is quick.
    pub deregistration_delay_secs: u32,
    pub health_check_interval_secs: u32,
    /// Consecutive successful checks before a target counts as healthy.
    pub healthy_threshold_count: u32,
}

/// Target-tracking autoscaling on a utilization metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingPolicySpec {
    pub service: ResourceId,
    pub metric: ScalingMetric,
    pub target_utilization_percent: u32,
    /// Slow scale-in to avoid thrashing.
    pub scale_in_cooldown_secs: u32,
    /// Fast scale-out to react to load.
    pub scale_out_cooldown_secs: u32,
    pub min_capacity: u32,
    pub max_capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMetric {
    Cpu,
    Memory,
}

impl ScalingMetric {
    pub fn metric_name(self) -> &'static str {
        match self {
            ScalingMetric::Cpu => "CPUUtilization",
            ScalingMetric::Memory => "MemoryUtilization",
        }
    }
}

// ── Networking ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrafficSource {
    /// An address range, e.g. the VPC CIDR block.
    Cidr { cidr: String },
    /// Another resource in the plan (its security identity).
    Resource { id: ResourceId },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "range", rename_all = "snake_case")]
pub enum PortRange {
    Single { port: u16 },
    All,
}

/// Network access opened from a source to a target resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngressRuleSpec {
    pub target: ResourceId,
    pub source: TrafficSource,
    pub port: PortRange,
    pub description: String,
}

// ── Permissions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantAccess {
    Read,
}

/// Access grant from a secret to a consuming identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretGrantSpec {
    pub secret: ResourceId,
    pub grantee: ResourceId,
    pub access: GrantAccess,
}

// ── DNS ───────────────────────────────────────────────────────────

/// Alias record in a private zone pointing at another resource's
/// canonical endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DnsRecordSpec {
    pub zone_id: String,
    pub record_name: String,
    pub alias_target: ResourceId,
}
