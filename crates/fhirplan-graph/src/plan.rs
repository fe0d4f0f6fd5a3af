//! The deployment plan artifact.
//!
//! A plan is the versioned, immutable output of one synthesis pass:
//! resources in provider-creation order plus named outputs. The apply
//! stage that consumes it lives outside this repository.

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::resource::{AlarmSpec, Resource};

/// Bumped when the plan schema changes shape.
pub const PLAN_FORMAT_VERSION: u32 = 1;

/// A named plan-generation-time value surfaced to operators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Output {
    pub name: String,
    pub description: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentPlan {
    pub format_version: u32,
    pub stack_name: String,
    /// Topologically ordered: every resource appears after its
    /// dependencies.
    pub resources: Vec<Resource>,
    pub outputs: Vec<Output>,
}

impl DeploymentPlan {
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// All alarms in the plan, with their logical ids.
    pub fn alarms(&self) -> Vec<(&str, &AlarmSpec)> {
        self.resources
            .iter()
            .filter_map(|r| r.spec.as_alarm().map(|a| (r.id.as_str(), a)))
            .collect()
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.name == name)
    }

    pub fn to_json_pretty(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PlanGraph;
    use crate::resource::{AlarmSpec, ComparisonOperator, ResourceSpec};

    fn plan_with_alarm() -> DeploymentPlan {
        let mut graph = PlanGraph::new("test");
        graph
            .add(
                "cpu-alarm",
                ResourceSpec::MetricAlarm(AlarmSpec::new(
                    "CPUUtilization",
                    "ecs",
                    ComparisonOperator::GreaterThanOrEqualToThreshold,
                    80.0,
                )),
            )
            .unwrap();
        graph.add_output("alarm-id", "", "cpu-alarm".to_string());
        graph.synth().unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let plan = plan_with_alarm();
        let json = plan.to_json_pretty().unwrap();
        let back: DeploymentPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
        assert_eq!(back.format_version, PLAN_FORMAT_VERSION);
    }

    #[test]
    fn alarm_listing() {
        let plan = plan_with_alarm();
        let alarms = plan.alarms();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].0, "cpu-alarm");
        assert_eq!(alarms[0].1.threshold, 80.0);
    }

    #[test]
    fn output_lookup() {
        let plan = plan_with_alarm();
        assert_eq!(plan.output("alarm-id").unwrap().value, "cpu-alarm");
        assert!(plan.output("missing").is_none());
    }
}
