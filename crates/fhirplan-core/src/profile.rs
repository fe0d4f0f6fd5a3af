//! Deployment tiers and capacity profiles.
//!
//! Two profile revisions exist side by side: the capacity numbers and the
//! alarm missing-data policy changed between stack revisions, and both are
//! kept as selectable configuration rather than reconciled into one table.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Deployment tier. Production gets larger capacity bounds everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Production,
    Staging,
}

impl Tier {
    pub fn is_production(self) -> bool {
        matches!(self, Tier::Production)
    }

    /// Value injected as the active-profile flag for the server container.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Production => "production",
            Tier::Staging => "staging",
        }
    }
}

/// Capacity/alarm profile revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRevision {
    /// Initial sizing: tight database bounds, alarms use the provider's
    /// default missing-data handling.
    V1,
    /// Revised sizing: wider database bounds, container insights enabled,
    /// alarms tolerate missing data.
    #[default]
    V2,
}

/// Serverless database scaling bounds, in provider scaling units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCapacity {
    pub min: u32,
    pub max: u32,
}

/// Per-task CPU and memory allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSize {
    /// CPU units (1024 = one vCPU-equivalent).
    pub cpu_units: u32,
    /// Memory limit in MiB.
    pub memory_mib: u32,
}

/// Desired/min/max task counts for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub min: u32,
    pub desired: u32,
    pub max: u32,
}

/// Optional per-environment capacity overrides from `[capacity]` in
/// `fhirplan.toml`. Absent fields fall back to the profile table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityOverrides {
    pub db_min: Option<u32>,
    pub db_max: Option<u32>,
    pub task_min: Option<u32>,
    pub task_desired: Option<u32>,
    pub task_max: Option<u32>,
}

/// Fully resolved sizing for one (revision, tier) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityProfile {
    pub db: DbCapacity,
    pub task_size: TaskSize,
    pub task_counts: TaskCounts,
    /// Enable provider-side container observability on the cluster.
    pub container_insights: bool,
    /// Alarms do not fire on metric data gaps.
    pub alarm_missing_data_tolerant: bool,
}

impl CapacityProfile {
    /// Look up the sizing table for a revision and tier.
    pub fn resolve(revision: ProfileRevision, tier: Tier) -> Self {
        let prod = tier.is_production();
        let db = match revision {
            ProfileRevision::V1 => {
                if prod {
                    DbCapacity { min: 2, max: 8 }
                } else {
                    DbCapacity { min: 1, max: 2 }
                }
            }
            ProfileRevision::V2 => {
                if prod {
                    DbCapacity { min: 4, max: 32 }
                } else {
                    DbCapacity { min: 1, max: 8 }
                }
            }
        };
        Self {
            db,
            task_size: if prod {
                TaskSize { cpu_units: 2048, memory_mib: 4096 }
            } else {
                TaskSize { cpu_units: 1024, memory_mib: 2048 }
            },
            task_counts: if prod {
                TaskCounts { min: 2, desired: 2, max: 10 }
            } else {
                TaskCounts { min: 1, desired: 1, max: 2 }
            },
            container_insights: revision == ProfileRevision::V2,
            alarm_missing_data_tolerant: revision == ProfileRevision::V2,
        }
    }

    /// Apply `[capacity]` overrides on top of the table values.
    pub fn with_overrides(mut self, overrides: &CapacityOverrides) -> Self {
        if let Some(v) = overrides.db_min {
            self.db.min = v;
        }
        if let Some(v) = overrides.db_max {
            self.db.max = v;
        }
        if let Some(v) = overrides.task_min {
            self.task_counts.min = v;
        }
        if let Some(v) = overrides.task_desired {
            self.task_counts.desired = v;
        }
        if let Some(v) = overrides.task_max {
            self.task_counts.max = v;
        }
        self
    }

    /// Check the scaling invariants: `min <= max` for the database and
    /// `min <= desired <= max` for task counts.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.db.min == 0 || self.db.min > self.db.max {
            return Err(ConfigError::CapacityBounds(format!(
                "database scaling units min {} / max {}",
                self.db.min, self.db.max
            )));
        }
        let t = self.task_counts;
        if t.min == 0 || t.min > t.desired || t.desired > t.max {
            return Err(ConfigError::CapacityBounds(format!(
                "task counts min {} / desired {} / max {}",
                t.min, t.desired, t.max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_profiles_satisfy_bounds() {
        for revision in [ProfileRevision::V1, ProfileRevision::V2] {
            for tier in [Tier::Production, Tier::Staging] {
                let p = CapacityProfile::resolve(revision, tier);
                p.validate().unwrap();
                assert!(p.task_counts.min <= p.task_counts.desired);
                assert!(p.task_counts.desired <= p.task_counts.max);
                assert!(p.db.min <= p.db.max);
            }
        }
    }

    #[test]
    fn production_db_bounds_strictly_larger() {
        for revision in [ProfileRevision::V1, ProfileRevision::V2] {
            let prod = CapacityProfile::resolve(revision, Tier::Production);
            let staging = CapacityProfile::resolve(revision, Tier::Staging);
            assert!(prod.db.min > staging.db.min);
            assert!(prod.db.max > staging.db.max);
        }
    }

    #[test]
    fn v2_enables_insights_and_missing_data_tolerance() {
        let p = CapacityProfile::resolve(ProfileRevision::V2, Tier::Production);
        assert!(p.container_insights);
        assert!(p.alarm_missing_data_tolerant);

        let p = CapacityProfile::resolve(ProfileRevision::V1, Tier::Production);
        assert!(!p.container_insights);
        assert!(!p.alarm_missing_data_tolerant);
    }

    #[test]
    fn overrides_replace_table_values() {
        let overrides = CapacityOverrides {
            db_max: Some(16),
            task_desired: Some(3),
            ..Default::default()
        };
        let p = CapacityProfile::resolve(ProfileRevision::V2, Tier::Production)
            .with_overrides(&overrides);
        assert_eq!(p.db.max, 16);
        assert_eq!(p.task_counts.desired, 3);
        p.validate().unwrap();
    }

    #[test]
    fn inverted_bounds_rejected() {
        let overrides = CapacityOverrides {
            db_min: Some(9),
            db_max: Some(2),
            ..Default::default()
        };
        let p = CapacityProfile::resolve(ProfileRevision::V1, Tier::Staging)
            .with_overrides(&overrides);
        assert!(p.validate().is_err());
    }

    #[test]
    fn desired_outside_bounds_rejected() {
        let overrides = CapacityOverrides {
            task_desired: Some(99),
            ..Default::default()
        };
        let p = CapacityProfile::resolve(ProfileRevision::V1, Tier::Staging)
            .with_overrides(&overrides);
        assert!(p.validate().is_err());
    }
}
