//! fhirplan-core — environment configuration and sizing profiles.
//!
//! The stack is parameterized by a single immutable [`EnvConfig`] record
//! parsed from `fhirplan.toml`. Capacity numbers (database scaling units,
//! task CPU/memory, task counts) come from a two-tier table keyed by
//! deployment tier and profile revision, with optional per-environment
//! overrides.

pub mod config;
pub mod error;
pub mod profile;
pub mod units;

pub use config::{EnvConfig, ImageSource};
pub use error::{ConfigError, ConfigResult};
pub use profile::{CapacityProfile, ProfileRevision, Tier};
