//! fhirplan-graph — declarative resource graph and plan synthesis.
//!
//! A [`PlanGraph`] accumulates typed resource declarations and explicit
//! dependency edges, evaluated once into an immutable [`DeploymentPlan`]
//! artifact. Nothing here talks to a cloud provider: the plan is a
//! versioned JSON document; a separate apply stage (outside this
//! repository) diffs and executes it, honoring the declared ordering.
//!
//! Late-bound provider attributes (e.g. the database endpoint hostname,
//! known only after the cluster exists) are carried as `${id.attr}` tokens
//! produced by [`attr`].

pub mod error;
pub mod graph;
pub mod plan;
pub mod resource;

pub use error::{GraphError, GraphResult};
pub use graph::PlanGraph;
pub use plan::{DeploymentPlan, Output};
pub use resource::*;
