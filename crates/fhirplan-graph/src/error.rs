//! Resource graph error types.

use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while building or synthesizing a plan graph.
///
/// All of these are plan-generation-time hard errors: they indicate a bug
/// in the stack definition, not a transient condition.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate resource id: {0}")]
    DuplicateResource(String),

    #[error("resource {resource} depends on unknown resource {dependency}")]
    UnknownDependency { resource: String, dependency: String },

    #[error("dependency cycle involving resource: {0}")]
    DependencyCycle(String),

    #[error("unknown resource id: {0}")]
    UnknownResource(String),

    #[error("plan serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
