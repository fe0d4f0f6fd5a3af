//! Stack definition error types.

use thiserror::Error;

/// Result type alias for stack operations.
pub type StackResult<T> = Result<T, StackError>;

/// Errors raised while synthesizing the stack. Every variant is a
/// plan-generation-time hard error with no retry path.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("configuration error: {0}")]
    Config(#[from] fhirplan_core::ConfigError),

    #[error("resource graph error: {0}")]
    Graph(#[from] fhirplan_graph::GraphError),

    #[error("{resource} lookup failed for {value:?}: {reason}")]
    Lookup {
        resource: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("database cluster endpoint is absent; the compute service cannot be declared before the database cluster")]
    MissingDbEndpoint,
}
