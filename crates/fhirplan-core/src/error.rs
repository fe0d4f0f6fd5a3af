//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating an environment configuration.
///
/// All of these are operator errors: plan generation aborts immediately,
/// there is no retry path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] Box<toml::de::Error>),

    #[error("invalid {field}: {value:?} ({reason})")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("capacity bounds violated: {0}")]
    CapacityBounds(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        ConfigError::InvalidField {
            field,
            value: value.to_string(),
            reason,
        }
    }
}
