//! Errors raised while loading or validating configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to parse, or a value has the wrong type.
    #[error("failed to load clinic configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A section needed by the current command has no credentials.
    #[error("'{section}' is not configured")]
    NotConfigured { section: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
