//! Cross-cutting error types.
//!
//! Crate-specific errors (`DatabaseError`, `AiError`, `ConfigError`) live in
//! their own crates. Everything converges into `anyhow` in `clinic-cli`.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can be raised by any clinic crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (required fields, formats, limits).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The acting user is not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Build an `InvalidTransition` from any displayable status values.
    #[must_use]
    pub fn invalid_transition(
        entity_type: impl Display,
        id: &str,
        from: impl Display,
        to: impl Display,
    ) -> Self {
        Self::InvalidTransition {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
