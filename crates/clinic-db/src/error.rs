//! Database error types for clinic-db.

use clinic_core::enums::EntityType;
use clinic_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A referenced record does not exist or is outside the actor's clinic.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// Invalid state encountered (e.g., a disallowed status transition).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input failed validation before reaching SQL.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The acting user may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    #[must_use]
    pub fn not_found(entity_type: EntityType, id: &str) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { entity_type, id } => {
                Self::Query(format!("{entity_type} not found: {id}"))
            }
            CoreError::InvalidTransition { .. } => Self::InvalidState(error.to_string()),
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::Forbidden(message) => Self::Forbidden(message),
            CoreError::Other(inner) => Self::Other(inner),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        Self::Other(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = DatabaseError::not_found(EntityType::Prompt, "prm-00000000");
        assert_eq!(err.to_string(), "prompt not found: prm-00000000");
    }

    #[test]
    fn invalid_transition_maps_to_invalid_state() {
        let err: DatabaseError = CoreError::InvalidTransition {
            entity_type: "appointment".into(),
            id: "apt-1".into(),
            from: "completed".into(),
            to: "scheduled".into(),
        }
        .into();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }
}
