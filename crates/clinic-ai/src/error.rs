//! Generation error types.

use clinic_db::error::DatabaseError;
use thiserror::Error;

/// Errors raised while composing a prompt or calling the AI provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("AI API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider returned 429. Not retried.
    #[error("AI quota exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The provider answered without any text.
    #[error("AI returned no text: {0}")]
    EmptyResponse(String),

    /// The provider's response could not be decoded.
    #[error("failed to parse AI response: {0}")]
    Parse(String),

    /// The template cannot be used for this generation.
    #[error("template error: {0}")]
    Template(String),

    /// The name map is unusable (empty codename, pattern too large).
    #[error("anonymization error: {0}")]
    Anonymization(String),

    /// No API key configured.
    #[error("AI provider '{0}' is not configured")]
    NotConfigured(String),

    /// A referenced record could not be loaded.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
