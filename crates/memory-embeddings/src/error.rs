//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// No API key configured
    #[error("No API key configured for the embedding service")]
    MissingCredentials,

    /// Service rejected the credentials
    #[error("Embedding service rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Service unreachable or failing on its side
    #[error("Embedding service unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success response
    #[error("Embedding API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Response body could not be interpreted
    #[error("Failed to parse embedding response: {0}")]
    Parse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EmbeddingError {
    /// Whether this failure is covered by the zero-vector fallback.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            EmbeddingError::MissingCredentials
                | EmbeddingError::Unauthorized { .. }
                | EmbeddingError::Unavailable(_)
        )
    }
}
