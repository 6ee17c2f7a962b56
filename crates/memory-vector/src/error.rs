//! Vector cache error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding holds NaN or an infinite value, which JSON cannot store
    #[error("Non-finite embedding value at position {position}")]
    NonFinite { position: usize },

    /// Cache key cannot name a file
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    /// Backing file exists but does not hold a valid cache
    #[error("Malformed cache file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// Backing file could not be read
    #[error("Failed to read cache file {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache could not be written to disk
    #[error("Failed to persist cache to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] memory_embeddings::EmbeddingError),
}
