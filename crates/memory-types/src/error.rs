//! Errors raised while loading and validating settings.

use thiserror::Error;

/// Settings error.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Config sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// A loaded value failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
