//! # memory-types
//!
//! Shared configuration and error types for the agent memory cache.
//!
//! - [`Settings`]: layered configuration (defaults, config file, `MEMORY_*`
//!   environment variables) naming the cache key, cache directory and the
//!   embedding service settings.
//! - [`MemoryError`]: error type for configuration loading and validation.
//!
//! ## Usage
//!
//! ```rust
//! use memory_types::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.cache_key, "agent-memory");
//! ```

pub mod config;
pub mod error;

pub use config::{EmbeddingSettings, Settings};
pub use error::MemoryError;
