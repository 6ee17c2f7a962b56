//! # memory-vector
//!
//! Short-term associative memory for Agent Memory.
//!
//! Stores free-text fragments next to their embedding vectors in a keyed,
//! file-backed cache and retrieves the fragments closest to a query by
//! cosine similarity.
//!
//! ## Features
//! - `CacheContent`: ordered texts plus a parallel row-major embedding matrix
//! - Atomic JSON persistence (`<cache_dir>/<cache_key>.json`) after every mutation
//! - Exact cosine ranking over every stored row, ties broken by insertion order
//! - `MemoryProvider` trait shared by every memory backend

pub mod content;
pub mod error;
pub mod local;
pub mod provider;
pub mod similarity;

pub use content::{CacheContent, EmbeddingMatrix, CACHE_FILE_EXTENSION};
pub use error::VectorError;
pub use local::{LocalCache, LocalCacheConfig};
pub use provider::{CacheStats, MemoryProvider, DEFAULT_NUM_RELEVANT};
pub use similarity::{rank, ScoredRow};
