//! # memory-embeddings
//!
//! Embedding source for the agent memory cache.
//!
//! Turns text into fixed-length vectors by calling an OpenAI-compatible
//! embeddings endpoint (OpenAI or an Azure deployment). When the service
//! rejects the credentials, cannot be reached, or no API key is configured,
//! the embedder returns a zero vector of the configured width instead of an
//! error, so storage and retrieval keep working offline.
//!
//! ## Features
//! - `EmbeddingModel` trait shared by every embedder
//! - `OpenAiEmbedder`: blocking HTTP client, batch requests, zero fallback
//! - `MemoizedEmbedder`: per-text memoization wrapper
//! - `OneHotEmbedder`: deterministic embedder for tests and demos

pub mod cache;
pub mod error;
pub mod mock;
pub mod model;
pub mod openai;

pub use cache::MemoizedEmbedder;
pub use error::EmbeddingError;
pub use mock::OneHotEmbedder;
pub use model::{cosine_similarity, Embedding, EmbeddingModel, ModelInfo};
pub use openai::{AzureDeployment, OpenAiEmbedder, OpenAiEmbedderConfig, ADA_002_DIMENSION};
