//! Embedding memoization.
//!
//! Wraps any [`EmbeddingModel`] and reuses the vector computed for an exact
//! input text. Zero vectors (the offline fallback) are never stored, so a
//! transient outage does not pin degraded vectors in memory.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default maximum number of memoized texts
pub const DEFAULT_MEMO_CAPACITY: usize = 10_000;

/// Memoizing wrapper around an embedding model.
///
/// The memo is an LRU cache protected by a Mutex; lookups update recency.
pub struct MemoizedEmbedder<M> {
    inner: M,
    memo: Mutex<LruCache<String, Embedding>>,
}

impl<M: EmbeddingModel> MemoizedEmbedder<M> {
    /// Wrap `inner` with the default capacity.
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, DEFAULT_MEMO_CAPACITY)
    }

    /// Wrap `inner`, remembering at most `capacity` texts (minimum 1). Once
    /// full, the least recently used text is evicted.
    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            memo: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of memoized texts
    pub fn len(&self) -> usize {
        self.memo.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access the wrapped model
    pub fn inner(&self) -> &M {
        &self.inner
    }

    fn lookup(&self, text: &str) -> Option<Embedding> {
        self.memo.lock().ok()?.get(text).cloned()
    }

    fn remember(&self, text: &str, embedding: &Embedding) {
        if embedding.is_zero() {
            return;
        }
        if let Ok(mut memo) = self.memo.lock() {
            memo.put(text.to_string(), embedding.clone());
        }
    }
}

impl<M: EmbeddingModel> EmbeddingModel for MemoizedEmbedder<M> {
    fn info(&self) -> &ModelInfo {
        self.inner.info()
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if let Some(hit) = self.lookup(text) {
            debug!("Embedding memo hit");
            return Ok(hit);
        }
        let embedding = self.inner.embed(text)?;
        self.remember(text, &embedding);
        Ok(embedding)
    }
}
