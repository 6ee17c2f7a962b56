//! Memory provider trait and types.
//!
//! Defines the capability surface every memory backend exposes, so the rest
//! of the agent does not depend on where memories live.

use crate::error::VectorError;

/// Number of results returned by [`MemoryProvider::get_relevant_default`].
pub const DEFAULT_NUM_RELEVANT: usize = 5;

/// Read-only snapshot of a provider's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored texts
    pub count: usize,
    /// Shape of the embedding matrix as `(rows, cols)`
    pub shape: (usize, usize),
}

/// Trait for memory backends.
///
/// Operations take `&mut self`: a backend may load its state lazily on first
/// use, and callers serialize access.
pub trait MemoryProvider: Send {
    /// Store `text` with its embedding and persist.
    fn add(&mut self, text: &str) -> Result<(), VectorError>;

    /// Closest stored text to `text`, as a single-element list.
    ///
    /// This is a similarity lookup, not an exact-match fetch.
    fn get(&mut self, text: &str) -> Result<Vec<String>, VectorError> {
        self.get_relevant(text, 1)
    }

    /// Remove everything and persist the empty state.
    fn clear(&mut self) -> Result<(), VectorError>;

    /// Up to `k` stored texts, most similar to `text` first.
    fn get_relevant(&mut self, text: &str, k: usize) -> Result<Vec<String>, VectorError>;

    /// [`get_relevant`](Self::get_relevant) with [`DEFAULT_NUM_RELEVANT`] results.
    fn get_relevant_default(&mut self, text: &str) -> Result<Vec<String>, VectorError> {
        self.get_relevant(text, DEFAULT_NUM_RELEVANT)
    }

    /// Entry count and embedding matrix shape.
    fn get_stats(&mut self) -> Result<CacheStats, VectorError>;
}
