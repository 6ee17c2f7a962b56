//! Deterministic embedder for tests and offline demos.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Assigns each distinct text the next one-hot basis vector.
///
/// The n-th distinct text seen gets a 1.0 at position `n % dimension`, so
/// distinct texts are orthogonal until the dimension wraps around and the
/// same text always maps to the same vector.
pub struct OneHotEmbedder {
    info: ModelInfo,
    assigned: Mutex<HashMap<String, usize>>,
}

impl OneHotEmbedder {
    /// Create a one-hot embedder of the given width.
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "one-hot".to_string(),
                dimension,
            },
            assigned: Mutex::new(HashMap::new()),
        }
    }
}

impl EmbeddingModel for OneHotEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let dimension = self.info.dimension;
        if dimension == 0 {
            return Err(EmbeddingError::Config("dimension must be > 0".to_string()));
        }
        let mut assigned = self
            .assigned
            .lock()
            .map_err(|_| EmbeddingError::Config("one-hot state poisoned".to_string()))?;
        let next = assigned.len();
        let slot = *assigned.entry(text.to_string()).or_insert(next);

        let mut values = vec![0.0; dimension];
        values[slot % dimension] = 1.0;
        Ok(Embedding::new(values))
    }
}
