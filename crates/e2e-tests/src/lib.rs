//! End-to-end test infrastructure for the agent memory cache.
//!
//! Provides a shared TestHarness plus deterministic embedders for tests
//! covering the add-to-query pipeline and restarts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::Rng;

use memory_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo, OneHotEmbedder};
use memory_types::Settings;
use memory_vector::{LocalCache, LocalCacheConfig};

/// Shared test harness for E2E tests.
///
/// Owns a temp directory used as the cache directory for every cache it
/// opens.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Directory holding cache files
    pub cache_dir: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with a fresh temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let cache_dir = temp_dir.path().join("cache");

        Self {
            _temp_dir: temp_dir,
            cache_dir,
        }
    }

    /// Settings pointing at the harness cache directory, without credentials.
    pub fn settings(&self, cache_key: &str) -> Settings {
        let mut settings = Settings {
            cache_key: cache_key.to_string(),
            cache_dir: self.cache_dir.to_string_lossy().to_string(),
            ..Default::default()
        };
        settings.embedding.api_key = None;
        settings
    }

    /// Open a cache for `cache_key` backed by `embedder`.
    pub fn cache(&self, cache_key: &str, embedder: Arc<dyn EmbeddingModel>) -> LocalCache {
        LocalCache::new(LocalCacheConfig::new(cache_key, &self.cache_dir), embedder)
            .expect("Failed to open cache")
    }

    /// Open a cache backed by a fresh one-hot embedder.
    pub fn one_hot_cache(&self, cache_key: &str, dimension: usize) -> LocalCache {
        self.cache(cache_key, Arc::new(OneHotEmbedder::new(dimension)))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Random alphanumeric noise string.
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Embedder answering from a fixed table; unknown texts embed to zeros.
pub struct TableEmbedder {
    info: ModelInfo,
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "table".to_string(),
                dimension,
            },
            table: HashMap::new(),
        }
    }

    /// Map `text` to `values`.
    pub fn with(mut self, text: &str, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), self.info.dimension, "table vector width");
        self.table.insert(text.to_string(), values);
        self
    }
}

impl EmbeddingModel for TableEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self
            .table
            .get(text)
            .map(|v| Embedding::new(v.clone()))
            .unwrap_or_else(|| Embedding::zeros(self.info.dimension)))
    }
}
