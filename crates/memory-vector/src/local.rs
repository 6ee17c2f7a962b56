//! File-backed local vector cache.
//!
//! One [`LocalCache`] owns the content of one cache key. The content is
//! loaded on first use (or created empty when no file exists), kept in
//! memory, and written back after every `add` and `clear`.
//!
//! A failed write is returned to the caller but the in-memory content keeps
//! the mutation, so later reads in the same process still see it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use memory_embeddings::EmbeddingModel;
use memory_types::Settings;
use tracing::{debug, info};

use crate::content::{CacheContent, CACHE_FILE_EXTENSION};
use crate::error::VectorError;
use crate::provider::{CacheStats, MemoryProvider};
use crate::similarity::rank;

/// Where a cache lives on disk.
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    /// Cache key; names the backing file
    pub cache_key: String,
    /// Directory holding the backing file
    pub cache_dir: PathBuf,
}

impl LocalCacheConfig {
    pub fn new(cache_key: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_key: cache_key.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache key and directory from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.cache_key.clone(), settings.expanded_cache_dir())
    }

    /// Reject keys that cannot name a single file inside `cache_dir`.
    pub fn validate(&self) -> Result<(), VectorError> {
        let key = self.cache_key.as_str();
        let invalid = key.trim().is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0']);
        if invalid {
            return Err(VectorError::InvalidKey(self.cache_key.clone()));
        }
        Ok(())
    }

    /// `<cache_dir>/<cache_key>.json`
    pub fn file_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", self.cache_key, CACHE_FILE_EXTENSION))
    }
}

/// Local vector cache persisted to a JSON file per cache key.
pub struct LocalCache {
    config: LocalCacheConfig,
    path: PathBuf,
    embedder: Arc<dyn EmbeddingModel>,
    content: Option<CacheContent>,
}

impl LocalCache {
    /// Create a cache bound to `config`. Nothing is read until first use.
    pub fn new(
        config: LocalCacheConfig,
        embedder: Arc<dyn EmbeddingModel>,
    ) -> Result<Self, VectorError> {
        config.validate()?;
        let path = config.file_path();
        Ok(Self {
            config,
            path,
            embedder,
            content: None,
        })
    }

    /// Create a cache from loaded settings.
    pub fn from_settings(
        settings: &Settings,
        embedder: Arc<dyn EmbeddingModel>,
    ) -> Result<Self, VectorError> {
        Self::new(LocalCacheConfig::from_settings(settings), embedder)
    }

    pub fn cache_key(&self) -> &str {
        &self.config.cache_key
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embedding width this cache stores
    pub fn dimension(&self) -> usize {
        self.embedder.info().dimension
    }

    /// Whether the content has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Current content, loading it on first use.
    pub fn content(&mut self) -> Result<&CacheContent, VectorError> {
        self.loaded().map(|content| &*content)
    }

    fn loaded(&mut self) -> Result<&mut CacheContent, VectorError> {
        let content = match self.content.take() {
            Some(content) => content,
            None => {
                let content = CacheContent::load(&self.path, self.dimension())?;
                info!(
                    key = %self.config.cache_key,
                    path = ?self.path,
                    entries = content.len(),
                    "Loaded memory cache"
                );
                content
            }
        };
        Ok(self.content.insert(content))
    }

    fn persist(&self) -> Result<(), VectorError> {
        match &self.content {
            Some(content) => content.persist(&self.path),
            None => Ok(()),
        }
    }
}

impl MemoryProvider for LocalCache {
    fn add(&mut self, text: &str) -> Result<(), VectorError> {
        self.loaded()?;
        let embedding = self.embedder.embed(text)?;

        let content = self.loaded()?;
        content.push(text.to_string(), &embedding)?;
        let entries = content.len();

        self.persist()?;
        debug!(key = %self.config.cache_key, entries, "Added memory");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), VectorError> {
        self.loaded()?.clear();
        self.persist()?;
        info!(key = %self.config.cache_key, "Cleared memory cache");
        Ok(())
    }

    fn get_relevant(&mut self, text: &str, k: usize) -> Result<Vec<String>, VectorError> {
        if k == 0 || self.loaded()?.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text)?;
        let content = self.loaded()?;
        if query.dimension() != content.dimension() {
            return Err(VectorError::DimensionMismatch {
                expected: content.dimension(),
                actual: query.dimension(),
            });
        }

        let ranked = rank(content.embeddings(), &query.values, k);
        debug!(
            k,
            found = ranked.len(),
            top_score = ranked.first().map(|r| r.score),
            "Ranked memories"
        );

        Ok(ranked
            .into_iter()
            .map(|r| content.texts()[r.index].clone())
            .collect())
    }

    fn get_stats(&mut self) -> Result<CacheStats, VectorError> {
        let content = self.loaded()?;
        Ok(CacheStats {
            count: content.len(),
            shape: content.embeddings().shape(),
        })
    }
}
