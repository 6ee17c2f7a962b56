//! Configuration loading for the agent memory cache.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/agent-memory/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MemoryError;

/// Environment variable consulted when no embedding API key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Embedding service configuration.
///
/// Only the embedder reads these values; the cache itself never sees
/// credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding model name (e.g., "text-embedding-ada-002")
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector width returned by the model
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Route requests through an Azure OpenAI deployment
    #[serde(default)]
    pub use_azure: bool,

    /// Azure deployment serving the embedding model
    #[serde(default)]
    pub azure_deployment_id: Option<String>,

    /// Azure REST API version
    #[serde(default = "default_azure_api_version")]
    pub azure_api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Reuse vectors for identical input text within the process
    #[serde(default)]
    pub memoize: bool,
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_azure_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            api_key: None,
            api_base_url: default_api_base_url(),
            use_azure: false,
            azure_deployment_id: None,
            azure_api_version: default_azure_api_version(),
            timeout_secs: default_timeout_secs(),
            memoize: false,
        }
    }
}

impl EmbeddingSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("embedding.dimension must be > 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("embedding.timeout_secs must be > 0".to_string());
        }
        let deployment = self.azure_deployment_id.as_deref();
        if self.use_azure && deployment.is_none_or(|id| id.trim().is_empty()) {
            return Err(
                "embedding.azure_deployment_id is required when use_azure is set".to_string(),
            );
        }
        Ok(())
    }

    /// Whether credentials are available for the embedding service.
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Cache key naming the on-disk store (`<cache_dir>/<cache_key>.json`)
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// Directory holding cache files
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_cache_key() -> String {
    "agent-memory".to_string()
}

fn default_cache_dir() -> String {
    ProjectDirs::from("", "", "agent-memory")
        .map(|p| p.data_local_dir().join("cache"))
        .unwrap_or_else(|| PathBuf::from("./cache"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_key: default_cache_key(),
            cache_dir: default_cache_dir(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/agent-memory/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (MEMORY_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, MemoryError> {
        let config_dir = ProjectDirs::from("", "", "agent-memory")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("cache_key", default_cache_key())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("cache_dir", default_cache_dir())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("embedding.model", default_embedding_model())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("embedding.dimension", default_embedding_dimension() as i64)
            .map_err(|e| MemoryError::Config(e.to_string()))?
            // 2. Default config file
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables: MEMORY_CACHE_KEY, MEMORY_EMBEDDING__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("MEMORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        let mut settings: Settings = config
            .try_deserialize()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        if !settings.embedding.has_credentials() {
            settings.embedding.api_key = std::env::var(OPENAI_API_KEY_ENV)
                .ok()
                .filter(|k| !k.is_empty());
        }

        Ok(settings)
    }

    /// Validate the loaded settings.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.cache_key.trim().is_empty() {
            return Err(MemoryError::InvalidInput(
                "cache_key must not be empty".to_string(),
            ));
        }
        self.embedding
            .validate()
            .map_err(MemoryError::InvalidInput)
    }

    /// Expand ~ in cache_dir to actual home directory
    pub fn expanded_cache_dir(&self) -> PathBuf {
        if let Some(rest) = self.cache_dir.strip_prefix("~/") {
            if let Some(home) = dirs_home() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.cache_dir)
    }
}

/// Get user's home directory
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
}
