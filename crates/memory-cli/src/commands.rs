//! Command implementations for the memory cache CLI.
//!
//! Handles:
//! - Settings loading with CLI overrides
//! - Embedder construction (OpenAI or Azure, optionally memoized)
//! - Executing cache commands against any [`MemoryProvider`]

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use memory_embeddings::{EmbeddingModel, MemoizedEmbedder, OpenAiEmbedder};
use memory_types::{EmbeddingSettings, Settings};
use memory_vector::{LocalCache, MemoryProvider};

use crate::cli::{Cli, Commands};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so
/// command results on stdout stay pipeable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load settings and apply CLI flag overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }
    if let Some(key) = &cli.cache_key {
        settings.cache_key = key.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = dir.clone();
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Build the embedder described by `settings`.
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingModel>> {
    if !settings.has_credentials() {
        info!("No embedding API key configured, vectors will be zero-filled");
    }

    let embedder =
        OpenAiEmbedder::from_settings(settings).context("Failed to create embedder")?;

    if settings.memoize {
        debug!("Memoizing embeddings");
        Ok(Arc::new(MemoizedEmbedder::new(embedder)))
    } else {
        Ok(Arc::new(embedder))
    }
}

/// Execute one command, writing results to `out`.
pub fn execute(
    provider: &mut dyn MemoryProvider,
    command: &Commands,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Add { text } => {
            provider.add(text).context("Failed to add text")?;
            let stats = provider.get_stats()?;
            writeln!(out, "Stored ({} entries)", stats.count)?;
        }
        Commands::Get { text } => {
            for found in provider.get(text).context("Lookup failed")? {
                writeln!(out, "{found}")?;
            }
        }
        Commands::Relevant { query, k } => {
            for found in provider
                .get_relevant(query, *k)
                .context("Relevance query failed")?
            {
                writeln!(out, "{found}")?;
            }
        }
        Commands::Clear => {
            provider.clear().context("Failed to clear cache")?;
            writeln!(out, "Cache cleared")?;
        }
        Commands::Stats => {
            let stats = provider.get_stats().context("Failed to read stats")?;
            writeln!(out, "count: {}", stats.count)?;
            writeln!(out, "shape: ({}, {})", stats.shape.0, stats.shape.1)?;
        }
    }
    Ok(())
}

/// Entry point used by the binary.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;

    info!(
        cache_key = %settings.cache_key,
        cache_dir = %settings.expanded_cache_dir().display(),
        "Opening memory cache"
    );

    let embedder = build_embedder(&settings.embedding)?;
    let mut cache =
        LocalCache::from_settings(&settings, embedder).context("Failed to open cache")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&mut cache, &cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}
