//! CLI argument parsing for the memory cache.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

use memory_vector::DEFAULT_NUM_RELEVANT;

/// Agent Memory Cache
///
/// Short-term associative memory for AI agents: store texts, recall the
/// ones most similar to a query.
#[derive(Parser, Debug)]
#[command(name = "memory-cache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/agent-memory/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override the cache key (names the backing file)
    #[arg(long, global = true)]
    pub cache_key: Option<String>,

    /// Override the cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Cache commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Store a text in the cache
    Add {
        /// Text to remember
        text: String,
    },

    /// Show the stored text closest to the given one
    Get {
        /// Text to look up
        text: String,
    },

    /// Show the stored texts most similar to a query
    Relevant {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_NUM_RELEVANT)]
        k: usize,
    },

    /// Remove every stored text
    Clear,

    /// Show entry count and embedding matrix shape
    Stats,
}
