//! Agent memory cache CLI
//!
//! Short-term associative memory backed by a local vector cache.
//!
//! # Usage
//!
//! ```bash
//! memory-cache add "The user prefers concise answers"
//! memory-cache relevant "how should I answer?" -k 3
//! memory-cache get "concise answers"
//! memory-cache stats
//! memory-cache clear
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/agent-memory/config.toml)
//! 3. Environment variables (MEMORY_*, OPENAI_API_KEY)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use memory_cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
