//! Memory cache CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Settings, embedder and cache wiring plus command execution

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{build_embedder, execute, init_logging, load_settings, run};
