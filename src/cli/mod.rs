//! cli
//!
//! Command-line interface layer for Metalist.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve path defaults from configuration (CLI flags take precedence)
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that drive [`crate::core::metadata::store::MetadataStore`]. All
//! list mutations flow through the store; handlers never edit list files
//! directly.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::core::config::Config;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = Config::load()?;
    let ctx = commands::Context::new(&cli, &config);

    commands::dispatch(cli.command, &ctx)
}
