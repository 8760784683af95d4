//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--masterlist <PATH>`: Masterlist file (overrides config)
//! - `--userlist <PATH>`: Userlist file (overrides config)
//! - `--data-dir <DIR>`: Directory to evaluate conditions against
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Metalist - layered plugin-metadata store with conditional filtering
#[derive(Parser, Debug)]
#[command(name = "mls")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Masterlist file path (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub masterlist: Option<PathBuf>,

    /// Userlist file path (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub userlist: Option<PathBuf>,

    /// Data directory to evaluate conditions against (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the effective metadata for one entity
    #[command(
        long_about = "Show the effective metadata for one entity.\n\n\
            Merges the userlist record onto the masterlist record, unless \
            --no-userlist or --userlist-only narrows the sources. With --eval, \
            parts whose conditions do not hold in the data directory are \
            dropped from the output."
    )]
    Resolve {
        /// Entity name (case-insensitive)
        name: String,

        /// Only show what the user has customized
        #[arg(long, conflicts_with = "no_userlist")]
        userlist_only: bool,

        /// Ignore the userlist entirely
        #[arg(long)]
        no_userlist: bool,

        /// Evaluate conditions against the data directory
        #[arg(long)]
        eval: bool,
    },

    /// List every known tag across both lists
    Tags,

    /// Show list-level messages from both lists
    Messages {
        /// Evaluate conditions against the data directory
        #[arg(long)]
        eval: bool,
    },

    /// Export the minimal tag/dirty list
    #[command(
        long_about = "Export a reduced list containing only entities with tag \
            suggestions or dirty records, for third-party consumers."
    )]
    Taglist {
        /// Output path
        #[arg(value_name = "PATH")]
        output: PathBuf,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },

    /// Update the masterlist from its remote
    Update {
        /// Remote repository URL (overrides config)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Branch to track (overrides config)
        #[arg(long, value_name = "BRANCH")]
        branch: Option<String>,

        /// Only check whether the masterlist is at the branch tip
        #[arg(long)]
        check: bool,
    },

    /// Show the masterlist revision
    Revision {
        /// Abbreviate the revision id
        #[arg(long)]
        short: bool,
    },

    /// Edit the userlist
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Userlist editing actions.
#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Set one entity's user metadata from a YAML file
    Set {
        /// YAML file holding a single entity record
        file: PathBuf,
    },

    /// Discard one entity's user metadata
    Discard {
        /// Entity name (case-insensitive)
        name: String,
    },

    /// Discard all user metadata
    Clear,

    /// Write the userlist to another path
    Write {
        /// Output path
        output: PathBuf,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },
}

/// Supported completion shells.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
