//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Drives the metadata store
//! 3. Formats and displays output
//!
//! Handlers never edit list files directly; mutations flow through the
//! store and its write operations.

mod completion;
mod messages;
mod resolve;
mod revision;
mod taglist;
mod tags;
mod update;
mod user;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use messages::messages;
pub use resolve::resolve;
pub use revision::revision;
pub use taglist::taglist;
pub use tags::tags;
pub use update::update;
pub use user::user;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::args::{Cli, Command};
use crate::condition::{ConditionCache, ConditionEvaluator, DirState, InstalledState, MemoryState};
use crate::core::config::Config;
use crate::core::metadata::store::MetadataStore;
use crate::ui::Verbosity;

/// Resolved invocation context: CLI flags with config defaults applied.
#[derive(Debug, Clone)]
pub struct Context {
    pub masterlist: Option<PathBuf>,
    pub userlist: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub branch: String,
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Context {
    /// Merge CLI flags over configured defaults.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        Self {
            masterlist: cli
                .masterlist
                .clone()
                .or_else(|| config.masterlist().map(Into::into)),
            userlist: cli
                .userlist
                .clone()
                .or_else(|| config.userlist().map(Into::into)),
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| config.data_dir().map(Into::into)),
            remote_url: config.remote_url().map(str::to_string),
            branch: config.branch().to_string(),
            verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
            json: cli.json,
        }
    }

    /// Build a store and load the configured lists into it.
    pub fn open_store(&self) -> Result<MetadataStore> {
        let state: Arc<dyn InstalledState> = match &self.data_dir {
            Some(dir) => Arc::new(DirState::new(dir)),
            // Without a data directory there is nothing installed; every
            // existence check fails and unconditional metadata still shows.
            None => Arc::new(MemoryState::new()),
        };

        let evaluator = ConditionEvaluator::new(state, ConditionCache::shared());
        let mut store = MetadataStore::new(evaluator);
        store.load_lists(self.masterlist.as_deref(), self.userlist.as_deref())?;
        Ok(store)
    }

    /// The masterlist path, required by update and revision commands.
    pub fn require_masterlist(&self) -> Result<&PathBuf> {
        match &self.masterlist {
            Some(path) => Ok(path),
            None => bail!("no masterlist path; pass --masterlist or set it in the config file"),
        }
    }

    /// The userlist path, required by user editing commands.
    pub fn require_userlist(&self) -> Result<&PathBuf> {
        match &self.userlist {
            Some(path) => Ok(path),
            None => bail!("no userlist path; pass --userlist or set it in the config file"),
        }
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Resolve {
            name,
            userlist_only,
            no_userlist,
            eval,
        } => resolve(ctx, &name, userlist_only, no_userlist, eval),
        Command::Tags => tags(ctx),
        Command::Messages { eval } => messages(ctx, eval),
        Command::Taglist { output, force } => taglist(ctx, &output, force),
        Command::Update { url, branch, check } => update(ctx, url, branch, check),
        Command::Revision { short } => revision(ctx, short),
        Command::User { action } => user(ctx, action),
        Command::Completion { shell } => completion(shell),
    }
}
