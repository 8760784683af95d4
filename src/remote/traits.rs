//! remote::traits
//!
//! Trait definition for masterlist distribution backends.
//!
//! # Design
//!
//! The store only reacts to the boolean "changed" result of an update; how
//! the file moves over the wire is the backend's business. Backends own
//! their own retry and timeout policy.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Errors from distribution backends.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The list path is not inside a repository the backend manages.
    #[error("no repository at '{path}'")]
    NotARepo { path: std::path::PathBuf },

    /// The requested branch or revision does not exist.
    #[error("ref not found: {name}")]
    RefNotFound { name: String },

    /// The list path itself is unusable (no parent directory, no file name).
    #[error("invalid list path '{path}'")]
    InvalidPath { path: std::path::PathBuf },

    /// Filesystem failure while materializing the list file.
    #[error("failed to write '{path}': {message}")]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    /// Transport or repository failure, normalized to a message.
    #[error("git error: {0}")]
    Git(String),
}

/// Description of the revision a list file was checked out from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionInfo {
    /// Commit id, full or abbreviated.
    pub revision: String,

    /// Commit date.
    pub date: NaiveDate,

    /// True when the working copy of the list file differs from the
    /// checked-out revision (the user edited it in place).
    pub is_modified: bool,
}

/// A masterlist distribution backend.
pub trait RemoteSync {
    /// Bring the list file at `path` up to date from `url`/`branch`.
    ///
    /// Returns `true` when the file content changed, `false` when it was
    /// already current.
    fn update(&self, path: &Path, url: &str, branch: &str) -> Result<bool, RemoteError>;

    /// Describe the revision currently checked out at `path`.
    fn get_info(&self, path: &Path, short: bool) -> Result<RevisionInfo, RemoteError>;

    /// Is the checkout at `path` at the tip of `branch`?
    fn is_latest(&self, path: &Path, branch: &str) -> Result<bool, RemoteError>;
}
