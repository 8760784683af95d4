//! remote::mock
//!
//! Mock distribution backend for deterministic testing.
//!
//! # Design
//!
//! The mock scripts `update` outcomes ahead of time, records every call for
//! verification, and can be configured to fail any one method. A scripted
//! update may carry file content, which the mock writes to the list path so
//! that a store reload sees it, mirroring what a real backend's checkout
//! does.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use metalist::remote::{MockRemote, RemoteSync};
//!
//! let remote = MockRemote::new();
//! remote.queue_update(false);
//!
//! let changed = remote
//!     .update(Path::new("/tmp/masterlist.yaml"), "url", "main")
//!     .unwrap();
//! assert!(!changed);
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::traits::{RemoteError, RemoteSync, RevisionInfo};

/// Mock distribution backend.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    /// Scripted update outcomes, consumed front to back.
    updates: VecDeque<ScriptedUpdate>,
    /// Revision info returned by `get_info`.
    info: Option<RevisionInfo>,
    /// Result of `is_latest`.
    latest: bool,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug)]
struct ScriptedUpdate {
    changed: bool,
    content: Option<String>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail `update` with the given error.
    Update(RemoteError),
    /// Fail `get_info` with the given error.
    GetInfo(RemoteError),
    /// Fail `is_latest` with the given error.
    IsLatest(RemoteError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Update {
        path: std::path::PathBuf,
        url: String,
        branch: String,
    },
    GetInfo {
        path: std::path::PathBuf,
        short: bool,
    },
    IsLatest {
        path: std::path::PathBuf,
        branch: String,
    },
}

impl MockRemote {
    /// Create a mock with no scripted updates (updates report unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `update` outcome.
    pub fn queue_update(&self, changed: bool) {
        self.lock().updates.push_back(ScriptedUpdate {
            changed,
            content: None,
        });
    }

    /// Script the next `update` outcome and the file content it delivers.
    ///
    /// When consumed, the mock writes `content` to the list path before
    /// reporting `changed = true`.
    pub fn queue_update_with_content(&self, content: impl Into<String>) {
        self.lock().updates.push_back(ScriptedUpdate {
            changed: true,
            content: Some(content.into()),
        });
    }

    /// Set the revision info returned by `get_info`.
    pub fn set_info(&self, info: RevisionInfo) {
        self.lock().info = Some(info);
    }

    /// Set the result of `is_latest`.
    pub fn set_latest(&self, latest: bool) {
        self.lock().latest = latest;
    }

    /// Configure one method to fail.
    pub fn fail_on(&self, fail: FailOn) {
        self.lock().fail_on = Some(fail);
    }

    /// All recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockRemoteInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteSync for MockRemote {
    fn update(&self, path: &Path, url: &str, branch: &str) -> Result<bool, RemoteError> {
        let scripted = {
            let mut inner = self.lock();
            inner.operations.push(MockOperation::Update {
                path: path.to_path_buf(),
                url: url.to_string(),
                branch: branch.to_string(),
            });

            if let Some(FailOn::Update(err)) = &inner.fail_on {
                return Err(err.clone());
            }

            inner.updates.pop_front()
        };

        match scripted {
            Some(ScriptedUpdate { changed, content }) => {
                if let Some(content) = content {
                    fs::write(path, content).map_err(|e| RemoteError::Io {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                }
                Ok(changed)
            }
            None => Ok(false),
        }
    }

    fn get_info(&self, path: &Path, short: bool) -> Result<RevisionInfo, RemoteError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::GetInfo {
            path: path.to_path_buf(),
            short,
        });

        if let Some(FailOn::GetInfo(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner.info.clone().unwrap_or_else(|| RevisionInfo {
            revision: "0000000".to_string(),
            date: NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date"),
            is_modified: false,
        }))
    }

    fn is_latest(&self, path: &Path, branch: &str) -> Result<bool, RemoteError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::IsLatest {
            path: path.to_path_buf(),
            branch: branch.to_string(),
        });

        if let Some(FailOn::IsLatest(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner.latest)
    }
}
