//! remote::git
//!
//! Git-backed masterlist distribution using git2.
//!
//! # Layout
//!
//! A masterlist path like `lists/masterlist.yaml` means `lists/` is the
//! repository and `masterlist.yaml` the tracked file. [`GitRemote::update`]
//! initializes the repository on first use, fetches from `origin`, checks
//! the tracked file out of the requested branch's fetched tip, and moves
//! the local branch to match.
//!
//! # Error Normalization
//!
//! git2 errors are normalized into [`RemoteError`] variants here; no other
//! module sees git2 types.

use std::fs;
use std::path::Path;

use git2::{Blob, Commit, ErrorCode, Repository};

use super::traits::{RemoteError, RemoteSync, RevisionInfo};

/// Masterlist distribution over git.
#[derive(Debug, Default)]
pub struct GitRemote;

impl GitRemote {
    /// Create a git backend.
    pub fn new() -> Self {
        Self
    }
}

impl RemoteSync for GitRemote {
    fn update(&self, path: &Path, url: &str, branch: &str) -> Result<bool, RemoteError> {
        let (dir, filename) = split_list_path(path)?;
        let repo = ensure_repo(dir, url)?;
        fetch_origin(&repo)?;

        let commit = remote_branch_commit(&repo, branch)?;
        let blob = list_blob(&repo, &commit, &filename)?;
        let new_bytes = blob.content().to_vec();
        drop(blob);

        let old_bytes = fs::read(path).ok();
        let changed = old_bytes.as_deref() != Some(new_bytes.as_slice());

        if changed {
            fs::write(path, &new_bytes).map_err(|e| RemoteError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        // Move the local branch to the fetched commit so revision queries
        // describe what is on disk.
        repo.reference(
            &format!("refs/heads/{branch}"),
            commit.id(),
            true,
            "metalist: update masterlist",
        )
        .map_err(as_git_error)?;
        repo.set_head(&format!("refs/heads/{branch}"))
            .map_err(as_git_error)?;

        log::info!(
            "updated '{}' from {url} ({branch}): {}",
            path.display(),
            if changed { "changed" } else { "unchanged" }
        );

        Ok(changed)
    }

    fn get_info(&self, path: &Path, short: bool) -> Result<RevisionInfo, RemoteError> {
        let (dir, filename) = split_list_path(path)?;
        let repo = open_repo(dir)?;

        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(as_git_error)?;

        let revision = if short {
            commit
                .as_object()
                .short_id()
                .ok()
                .and_then(|buf| buf.as_str().map(str::to_string))
                .unwrap_or_else(|| commit.id().to_string())
        } else {
            commit.id().to_string()
        };

        let date = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
            .ok_or_else(|| RemoteError::Git("commit timestamp out of range".into()))?
            .date_naive();

        let tracked = list_blob(&repo, &commit, &filename)?;
        let on_disk = fs::read(path).ok();
        let is_modified = on_disk.as_deref() != Some(tracked.content());

        Ok(RevisionInfo {
            revision,
            date,
            is_modified,
        })
    }

    fn is_latest(&self, path: &Path, branch: &str) -> Result<bool, RemoteError> {
        let (dir, _) = split_list_path(path)?;
        let repo = open_repo(dir)?;
        fetch_origin(&repo)?;

        let tip = remote_branch_commit(&repo, branch)?.id();
        let head = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(as_git_error)?
            .id();

        Ok(head == tip)
    }
}

/// Split a list path into its repository directory and tracked file name.
fn split_list_path(path: &Path) -> Result<(&Path, String), RemoteError> {
    let invalid = || RemoteError::InvalidPath {
        path: path.to_path_buf(),
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    match (dir, filename) {
        (Some(dir), Some(filename)) => Ok((dir, filename)),
        _ => Err(invalid()),
    }
}

fn open_repo(dir: &Path) -> Result<Repository, RemoteError> {
    Repository::open(dir).map_err(|_| RemoteError::NotARepo {
        path: dir.to_path_buf(),
    })
}

/// Open the repository at `dir`, initializing it and wiring `origin` to
/// `url` as needed.
fn ensure_repo(dir: &Path, url: &str) -> Result<Repository, RemoteError> {
    let repo = match Repository::open(dir) {
        Ok(repo) => repo,
        Err(_) => Repository::init(dir).map_err(as_git_error)?,
    };

    match repo.find_remote("origin") {
        Ok(remote) => {
            if remote.url() != Some(url) {
                drop(remote);
                repo.remote_set_url("origin", url).map_err(as_git_error)?;
            }
        }
        Err(_) => {
            repo.remote("origin", url).map_err(as_git_error)?;
        }
    }

    Ok(repo)
}

/// Fetch `origin` using its configured refspecs.
///
/// The wildcard refspec updates every remote-tracking ref, so a missing
/// branch surfaces afterwards as a typed ref-not-found on lookup instead of
/// an untyped fetch failure.
fn fetch_origin(repo: &Repository) -> Result<(), RemoteError> {
    let mut remote = repo.find_remote("origin").map_err(as_git_error)?;
    let refspecs: [&str; 0] = [];
    remote.fetch(&refspecs, None, None).map_err(as_git_error)
}

fn remote_branch_commit<'r>(
    repo: &'r Repository,
    branch: &str,
) -> Result<Commit<'r>, RemoteError> {
    let refname = format!("refs/remotes/origin/{branch}");
    let reference = repo.find_reference(&refname).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            RemoteError::RefNotFound {
                name: branch.to_string(),
            }
        } else {
            as_git_error(e)
        }
    })?;
    reference.peel_to_commit().map_err(as_git_error)
}

fn list_blob<'r>(
    repo: &'r Repository,
    commit: &Commit<'_>,
    name: &str,
) -> Result<Blob<'r>, RemoteError> {
    let tree = commit.tree().map_err(as_git_error)?;
    let entry = tree
        .get_name(name)
        .ok_or_else(|| RemoteError::Git(format!("'{name}' is not tracked in the repository")))?;
    let object = entry.to_object(repo).map_err(as_git_error)?;
    object
        .into_blob()
        .map_err(|_| RemoteError::Git(format!("'{name}' is not a regular file")))
}

fn as_git_error(err: git2::Error) -> RemoteError {
    RemoteError::Git(err.message().to_string())
}
