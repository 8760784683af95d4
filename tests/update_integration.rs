//! Integration tests for the git distribution backend.
//!
//! These tests exercise GitRemote against real repositories created with
//! the git CLI in temp directories; the "remote" is a local path URL.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use metalist::remote::{GitRemote, RemoteError, RemoteSync};

// =============================================================================
// Test Helpers
// =============================================================================

/// An origin repository serving a masterlist file.
struct OriginRepo {
    dir: TempDir,
}

impl OriginRepo {
    fn new(masterlist: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");

        git(dir.path(), &["init", "-b", "main"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "user.name", "Test User"]);

        let repo = Self { dir };
        repo.commit_masterlist(masterlist, "Initial masterlist");
        repo
    }

    fn commit_masterlist(&self, contents: &str, message: &str) {
        std::fs::write(self.dir.path().join("masterlist.yaml"), contents)
            .expect("write masterlist");
        git(self.dir.path(), &["add", "masterlist.yaml"]);
        git(self.dir.path(), &["commit", "-m", message]);
    }

    fn url(&self) -> String {
        self.dir.path().display().to_string()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A local checkout directory managed by GitRemote.
fn local_list_path(temp: &TempDir) -> PathBuf {
    let dir = temp.path().join("lists");
    std::fs::create_dir(&dir).expect("create lists dir");
    dir.join("masterlist.yaml")
}

const V1: &str = "plugins:\n  - name: Foo.esp\n    tags: [Relev]\n";
const V2: &str = "plugins:\n  - name: Foo.esp\n    tags: [Relev, Delev]\n";

// =============================================================================
// Tests
// =============================================================================

#[test]
fn first_update_checks_out_the_file() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    let changed = remote.update(&path, &origin.url(), "main").unwrap();

    assert!(changed);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), V1);
}

#[test]
fn update_is_idempotent_until_origin_moves() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    assert!(remote.update(&path, &origin.url(), "main").unwrap());
    assert!(!remote.update(&path, &origin.url(), "main").unwrap());

    origin.commit_masterlist(V2, "Tag update");
    assert!(remote.update(&path, &origin.url(), "main").unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), V2);
}

#[test]
fn update_restores_local_edits() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    remote.update(&path, &origin.url(), "main").unwrap();

    // A local edit counts as a change to undo.
    std::fs::write(&path, "plugins: []\n").unwrap();
    assert!(remote.update(&path, &origin.url(), "main").unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), V1);
}

#[test]
fn unknown_branch_is_ref_not_found() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    let err = remote.update(&path, &origin.url(), "no-such-branch").unwrap_err();
    assert!(matches!(err, RemoteError::RefNotFound { .. }));
}

#[test]
fn get_info_describes_the_checkout() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    remote.update(&path, &origin.url(), "main").unwrap();

    let info = remote.get_info(&path, false).unwrap();
    assert_eq!(info.revision.len(), 40);
    assert!(!info.is_modified);

    let short = remote.get_info(&path, true).unwrap();
    assert!(short.revision.len() < 40);
    assert!(info.revision.starts_with(&short.revision));

    // Local edits show up as modification.
    std::fs::write(&path, "plugins: []\n").unwrap();
    let edited = remote.get_info(&path, false).unwrap();
    assert!(edited.is_modified);
}

#[test]
fn is_latest_tracks_the_branch_tip() {
    let origin = OriginRepo::new(V1);
    let temp = TempDir::new().unwrap();
    let path = local_list_path(&temp);

    let remote = GitRemote::new();
    remote.update(&path, &origin.url(), "main").unwrap();
    assert!(remote.is_latest(&path, "main").unwrap());

    origin.commit_masterlist(V2, "Move the tip");
    assert!(!remote.is_latest(&path, "main").unwrap());

    remote.update(&path, &origin.url(), "main").unwrap();
    assert!(remote.is_latest(&path, "main").unwrap());
}
