//! condition::state
//!
//! Installed-state snapshots consulted by the condition evaluator.
//!
//! # Implementations
//!
//! - [`DirState`] - Reads a real data directory: file existence, CRC-32C
//!   content checksums, `<name>.version` sidecar files, and an optional
//!   `active.txt` manifest naming the active entities.
//! - [`MemoryState`] - In-memory snapshot for tests and embedders that
//!   already know the installed state.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::types::Version;

/// A snapshot of the installed state of a target directory.
///
/// Implementations answer point queries; memoization happens in the
/// condition cache, not here.
pub trait InstalledState {
    /// Does a file with this name exist?
    fn file_exists(&self, name: &str) -> bool;

    /// Is the named entity in the active set?
    fn is_active(&self, name: &str) -> bool;

    /// CRC-32C of the file's content, if it exists and is readable.
    fn checksum(&self, name: &str) -> Option<u32>;

    /// Installed version of the named entity, if known.
    fn version(&self, name: &str) -> Option<Version>;
}

/// Installed state backed by a data directory on disk.
///
/// The active set is read once at construction from `active.txt` in the
/// directory root (one name per line, `#` comments), when present. Versions
/// come from `<name>.version` sidecar files.
#[derive(Debug, Clone)]
pub struct DirState {
    root: PathBuf,
    active: BTreeSet<String>,
}

impl DirState {
    /// Snapshot the directory at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let active = Self::read_active_manifest(&root.join("active.txt"));
        Self { root, active }
    }

    /// Override the active set explicitly.
    pub fn with_active<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.active = names
            .into_iter()
            .map(|n| n.as_ref().to_lowercase())
            .collect();
        self
    }

    fn read_active_manifest(path: &Path) -> BTreeSet<String> {
        let Ok(contents) = fs::read_to_string(path) else {
            return BTreeSet::new();
        };

        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect()
    }
}

impl InstalledState for DirState {
    fn file_exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.contains(&name.to_lowercase())
    }

    fn checksum(&self, name: &str) -> Option<u32> {
        let bytes = fs::read(self.root.join(name)).ok()?;
        Some(crc32c::crc32c(&bytes))
    }

    fn version(&self, name: &str) -> Option<Version> {
        let sidecar = self.root.join(format!("{name}.version"));
        let contents = fs::read_to_string(sidecar).ok()?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Version::new(trimmed))
        }
    }
}

/// In-memory installed state.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    files: BTreeSet<String>,
    active: BTreeSet<String>,
    checksums: std::collections::BTreeMap<String, u32>,
    versions: std::collections::BTreeMap<String, Version>,
}

impl MemoryState {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an existing file.
    pub fn with_file(mut self, name: impl AsRef<str>) -> Self {
        self.files.insert(name.as_ref().to_lowercase());
        self
    }

    /// Record an active entity (implies the file exists).
    pub fn with_active(mut self, name: impl AsRef<str>) -> Self {
        let key = name.as_ref().to_lowercase();
        self.files.insert(key.clone());
        self.active.insert(key);
        self
    }

    /// Record a file's content checksum (implies the file exists).
    pub fn with_checksum(mut self, name: impl AsRef<str>, checksum: u32) -> Self {
        let key = name.as_ref().to_lowercase();
        self.files.insert(key.clone());
        self.checksums.insert(key, checksum);
        self
    }

    /// Record a file's version (implies the file exists).
    pub fn with_version(mut self, name: impl AsRef<str>, version: impl Into<String>) -> Self {
        let key = name.as_ref().to_lowercase();
        self.files.insert(key.clone());
        self.versions.insert(key, Version::new(version.into()));
        self
    }
}

impl InstalledState for MemoryState {
    fn file_exists(&self, name: &str) -> bool {
        self.files.contains(&name.to_lowercase())
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.contains(&name.to_lowercase())
    }

    fn checksum(&self, name: &str) -> Option<u32> {
        self.checksums.get(&name.to_lowercase()).copied()
    }

    fn version(&self, name: &str) -> Option<Version> {
        self.versions.get(&name.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dir_state_reads_files_and_checksums() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.esp"), b"payload").unwrap();

        let state = DirState::new(temp.path());
        assert!(state.file_exists("a.esp"));
        assert!(!state.file_exists("b.esp"));
        assert_eq!(state.checksum("a.esp"), Some(crc32c::crc32c(b"payload")));
        assert_eq!(state.checksum("b.esp"), None);
    }

    #[test]
    fn dir_state_reads_active_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("active.txt"),
            "# comment\nFoo.esp\n\nBar.esp\n",
        )
        .unwrap();

        let state = DirState::new(temp.path());
        assert!(state.is_active("foo.esp"));
        assert!(state.is_active("BAR.ESP"));
        assert!(!state.is_active("baz.esp"));
    }

    #[test]
    fn dir_state_reads_version_sidecar() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.esp.version"), "1.4.2\n").unwrap();

        let state = DirState::new(temp.path());
        assert_eq!(state.version("a.esp"), Some(Version::new("1.4.2")));
        assert_eq!(state.version("b.esp"), None);
    }

    #[test]
    fn memory_state_is_case_insensitive() {
        let state = MemoryState::new()
            .with_active("Foo.esp")
            .with_checksum("Bar.esp", 42);

        assert!(state.file_exists("FOO.ESP"));
        assert!(state.is_active("foo.esp"));
        assert_eq!(state.checksum("bar.ESP"), Some(42));
    }
}
