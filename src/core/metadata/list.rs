//! core::metadata::list
//!
//! Ordered entity lists with YAML load and save.
//!
//! # Document Format
//!
//! A list file is a YAML document with three optional top-level keys:
//!
//! ```yaml
//! tags:        # known tag vocabulary
//!   - Relev
//! globals:     # list-level messages, not tied to any entity
//!   - severity: say
//!     text: Masterlist for example game.
//! plugins:     # one record per entity
//!   - name: Foo.esp
//!     tags: [Relev]
//! ```
//!
//! # Load Atomicity
//!
//! [`MetadataList::load`] parses into a fresh document and swaps it in only
//! after parsing and validation succeed. A malformed file never corrupts
//! in-memory content.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::{EntityMetadata, Message};
use crate::core::types::EntityName;

/// Errors from list load and save operations.
#[derive(Debug, Error)]
pub enum ListError {
    /// A required source path is absent.
    #[error("list file not found: {path}")]
    NotFound { path: PathBuf },

    /// Source content failed to parse; in-memory state is unchanged.
    #[error("malformed list file '{path}': {message}")]
    Malformed { path: PathBuf, message: String },

    /// Filesystem read or write failure.
    #[error("failed to access list file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Wire form of a list file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListDocument {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    globals: Vec<Message>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<EntityMetadata>,
}

/// An ordered collection of entity records plus list-level data.
///
/// Entity names are unique case-insensitively within one list. Order is
/// preserved for deterministic output; it carries no semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataList {
    entities: Vec<EntityMetadata>,
    vocabulary: BTreeSet<String>,
    globals: Vec<Message>,
}

impl MetadataList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load list content from `path`, replacing current content.
    ///
    /// Parsing happens into a temporary document; on any failure this list
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`ListError::NotFound`] if `path` does not exist
    /// - [`ListError::Io`] if the file cannot be read
    /// - [`ListError::Malformed`] if the content fails to parse or contains
    ///   duplicate entity names
    pub fn load(&mut self, path: &Path) -> Result<(), ListError> {
        if !path.exists() {
            return Err(ListError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| ListError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An empty or comment-only file is a valid empty list.
        let document = if contents.trim().is_empty() {
            ListDocument::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ListError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Self::check_unique_names(&document.plugins, path)?;

        self.entities = document.plugins;
        self.vocabulary = document.tags;
        self.globals = document.globals;

        log::debug!(
            "loaded {} entity records from {}",
            self.entities.len(),
            path.display()
        );

        Ok(())
    }

    fn check_unique_names(entities: &[EntityMetadata], path: &Path) -> Result<(), ListError> {
        let mut seen = BTreeSet::new();
        for entity in entities {
            if !seen.insert(entity.name.normalized()) {
                return Err(ListError::Malformed {
                    path: path.to_path_buf(),
                    message: format!("duplicate entity name '{}'", entity.name),
                });
            }
        }
        Ok(())
    }

    /// Serialize current content to `path`.
    ///
    /// Always overwrites; existence and overwrite policy belong to the
    /// caller. Writes via a temp file in the same directory, then renames.
    pub fn save(&self, path: &Path) -> Result<(), ListError> {
        let document = ListDocument {
            tags: self.vocabulary.clone(),
            globals: self.globals.clone(),
            plugins: self.entities.clone(),
        };

        let contents = serde_yaml::to_string(&document).map_err(|e| ListError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let io_err = |e: std::io::Error| ListError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let temp_path = path.with_extension("yaml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;

        Ok(())
    }

    /// Case-insensitive lookup.
    ///
    /// Absence is a valid result: an unknown name yields an empty record
    /// carrying that name. Lookup never fails.
    pub fn find(&self, name: &EntityName) -> EntityMetadata {
        self.entities
            .iter()
            .find(|e| e.name.matches(&name.normalized()))
            .cloned()
            .unwrap_or_else(|| EntityMetadata::new(name.clone()))
    }

    /// True when the list holds a record for `name`.
    pub fn contains(&self, name: &EntityName) -> bool {
        self.entities
            .iter()
            .any(|e| e.name.matches(&name.normalized()))
    }

    /// Last-write-wins insert: replaces an existing same-name record in
    /// place, preserving its position; appends otherwise.
    ///
    /// Callers needing strict set-or-replace semantics use
    /// [`MetadataList::replace`].
    pub fn upsert(&mut self, metadata: EntityMetadata) {
        match self
            .entities
            .iter_mut()
            .find(|e| e.name.matches(&metadata.name.normalized()))
        {
            Some(slot) => *slot = metadata,
            None => self.entities.push(metadata),
        }
    }

    /// Strict set-or-replace: erase any same-name record, then append.
    pub fn replace(&mut self, metadata: EntityMetadata) {
        self.erase(&metadata.name);
        self.entities.push(metadata);
    }

    /// Remove the record for `name`, if any. Returns whether one existed.
    pub fn erase(&mut self, name: &EntityName) -> bool {
        let before = self.entities.len();
        self.entities
            .retain(|e| !e.name.matches(&name.normalized()));
        self.entities.len() != before
    }

    /// Remove all records, the vocabulary, and list-level messages.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.vocabulary.clear();
        self.globals.clear();
    }

    /// All entity records, in list order.
    pub fn entities(&self) -> &[EntityMetadata] {
        &self.entities
    }

    /// The declared tag vocabulary.
    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    /// Add a tag to the declared vocabulary.
    pub fn insert_known_tag(&mut self, tag: impl Into<String>) {
        self.vocabulary.insert(tag.into());
    }

    /// List-level messages, in list order.
    pub fn global_messages(&self) -> &[Message] {
        &self.globals
    }

    /// Append a list-level message.
    pub fn push_global(&mut self, message: Message) {
        self.globals.push(message);
    }

    /// The declared vocabulary plus every tag name used by a directive,
    /// deduplicated, in deterministic order.
    pub fn known_tags(&self) -> BTreeSet<String> {
        let mut tags = self.vocabulary.clone();
        for entity in &self.entities {
            tags.extend(entity.tag_names().map(str::to_string));
        }
        tags
    }

    /// List-level messages followed by per-entity messages, order and
    /// duplicates preserved.
    pub fn all_messages(&self) -> Vec<Message> {
        let mut messages = self.globals.clone();
        for entity in &self.entities {
            messages.extend(entity.messages.iter().cloned());
        }
        messages
    }

    /// True when the list holds no entities, vocabulary, or messages.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.vocabulary.is_empty() && self.globals.is_empty()
    }
}
