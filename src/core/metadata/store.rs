//! core::metadata::store
//!
//! The two-tier masterlist/userlist store.
//!
//! # Architecture
//!
//! A `MetadataStore` owns exactly two [`MetadataList`]s. The masterlist is
//! authoritative and replaced wholesale on load or update; the userlist is
//! the user's override layer, replaced on load and mutated one record at a
//! time otherwise. Queries merge userlist records onto masterlist records
//! and optionally filter the result through the condition evaluator.
//!
//! # Atomicity
//!
//! Multi-list loading goes through temporaries: the store's lists are
//! swapped only after every load succeeds, so a failed call leaves the
//! store in its prior, consistent state.
//!
//! # Concurrency
//!
//! All operations are synchronous and the store performs no internal
//! locking. Hosts embedding a store in a multi-threaded context must
//! serialize access; the shared condition cache additionally makes
//! invalidation a global barrier (see [`crate::condition`]).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::list::{ListError, MetadataList};
use super::schema::{EntityMetadata, Message};
use crate::condition::{ConditionError, ConditionEvaluator};
use crate::core::types::EntityName;
use crate::remote::{RemoteError, RemoteSync, RevisionInfo};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path exists when it must not, or is required and absent.
    #[error("file access error at '{path}': {reason}")]
    FileAccess { path: PathBuf, reason: String },

    /// A caller-supplied path is structurally unusable.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// List load or save failure.
    #[error(transparent)]
    List(#[from] ListError),

    /// Condition evaluation failure.
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// Distribution backend failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// The two-tier metadata store.
pub struct MetadataStore {
    masterlist: MetadataList,
    userlist: MetadataList,
    evaluator: ConditionEvaluator,
}

impl MetadataStore {
    /// Create an empty store evaluating conditions with `evaluator`.
    pub fn new(evaluator: ConditionEvaluator) -> Self {
        Self {
            masterlist: MetadataList::new(),
            userlist: MetadataList::new(),
            evaluator,
        }
    }

    /// The authoritative list.
    pub fn masterlist(&self) -> &MetadataList {
        &self.masterlist
    }

    /// The override list.
    pub fn userlist(&self) -> &MetadataList {
        &self.userlist
    }

    /// The condition evaluator this store filters with.
    pub fn evaluator(&self) -> &ConditionEvaluator {
        &self.evaluator
    }

    /// Load both lists, replacing current content.
    ///
    /// A `None` path skips that tier, leaving it empty. Loading happens
    /// into temporaries; the store's lists are replaced only after both
    /// loads succeed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::FileAccess`] naming any given path that does not exist
    /// - [`StoreError::List`] if a file exists but fails to parse
    pub fn load_lists(
        &mut self,
        masterlist_path: Option<&Path>,
        userlist_path: Option<&Path>,
    ) -> Result<(), StoreError> {
        let mut master_temp = MetadataList::new();
        let mut user_temp = MetadataList::new();

        if let Some(path) = masterlist_path {
            require_exists(path, "masterlist")?;
            master_temp.load(path)?;
        }

        if let Some(path) = userlist_path {
            require_exists(path, "userlist")?;
            user_temp.load(path)?;
        }

        self.masterlist = master_temp;
        self.userlist = user_temp;
        Ok(())
    }

    /// Serialize the userlist to `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidArgument`] if `path`'s parent directory is absent
    /// - [`StoreError::FileAccess`] if `path` exists and `overwrite` is false
    pub fn write_userlist(&self, path: &Path, overwrite: bool) -> Result<(), StoreError> {
        check_writable(path, overwrite)?;
        self.userlist.save(path)?;
        Ok(())
    }

    /// Update the masterlist file at `path` via `remote` and, when it
    /// changed, reload the authoritative list from it.
    ///
    /// Returns whether an update occurred. On `false` the store is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidArgument`] if `path` has no valid parent directory
    /// - [`StoreError::Remote`] if the backend fails
    /// - [`StoreError::List`] if the updated file fails to parse (the
    ///   in-memory masterlist is left as it was)
    pub fn update_masterlist(
        &mut self,
        path: &Path,
        remote: &dyn RemoteSync,
        url: &str,
        branch: &str,
    ) -> Result<bool, StoreError> {
        let parent_ok = path
            .parent()
            .map(|p| p.as_os_str().is_empty() || p.is_dir())
            .unwrap_or(false);
        if !parent_ok {
            return Err(StoreError::InvalidArgument {
                message: format!(
                    "masterlist path '{}' does not have a valid parent directory",
                    path.display()
                ),
            });
        }

        if remote.update(path, url, branch)? {
            let mut temp = MetadataList::new();
            temp.load(path)?;
            self.masterlist = temp;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Describe the revision the masterlist at `path` was checked out from.
    pub fn masterlist_revision(
        &self,
        path: &Path,
        remote: &dyn RemoteSync,
        short: bool,
    ) -> Result<RevisionInfo, StoreError> {
        Ok(remote.get_info(path, short)?)
    }

    /// Is the masterlist at `path` at the tip of `branch`?
    pub fn is_latest_masterlist(
        &self,
        path: &Path,
        remote: &dyn RemoteSync,
        branch: &str,
    ) -> Result<bool, StoreError> {
        Ok(remote.is_latest(path, branch)?)
    }

    /// Union of both tiers' tag vocabularies and directive names.
    pub fn known_tags(&self) -> BTreeSet<String> {
        let mut tags = self.masterlist.known_tags();
        let user_tags = self.userlist.known_tags();
        if !user_tags.is_empty() {
            tags.extend(user_tags);
        }
        tags
    }

    /// List-level messages: masterlist first, then userlist.
    ///
    /// When `evaluate_conditions` is set, the condition cache is fully
    /// invalidated first (results reflect the installed state as of this
    /// call) and messages whose condition is false are dropped, preserving
    /// relative order.
    pub fn general_messages(
        &self,
        evaluate_conditions: bool,
    ) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.masterlist.global_messages().to_vec();
        let user_messages = self.userlist.global_messages();
        if !user_messages.is_empty() {
            messages.extend_from_slice(user_messages);
        }

        if evaluate_conditions {
            // Evaluate from scratch.
            self.evaluator.invalidate_cache();
            let mut filtered = Vec::with_capacity(messages.len());
            for message in messages {
                if self.evaluator.evaluate(message.condition.as_deref())? {
                    filtered.push(message);
                }
            }
            return Ok(filtered);
        }

        Ok(messages)
    }

    /// Effective metadata for `name`.
    ///
    /// Starts from the masterlist record (empty if unknown; absence is
    /// not an error). With `include_userlist`, the userlist record is
    /// merged on top. With `evaluate_conditions`, inapplicable parts are
    /// dropped against the current cache state; no invalidation happens
    /// here, cache freshness is the caller's decision.
    pub fn resolve(
        &self,
        name: &EntityName,
        include_userlist: bool,
        evaluate_conditions: bool,
    ) -> Result<EntityMetadata, StoreError> {
        let mut metadata = self.masterlist.find(name);

        if include_userlist {
            metadata.merge(self.userlist.find(name));
        }

        if evaluate_conditions {
            metadata = self.evaluator.evaluate_all(metadata)?;
        }

        Ok(metadata)
    }

    /// Exactly what the user has customized for `name`, independent of
    /// authoritative content.
    pub fn resolve_userlist_only(
        &self,
        name: &EntityName,
        evaluate_conditions: bool,
    ) -> Result<EntityMetadata, StoreError> {
        let metadata = self.userlist.find(name);

        if evaluate_conditions {
            return Ok(self.evaluator.evaluate_all(metadata)?);
        }

        Ok(metadata)
    }

    /// Set the userlist record for `metadata`'s name, replacing any
    /// existing record. Guarantees exactly one entry per name.
    pub fn set_user_metadata(&mut self, metadata: EntityMetadata) {
        self.userlist.replace(metadata);
    }

    /// Remove the userlist record for `name`. Returns whether one existed.
    pub fn discard_user_metadata(&mut self, name: &EntityName) -> bool {
        self.userlist.erase(name)
    }

    /// Remove every userlist record, the vocabulary, and its messages.
    /// The masterlist is never affected.
    pub fn discard_all_user_metadata(&mut self) {
        self.userlist.clear();
    }
}

fn require_exists(path: &Path, tier: &str) -> Result<(), StoreError> {
    if path.exists() {
        Ok(())
    } else {
        Err(StoreError::FileAccess {
            path: path.to_path_buf(),
            reason: format!("the given {tier} path does not exist"),
        })
    }
}

/// Shared precondition for caller-policy writes: the parent directory must
/// exist, and an existing target is only replaced when `overwrite` is set.
pub(crate) fn check_writable(path: &Path, overwrite: bool) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        // An empty parent means the current directory.
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(StoreError::InvalidArgument {
                message: format!("output directory '{}' does not exist", parent.display()),
            });
        }
    }

    if path.exists() && !overwrite {
        return Err(StoreError::FileAccess {
            path: path.to_path_buf(),
            reason: "output file exists but overwrite is not set".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::condition::{ConditionCache, MemoryState};
    use crate::core::metadata::schema::Tag;
    use crate::remote::MockRemote;

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    fn store_with_state(state: MemoryState) -> MetadataStore {
        let evaluator = ConditionEvaluator::new(Arc::new(state), ConditionCache::shared());
        MetadataStore::new(evaluator)
    }

    fn empty_store() -> MetadataStore {
        store_with_state(MemoryState::new())
    }

    fn write_masterlist(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("masterlist.yaml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    const MASTER: &str = "\
tags:
  - Relev
globals:
  - severity: say
    text: general note
plugins:
  - name: Foo.esp
    tags: [Relev]
";

    #[test]
    fn load_lists_missing_userlist_names_path_and_keeps_state() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();

        let missing = temp.path().join("missing-user.yaml");
        let err = store
            .load_lists(Some(&master), Some(&missing))
            .unwrap_err();

        match err {
            StoreError::FileAccess { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }

        // Prior content survives the failed call.
        assert!(store.known_tags().contains("Relev"));
    }

    #[test]
    fn load_lists_none_clears_tier() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();
        store.load_lists(None, None).unwrap();

        assert!(store.masterlist().is_empty());
    }

    #[test]
    fn resolve_merges_userlist_on_top() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.tags.insert(Tag::remove("Relev"));
        store.set_user_metadata(user);

        let merged = store.resolve(&name("Foo.esp"), true, false).unwrap();
        assert_eq!(merged.tags.len(), 2);

        let without = store.resolve(&name("Foo.esp"), false, false).unwrap();
        assert_eq!(without.tags.len(), 1);
    }

    #[test]
    fn resolve_unknown_entity_is_empty_not_error() {
        let store = empty_store();
        let resolved = store.resolve(&name("Nope.esp"), true, false).unwrap();
        assert!(resolved.has_name_only());
    }

    #[test]
    fn set_user_metadata_is_strict_replace() {
        let mut store = empty_store();

        let mut first = EntityMetadata::new(name("Foo.esp"));
        first.tags.insert(Tag::add("A"));
        store.set_user_metadata(first);

        let mut second = EntityMetadata::new(name("FOO.esp"));
        second.tags.insert(Tag::add("B"));
        store.set_user_metadata(second.clone());

        assert_eq!(store.userlist().entities().len(), 1);
        let resolved = store.resolve_userlist_only(&name("foo.esp"), false).unwrap();
        assert_eq!(resolved.tags, second.tags);
    }

    #[test]
    fn discard_all_matches_empty_userlist() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();

        let mut user = EntityMetadata::new(name("Foo.esp"));
        user.messages.push(Message::warn("user note"));
        store.set_user_metadata(user);

        store.discard_all_user_metadata();

        let resolved = store.resolve(&name("Foo.esp"), true, false).unwrap();
        let baseline = store.resolve(&name("Foo.esp"), false, false).unwrap();
        assert_eq!(resolved, baseline);
    }

    #[test]
    fn known_tags_unions_both_tiers() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();

        let mut user = EntityMetadata::new(name("Bar.esp"));
        user.tags.insert(Tag::add("UserTag"));
        store.set_user_metadata(user);

        let tags = store.known_tags();
        assert!(tags.contains("Relev"));
        assert!(tags.contains("UserTag"));
    }

    #[test]
    fn general_messages_filters_and_invalidates() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(
            &temp,
            "\
globals:
  - severity: say
    text: always
  - severity: warn
    text: gated
    condition: file(\"present.esp\")
  - severity: error
    text: dropped
    condition: file(\"missing.esp\")
",
        );

        let mut store = store_with_state(MemoryState::new().with_file("present.esp"));
        store.load_lists(Some(&master), None).unwrap();

        let unfiltered = store.general_messages(false).unwrap();
        assert_eq!(unfiltered.len(), 3);

        // Seed a stale cache entry; the call must invalidate it first.
        store
            .evaluator()
            .cache_handle()
            .lock()
            .unwrap()
            .store_condition("file(\"missing.esp\")", true);

        let filtered = store.general_messages(true).unwrap();
        let texts: Vec<_> = filtered.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["always", "gated"]);
    }

    #[test]
    fn write_userlist_contract() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store();
        store.set_user_metadata(EntityMetadata::new(name("Foo.esp")));

        let missing_dir = temp.path().join("nope").join("user.yaml");
        let err = store.write_userlist(&missing_dir, false).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument { .. }));

        let path = temp.path().join("user.yaml");
        store.write_userlist(&path, false).unwrap();

        let err = store.write_userlist(&path, false).unwrap_err();
        assert!(matches!(err, StoreError::FileAccess { .. }));

        // Overwrite explicitly allowed.
        store.write_userlist(&path, true).unwrap();
    }

    #[test]
    fn update_masterlist_unchanged_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();
        let before = store.resolve(&name("Foo.esp"), true, false).unwrap();

        let remote = MockRemote::new();
        remote.queue_update(false);

        let changed = store
            .update_masterlist(&master, &remote, "url", "main")
            .unwrap();
        assert!(!changed);

        let after = store.resolve(&name("Foo.esp"), true, false).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn update_masterlist_changed_reloads() {
        let temp = TempDir::new().unwrap();
        let master = write_masterlist(&temp, MASTER);

        let mut store = empty_store();
        store.load_lists(Some(&master), None).unwrap();

        let remote = MockRemote::new();
        remote.queue_update_with_content(
            "plugins:\n  - name: Fresh.esp\n    tags: [NewTag]\n",
        );

        let changed = store
            .update_masterlist(&master, &remote, "url", "main")
            .unwrap();
        assert!(changed);

        assert!(store.known_tags().contains("NewTag"));
        let old = store.resolve(&name("Foo.esp"), true, false).unwrap();
        assert!(old.has_name_only());
    }

    #[test]
    fn update_masterlist_rejects_invalid_parent() {
        let temp = TempDir::new().unwrap();
        let mut store = empty_store();
        let remote = MockRemote::new();

        let bad = temp.path().join("nope").join("masterlist.yaml");
        let err = store
            .update_masterlist(&bad, &remote, "url", "main")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument { .. }));
        assert!(remote.operations().is_empty());
    }
}
