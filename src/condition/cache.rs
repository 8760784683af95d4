//! condition::cache
//!
//! Explicit memoization context for condition evaluation.
//!
//! # Lifecycle
//!
//! The cache is populated lazily as expressions and installed-state facts
//! are first consulted, and invalidated only as a whole: when the caller
//! knows the underlying directory changed, it calls
//! [`ConditionCache::invalidate`] and every entry is dropped. There is no
//! partial invalidation.
//!
//! # Sharing
//!
//! The cache is shared between the store and the evaluator as
//! [`SharedConditionCache`]. Invalidation is a global barrier: results are
//! only deterministic if no evaluation is in flight when it happens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::types::Version;

/// Shared handle to a [`ConditionCache`].
pub type SharedConditionCache = Arc<Mutex<ConditionCache>>;

/// Cached condition results and installed-state facts.
#[derive(Debug, Default)]
pub struct ConditionCache {
    conditions: HashMap<String, bool>,
    file_exists: HashMap<String, bool>,
    checksums: HashMap<String, Option<u32>>,
    versions: HashMap<String, Option<Version>>,
}

impl ConditionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache behind a shared handle.
    pub fn shared() -> SharedConditionCache {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Drop every cached entry.
    pub fn invalidate(&mut self) {
        self.conditions.clear();
        self.file_exists.clear();
        self.checksums.clear();
        self.versions.clear();
        log::debug!("condition cache invalidated");
    }

    /// Look up a previously evaluated condition.
    pub fn condition(&self, expression: &str) -> Option<bool> {
        self.conditions.get(expression).copied()
    }

    /// Record a condition result.
    pub fn store_condition(&mut self, expression: impl Into<String>, result: bool) {
        self.conditions.insert(expression.into(), result);
    }

    /// Look up or compute a file-existence fact.
    pub fn file_exists(&mut self, name: &str, compute: impl FnOnce() -> bool) -> bool {
        *self
            .file_exists
            .entry(name.to_string())
            .or_insert_with(compute)
    }

    /// Look up or compute a content checksum.
    pub fn checksum(&mut self, name: &str, compute: impl FnOnce() -> Option<u32>) -> Option<u32> {
        *self
            .checksums
            .entry(name.to_string())
            .or_insert_with(compute)
    }

    /// Look up or compute a version fact.
    pub fn version(
        &mut self,
        name: &str,
        compute: impl FnOnce() -> Option<Version>,
    ) -> Option<Version> {
        self.versions
            .entry(name.to_string())
            .or_insert_with(compute)
            .clone()
    }

    /// Number of memoized condition results.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True when no condition results are memoized.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_lookup() {
        let mut cache = ConditionCache::new();
        assert_eq!(cache.condition("file(\"a\")"), None);

        cache.store_condition("file(\"a\")", true);
        assert_eq!(cache.condition("file(\"a\")"), Some(true));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn facts_computed_once() {
        let mut cache = ConditionCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let exists = cache.file_exists("a.esp", || {
                calls += 1;
                true
            });
            assert!(exists);
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut cache = ConditionCache::new();
        cache.store_condition("x", false);
        cache.file_exists("a.esp", || true);
        cache.checksum("a.esp", || Some(7));

        cache.invalidate();

        assert!(cache.is_empty());
        let mut recomputed = false;
        cache.file_exists("a.esp", || {
            recomputed = true;
            false
        });
        assert!(recomputed);
    }
}
