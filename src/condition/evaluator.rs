//! condition::evaluator
//!
//! Evaluates condition expressions and filters metadata records.
//!
//! # Caching
//!
//! Whole-expression results are memoized by expression string; file
//! existence, checksums, and versions are memoized as individual facts. The
//! evaluator never invalidates on its own; cache freshness is the
//! caller's decision.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use metalist::condition::{ConditionCache, ConditionEvaluator, MemoryState};
//!
//! let state = Arc::new(MemoryState::new().with_file("Foo.esp"));
//! let evaluator = ConditionEvaluator::new(state, ConditionCache::shared());
//!
//! assert!(evaluator.evaluate(Some("file(\"Foo.esp\")")).unwrap());
//! assert!(!evaluator.evaluate(Some("file(\"Bar.esp\")")).unwrap());
//! assert!(evaluator.evaluate(None).unwrap()); // no condition always applies
//! ```

use std::sync::{Arc, MutexGuard};

use thiserror::Error;

use super::cache::{ConditionCache, SharedConditionCache};
use super::parser::{self, Expr};
use super::state::InstalledState;
use crate::core::metadata::schema::EntityMetadata;
use crate::core::types::Version;

/// Errors from condition evaluation.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The expression does not match the condition grammar.
    #[error("invalid condition '{expression}': {message}")]
    Syntax { expression: String, message: String },
}

/// Evaluates conditions against an installed-state snapshot.
///
/// Holds non-owning handles to the shared cache and the state source; it
/// owns neither and several evaluators may share both.
pub struct ConditionEvaluator {
    state: Arc<dyn InstalledState>,
    cache: SharedConditionCache,
}

impl ConditionEvaluator {
    /// Create an evaluator over `state`, memoizing into `cache`.
    pub fn new(state: Arc<dyn InstalledState>, cache: SharedConditionCache) -> Self {
        Self { state, cache }
    }

    /// A handle to the shared cache.
    pub fn cache_handle(&self) -> SharedConditionCache {
        Arc::clone(&self.cache)
    }

    /// Drop every cached result and fact.
    pub fn invalidate_cache(&self) {
        self.lock_cache().invalidate();
    }

    /// Evaluate a condition expression.
    ///
    /// `None` and blank expressions are vacuously true. Results are
    /// memoized by expression string.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::Syntax`] if the expression fails to parse.
    pub fn evaluate(&self, condition: Option<&str>) -> Result<bool, ConditionError> {
        let Some(expression) = condition else {
            return Ok(true);
        };
        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(true);
        }

        let mut cache = self.lock_cache();
        if let Some(hit) = cache.condition(expression) {
            return Ok(hit);
        }

        let ast = parser::parse(expression).map_err(|e| ConditionError::Syntax {
            expression: expression.to_string(),
            message: e.to_string(),
        })?;

        let result = self.eval(&ast, &mut cache);
        cache.store_condition(expression, result);
        log::trace!("evaluated condition '{expression}' -> {result}");
        Ok(result)
    }

    /// Filter a record down to the parts that apply right now.
    ///
    /// A false entity-level condition suppresses the whole record, leaving
    /// only the name. Otherwise each tag, message, and file reference with
    /// a false condition is dropped, and each dirty record is kept only
    /// when the installed file's checksum equals the record's identity
    /// checksum.
    pub fn evaluate_all(
        &self,
        metadata: EntityMetadata,
    ) -> Result<EntityMetadata, ConditionError> {
        if !self.evaluate(metadata.condition.as_deref())? {
            return Ok(EntityMetadata::new(metadata.name));
        }

        let mut out = EntityMetadata::new(metadata.name.clone());
        out.enabled = metadata.enabled;
        out.condition = metadata.condition;

        for tag in metadata.tags {
            if self.evaluate(tag.condition.as_deref())? {
                out.tags.insert(tag);
            }
        }

        for message in metadata.messages {
            if self.evaluate(message.condition.as_deref())? {
                out.messages.push(message);
            }
        }

        let installed = {
            let mut cache = self.lock_cache();
            let name = metadata.name.as_str();
            cache.checksum(name, || self.state.checksum(name))
        };
        for info in metadata.dirty {
            if installed == Some(info.checksum) {
                out.dirty.push(info);
            }
        }

        for file in metadata.requirements {
            if self.evaluate(file.condition.as_deref())? {
                out.requirements.insert(file);
            }
        }

        for file in metadata.incompatibilities {
            if self.evaluate(file.condition.as_deref())? {
                out.incompatibilities.insert(file);
            }
        }

        Ok(out)
    }

    fn eval(&self, expr: &Expr, cache: &mut ConditionCache) -> bool {
        match expr {
            Expr::File(name) => cache.file_exists(name, || self.state.file_exists(name)),
            Expr::Active(name) => self.state.is_active(name),
            Expr::Checksum(name, wanted) => {
                cache.checksum(name, || self.state.checksum(name)) == Some(*wanted)
            }
            Expr::Version(name, wanted, cmp) => {
                match cache.version(name, || self.state.version(name)) {
                    Some(installed) => cmp.compare(&installed, &Version::new(wanted.clone())),
                    // A file without a known version satisfies no comparison.
                    None => false,
                }
            }
            Expr::Not(inner) => !self.eval(inner, cache),
            Expr::And(lhs, rhs) => self.eval(lhs, cache) && self.eval(rhs, cache),
            Expr::Or(lhs, rhs) => self.eval(lhs, cache) || self.eval(rhs, cache),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, ConditionCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
