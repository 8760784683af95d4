//! condition
//!
//! Condition cache, expression parser, and evaluator.
//!
//! # Design
//!
//! Conditions are boolean expressions over the installed state of a target
//! directory: file existence, active entities, content checksums, and
//! version comparisons. Evaluation results are memoized in a
//! [`cache::ConditionCache`] that the caller owns and invalidates
//! explicitly; nothing here is hidden global state.
//!
//! # Components
//!
//! - [`cache`] - Explicit, caller-invalidated memoization context
//! - [`parser`] - `nom` grammar for condition expressions
//! - [`state`] - Installed-state snapshot trait and implementations
//! - [`evaluator`] - Evaluates expressions and filters metadata records
//!
//! # Invalidation
//!
//! The cache is only ever cleared in full. Any caller that knows the
//! underlying directory changed must invalidate before the next evaluation;
//! no concurrent evaluation should be in flight when that happens.

pub mod cache;
pub mod evaluator;
pub mod parser;
pub mod state;

pub use cache::{ConditionCache, SharedConditionCache};
pub use evaluator::{ConditionError, ConditionEvaluator};
pub use parser::{Comparator, Expr};
pub use state::{DirState, InstalledState, MemoryState};
