//! Metalist - a layered plugin-metadata store with conditional filtering
//!
//! Metalist maintains two tiers of metadata about named plugins: an
//! authoritative, externally-distributed masterlist and a locally edited
//! userlist. Queries overlay the userlist on the masterlist and, on request,
//! filter the result through boolean conditions evaluated against the
//! installed state of a target directory.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the store)
//! - [`core`] - Domain types, config, metadata schema, lists, and the store
//! - [`condition`] - Condition cache, expression parser, and evaluator
//! - [`remote`] - Abstraction for masterlist distribution (git v1)
//! - [`export`] - Minimal-list projection for third-party consumers
//! - [`ui`] - Output formatting utilities
//!
//! # Correctness Invariants
//!
//! Metalist maintains the following invariants:
//!
//! 1. A list holds at most one metadata record per case-insensitive name
//! 2. Loading either fully succeeds or leaves prior content untouched
//! 3. Mutations target the userlist only; the masterlist is replaced wholesale
//! 4. Condition results are cached until the caller explicitly invalidates

pub mod cli;
pub mod condition;
pub mod core;
pub mod export;
pub mod remote;
pub mod ui;
