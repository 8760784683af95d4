//! remote
//!
//! Abstraction for masterlist distribution.
//!
//! # Architecture
//!
//! Masterlists are distributed as files tracked in git repositories. This
//! module is the **only doorway** to git: no other module imports `git2`.
//! The [`RemoteSync`] trait keeps the store independent of the transport;
//! [`GitRemote`] is the production implementation and [`mock::MockRemote`]
//! provides deterministic behavior for tests.
//!
//! # Responsibilities
//!
//! - Fetch a branch and check out the tracked list file
//! - Report whether an update changed the file
//! - Describe the checked-out revision (id, date, local modification)

pub mod git;
pub mod mock;
mod traits;

pub use git::GitRemote;
pub use mock::{FailOn, MockOperation, MockRemote};
pub use traits::{RemoteError, RemoteSync, RevisionInfo};
