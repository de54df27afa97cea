//! Version tree for revtrail.
//!
//! Reconstructs a parent-pointer tree from a linear commit log. Ordinary
//! commits hang off the preceding revision; revert commits hang off the
//! revision they restore. Supports ancestor paths, lowest-common-ancestor
//! queries, and per-revision change lists.

pub mod error;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use tree::{ParentMap, VersionTree};
