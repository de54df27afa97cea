//! Version comparison service for revtrail.
//!
//! Loads the commit history once from a [`SnapshotSource`], then answers
//! comparison requests by fetching both full snapshots concurrently and
//! running the state and link diffs over them.

pub mod comparer;
pub mod config;
pub mod error;
pub mod fs;
pub mod source;

pub use comparer::{VersionComparer, VersionComparison};
pub use config::CompareConfig;
pub use error::{CompareError, CompareResult, SourceError, SourceResult};
pub use fs::DirectorySource;
pub use source::{InMemorySource, SnapshotSource};
