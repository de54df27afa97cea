//! Error types for the comparison service.

use std::time::Duration;

use revtrail_diff::DiffError;
use revtrail_tree::TreeError;
use revtrail_types::Revision;

/// Errors raised by a [`SnapshotSource`](crate::SnapshotSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// No snapshot is available for the revision.
    #[error("no snapshot for {0}")]
    SnapshotNotFound(Revision),

    /// The history or a snapshot could not be read.
    #[error("read error: {0}")]
    Io(String),

    /// The payload was not valid.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Convenience alias for source results.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while comparing versions.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    /// A fetch did not complete within the configured limit.
    #[error("fetching {what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },

    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias for comparison results.
pub type CompareResult<T> = Result<T, CompareError>;
