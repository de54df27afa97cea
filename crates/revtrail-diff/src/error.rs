//! Error types for the diff crate.

use revtrail_tree::TreeError;
use revtrail_types::Revision;

/// Errors that can occur during diff operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The requested range runs backwards.
    #[error("invalid range: {v1} is later than {v2}")]
    InvalidRange { v1: Revision, v2: Revision },

    /// A change command referenced a state with no assigned identity.
    #[error("missing identity for state {name:?} while replaying {revision}")]
    MissingIdentity {
        /// The state name the command referenced.
        name: String,
        /// The revision whose change list contained the command.
        revision: Revision,
    },

    /// Version tree query failed.
    #[error("version tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
