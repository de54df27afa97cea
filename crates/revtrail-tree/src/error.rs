//! Error types for the version tree.

use revtrail_types::Revision;

/// Errors that can occur while building or querying a version tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A query arrived before any history was loaded.
    #[error("version tree is not initialized")]
    Uninitialized,

    /// A path walk reached a revision with no parent pointer.
    #[error("broken version tree: no parent pointer for {revision}")]
    BrokenTree {
        /// The revision whose parent is missing.
        revision: Revision,
    },

    /// The revision is not part of the tree.
    #[error("unknown revision: {0}")]
    UnknownRevision(Revision),

    /// Revision 1 predates every commit and has no change list.
    #[error("the root revision has no change list")]
    RootHasNoChangeList,

    /// Commit records are not a contiguous run starting at revision 2.
    #[error("non-contiguous history: expected {expected}, found {found}")]
    NonContiguousHistory {
        /// The revision that should have come next.
        expected: Revision,
        /// The revision actually found.
        found: Revision,
    },

    /// A revert commit carries no revert marker.
    #[error("revert commit {0} has no revert marker")]
    MissingRevertMarker(Revision),

    /// A revert marker points at the reverting revision or a later one.
    #[error("revert commit {revision} targets {target}, which is not an earlier revision")]
    InvalidRevertTarget {
        /// The revert commit.
        revision: Revision,
        /// Its target.
        target: Revision,
    },

    /// `ancestor` is not on the path from `descendant` to the root.
    #[error("{ancestor} is not an ancestor of {descendant}")]
    NotAncestor {
        ancestor: Revision,
        descendant: Revision,
    },
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
