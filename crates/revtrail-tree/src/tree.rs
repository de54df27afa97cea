//! The version tree structure and its traversal algorithms.
//!
//! [`VersionTree`] stores one parent pointer per revision and the change
//! list recorded by each commit. It is built once from the full commit
//! history and is read-only afterwards.
//!
//! # Invariants
//!
//! - Revision 1 is the only revision without a parent.
//! - Every other parent is a strictly earlier revision, so the parent
//!   pointers form a tree rooted at revision 1.
//! - Every revision `2..=latest` has a stored change list.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use revtrail_types::{ChangeCommand, CommitRecord, Revision};

use crate::error::{TreeError, TreeResult};

/// Revision to parent revision; `None` marks the root.
pub type ParentMap = BTreeMap<Revision, Option<Revision>>;

/// A parent-pointer tree over revision numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionTree {
    /// Parent pointer for every known revision.
    parents: ParentMap,
    /// Change list recorded by each commit (revision 1 has none).
    change_lists: BTreeMap<Revision, Vec<ChangeCommand>>,
    /// Highest revision in the tree.
    latest: Revision,
}

impl Default for VersionTree {
    fn default() -> Self {
        Self::root_only()
    }
}

impl VersionTree {
    /// A tree holding only the root revision.
    pub fn root_only() -> Self {
        let mut parents = ParentMap::new();
        parents.insert(Revision::ROOT, None);
        Self {
            parents,
            change_lists: BTreeMap::new(),
            latest: Revision::ROOT,
        }
    }

    /// Build the tree from commit records for revisions `2..=N`, in order.
    ///
    /// A leading record for revision 1 is accepted and ignored. Revert
    /// commits take the target of their revert marker as parent; every
    /// other commit takes the preceding revision.
    pub fn build<I>(records: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = CommitRecord>,
    {
        let mut tree = Self::root_only();

        for record in records {
            let revision = record.version_number;
            if revision.is_root() && tree.latest.is_root() {
                trace!("skipping root commit record");
                continue;
            }

            let expected = tree.latest.next();
            if revision != expected {
                return Err(TreeError::NonContiguousHistory {
                    expected,
                    found: revision,
                });
            }

            let parent = if record.commit_type.is_revert() {
                let target = record
                    .revert_target()
                    .ok_or(TreeError::MissingRevertMarker(revision))?;
                if target >= revision {
                    return Err(TreeError::InvalidRevertTarget { revision, target });
                }
                debug!(%revision, %target, "revert commit re-parented");
                target
            } else {
                tree.latest
            };

            tree.parents.insert(revision, Some(parent));
            tree.change_lists.insert(revision, record.commit_cmds);
            tree.latest = revision;
        }

        debug!(latest = %tree.latest, "built version tree");
        Ok(tree)
    }

    /// The highest revision in the tree.
    pub fn latest(&self) -> Revision {
        self.latest
    }

    /// Number of revisions, including the root.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Always `false`: the root revision is always present.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if the revision is part of the tree.
    pub fn contains(&self, revision: Revision) -> bool {
        self.parents.contains_key(&revision)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The full parent map.
    pub fn parent_map(&self) -> &ParentMap {
        &self.parents
    }

    /// The parent of a revision (`None` for the root).
    pub fn parent(&self, revision: Revision) -> TreeResult<Option<Revision>> {
        self.parents
            .get(&revision)
            .copied()
            .ok_or(TreeError::UnknownRevision(revision))
    }

    /// An independent copy of the change list recorded by `revision`.
    pub fn change_list(&self, revision: Revision) -> TreeResult<Vec<ChangeCommand>> {
        if revision.is_root() {
            return Err(TreeError::RootHasNoChangeList);
        }
        self.change_lists
            .get(&revision)
            .cloned()
            .ok_or(TreeError::UnknownRevision(revision))
    }

    // ---------------------------------------------------------------
    // Path queries
    // ---------------------------------------------------------------

    /// The path from the root down to `revision`, both ends included.
    pub fn path_from_root(&self, revision: Revision) -> TreeResult<Vec<Revision>> {
        let mut path = Vec::new();
        let mut current = Some(revision);

        while let Some(rev) = current {
            path.push(rev);
            current = *self
                .parents
                .get(&rev)
                .ok_or(TreeError::BrokenTree { revision: rev })?;
        }

        path.reverse();
        Ok(path)
    }

    /// Revisions strictly below `ancestor` on the way up from `descendant`,
    /// ordered leaf first. Empty when the two are equal.
    pub fn ancestry_path(
        &self,
        ancestor: Revision,
        descendant: Revision,
    ) -> TreeResult<Vec<Revision>> {
        let mut path = Vec::new();
        let mut current = descendant;

        while current != ancestor {
            path.push(current);
            current = self
                .parents
                .get(&current)
                .copied()
                .ok_or(TreeError::BrokenTree { revision: current })?
                .ok_or(TreeError::NotAncestor {
                    ancestor,
                    descendant,
                })?;
        }

        Ok(path)
    }

    /// Returns `true` if `ancestor` lies on the root path of `descendant`.
    /// A revision is its own ancestor.
    pub fn is_ancestor(&self, ancestor: Revision, descendant: Revision) -> TreeResult<bool> {
        Ok(self.path_from_root(descendant)?.contains(&ancestor))
    }

    /// Number of edges between the root and `revision`.
    pub fn depth(&self, revision: Revision) -> TreeResult<usize> {
        Ok(self.path_from_root(revision)?.len() - 1)
    }

    // ---------------------------------------------------------------
    // Common ancestor
    // ---------------------------------------------------------------

    /// Find the lowest common ancestor of two revisions.
    ///
    /// Builds both root paths and returns the deepest index at which they
    /// agree. When one revision is an ancestor of the other, that is the
    /// last entry of the shorter path.
    pub fn find_lca(&self, v1: Revision, v2: Revision) -> TreeResult<Revision> {
        let path1 = self.path_from_root(v1)?;
        let path2 = self.path_from_root(v2)?;

        let shared = path1.len().min(path2.len());
        let lca = (0..shared)
            .rev()
            .find(|&i| path1[i] == path2[i])
            .map(|i| path1[i])
            .ok_or(TreeError::BrokenTree {
                revision: Revision::ROOT,
            })?;

        trace!(%v1, %v2, %lca, "found lowest common ancestor");
        Ok(lca)
    }
}
