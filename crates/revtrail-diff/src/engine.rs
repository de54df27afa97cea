//! Structural diff of states between two revisions.
//!
//! The engine seeds one identity per state of the earlier revision, walks
//! back from it to the lowest common ancestor undoing each commit, then
//! walks forward from the ancestor to the later revision. A final pass
//! compares content so that an edit later reverted by hand does not show up
//! as a change.

use serde::{Deserialize, Serialize};
use tracing::debug;

use revtrail_tree::VersionTree;
use revtrail_types::{EntitySnapshot, Revision};

use crate::equality::deep_equal;
use crate::error::{DiffError, DiffResult};
use crate::identity::{StateDiffTable, StateStatus};
use crate::replay::{Direction, MissingIdentityPolicy, ReplayState};

/// Knobs for a state diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Handling of commands that reference a state with no identity.
    pub missing_identity: MissingIdentityPolicy,
    /// Whether to demote `changed` states whose content is identical at
    /// both ends.
    pub reconcile: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            missing_identity: MissingIdentityPolicy::Fail,
            reconcile: true,
        }
    }
}

/// Computes state diffs over a [`VersionTree`].
#[derive(Clone, Debug)]
pub struct StateDiffEngine<'t> {
    tree: &'t VersionTree,
    options: DiffOptions,
}

impl<'t> StateDiffEngine<'t> {
    /// An engine with default options.
    pub fn new(tree: &'t VersionTree) -> Self {
        Self::with_options(tree, DiffOptions::default())
    }

    pub fn with_options(tree: &'t VersionTree, options: DiffOptions) -> Self {
        Self { tree, options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn tree(&self) -> &VersionTree {
        self.tree
    }

    /// Diff the states of `v1` against those of `v2`.
    ///
    /// `v1_snapshot` and `v2_snapshot` are the full states of the two
    /// revisions. Requires `v1 <= v2`.
    pub fn states_diff(
        &self,
        v1: Revision,
        v2: Revision,
        v1_snapshot: &EntitySnapshot,
        v2_snapshot: &EntitySnapshot,
    ) -> DiffResult<StateDiffTable> {
        if v1 > v2 {
            return Err(DiffError::InvalidRange { v1, v2 });
        }

        let mut state = ReplayState::seed(v1_snapshot, self.options.missing_identity);
        let lca = self.tree.find_lca(v1, v2)?;
        debug!(%v1, %v2, %lca, seeded = state.len(), "computing state diff");

        self.replay(&mut state, lca, v1, Direction::Backward)?;
        self.replay(&mut state, lca, v2, Direction::Forward)?;

        let mut table = state.into_table();
        if self.options.reconcile {
            let demoted = reconcile(&mut table, v1_snapshot, v2_snapshot);
            debug!(demoted, "reconciled content-identical states");
        }
        Ok(table)
    }

    /// Replay every commit between `ancestor` and `endpoint` into `state`.
    ///
    /// Forward replays run ancestor to endpoint with commands in recorded
    /// order. Backward replays run endpoint to ancestor and undo each
    /// commit's commands last to first.
    pub fn replay(
        &self,
        state: &mut ReplayState,
        ancestor: Revision,
        endpoint: Revision,
        direction: Direction,
    ) -> DiffResult<()> {
        let mut path = self.tree.ancestry_path(ancestor, endpoint)?;
        if direction == Direction::Forward {
            path.reverse();
        }

        for revision in path {
            let mut commands = self.tree.change_list(revision)?;
            if direction == Direction::Backward {
                commands.reverse();
            }
            for command in &commands {
                state.apply(command, direction, revision)?;
            }
        }
        Ok(())
    }
}

/// Demote `changed` states whose content is deeply equal at both ends.
///
/// Returns the number of demoted states.
pub fn reconcile(
    table: &mut StateDiffTable,
    v1_snapshot: &EntitySnapshot,
    v2_snapshot: &EntitySnapshot,
) -> usize {
    let mut demoted = 0;
    for entry in table.values_mut() {
        if entry.status != StateStatus::Changed {
            continue;
        }
        if let (Some(before), Some(after)) = (
            v1_snapshot.get(&entry.original_name),
            v2_snapshot.get(&entry.newest_name),
        ) {
            if deep_equal(before, after) {
                entry.status = StateStatus::Unchanged;
                demoted += 1;
            }
        }
    }
    demoted
}
