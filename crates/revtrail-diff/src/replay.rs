//! Identity-tracking change replay.
//!
//! [`ReplayState`] holds the identity table while change commands are
//! replayed along one path of the version tree. Replaying backward undoes
//! commands, so an add read backward removes a state and a rename runs in
//! reverse.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use revtrail_types::{ChangeCommand, EntitySnapshot, Revision};

use crate::error::{DiffError, DiffResult};
use crate::identity::{StateDiffEntry, StateDiffTable, StateId, StateStatus};

/// Which way commands are replayed along a tree path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ancestor to descendant, commands as recorded.
    Forward,
    /// Descendant to ancestor, commands undone.
    Backward,
}

/// What to do when a command references a state with no identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIdentityPolicy {
    /// Abort the diff with [`DiffError::MissingIdentity`].
    #[default]
    Fail,
    /// Create an unchanged identity for the name and carry on.
    SelfHeal,
}

#[derive(Clone, Debug)]
struct Identity {
    entry: StateDiffEntry,
    /// Whether the state exists at the current replay position.
    live: bool,
}

/// The identity table for one diff request.
///
/// Every name that has ever been live during the replay maps to exactly one
/// identity. A name whose state was deleted keeps pointing at that identity,
/// so a later re-add revives it instead of minting a new one.
#[derive(Clone, Debug)]
pub struct ReplayState {
    identities: BTreeMap<StateId, Identity>,
    by_name: HashMap<String, StateId>,
    next_id: u32,
    policy: MissingIdentityPolicy,
}

impl ReplayState {
    /// Seed one unchanged identity per state in `snapshot`, in name order.
    pub fn seed(snapshot: &EntitySnapshot, policy: MissingIdentityPolicy) -> Self {
        let mut state = Self {
            identities: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 0,
            policy,
        };
        for name in snapshot.names() {
            state.assign(StateDiffEntry::unchanged(name));
        }
        state
    }

    /// Number of identities assigned so far.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// The identity currently bound to `name`, if any.
    pub fn id_of(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    /// Apply one command recorded by `revision`.
    pub fn apply(
        &mut self,
        command: &ChangeCommand,
        direction: Direction,
        revision: Revision,
    ) -> DiffResult<()> {
        trace!(%revision, ?direction, command = %command.summary(), "replaying command");

        match (command, direction) {
            (ChangeCommand::AddState { state_name }, Direction::Forward)
            | (ChangeCommand::DeleteState { state_name }, Direction::Backward) => {
                self.appear(state_name);
                Ok(())
            }
            (ChangeCommand::DeleteState { state_name }, Direction::Forward)
            | (ChangeCommand::AddState { state_name }, Direction::Backward) => {
                self.disappear(state_name, revision)
            }
            (
                ChangeCommand::RenameState {
                    old_state_name,
                    new_state_name,
                },
                Direction::Forward,
            ) => self.rename(old_state_name, new_state_name, revision),
            (
                ChangeCommand::RenameState {
                    old_state_name,
                    new_state_name,
                },
                Direction::Backward,
            ) => self.rename(new_state_name, old_state_name, revision),
            (ChangeCommand::EditStateProperty { state_name, .. }, _) => {
                self.touch(state_name, revision)
            }
            (ChangeCommand::RevertMarker { .. }, _) => Ok(()),
        }
    }

    /// Finish the replay and hand back the table.
    pub fn into_table(self) -> StateDiffTable {
        let mut table = StateDiffTable::new();
        for (id, identity) in self.identities {
            table.insert(id, identity.entry);
        }
        table
    }

    // ---------------------------------------------------------------
    // Command effects
    // ---------------------------------------------------------------

    fn appear(&mut self, name: &str) {
        if let Some(id) = self.id_of(name) {
            if let Some(identity) = self.identities.get_mut(&id) {
                if !identity.live {
                    identity.entry.status = StateStatus::Changed;
                    identity.entry.newest_name = name.to_string();
                    identity.live = true;
                    trace!(%id, name, "state revived");
                    return;
                }
            }
        }
        self.assign(StateDiffEntry::added(name));
    }

    fn disappear(&mut self, name: &str, revision: Revision) -> DiffResult<()> {
        let id = self.lookup(name, revision)?;
        let identity = self.identity_mut(id);
        identity.entry.status = match identity.entry.status {
            StateStatus::Added => StateStatus::Changed,
            _ => StateStatus::Deleted,
        };
        identity.live = false;
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str, revision: Revision) -> DiffResult<()> {
        let id = self.lookup(from, revision)?;
        self.by_name.remove(from);
        self.by_name.insert(to.to_string(), id);
        self.identity_mut(id).entry.newest_name = to.to_string();
        Ok(())
    }

    fn touch(&mut self, name: &str, revision: Revision) -> DiffResult<()> {
        let id = self.lookup(name, revision)?;
        let entry = &mut self.identity_mut(id).entry;
        if entry.status == StateStatus::Unchanged {
            entry.status = StateStatus::Changed;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Identity bookkeeping
    // ---------------------------------------------------------------

    fn assign(&mut self, entry: StateDiffEntry) -> StateId {
        let id = StateId(self.next_id);
        self.next_id += 1;
        self.by_name.insert(entry.newest_name.clone(), id);
        self.identities.insert(id, Identity { entry, live: true });
        id
    }

    fn lookup(&mut self, name: &str, revision: Revision) -> DiffResult<StateId> {
        if let Some(id) = self.id_of(name) {
            return Ok(id);
        }
        match self.policy {
            MissingIdentityPolicy::Fail => Err(DiffError::MissingIdentity {
                name: name.to_string(),
                revision,
            }),
            MissingIdentityPolicy::SelfHeal => {
                warn!(%revision, name, "no identity for state, creating one");
                Ok(self.assign(StateDiffEntry::unchanged(name)))
            }
        }
    }

    fn identity_mut(&mut self, id: StateId) -> &mut Identity {
        self.identities
            .get_mut(&id)
            .unwrap_or_else(|| unreachable!("name index points at unassigned identity {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rev(n: u32) -> Revision {
        Revision::new(n).unwrap()
    }

    fn add(name: &str) -> ChangeCommand {
        ChangeCommand::AddState {
            state_name: name.into(),
        }
    }

    fn delete(name: &str) -> ChangeCommand {
        ChangeCommand::DeleteState {
            state_name: name.into(),
        }
    }

    fn rename(old: &str, new: &str) -> ChangeCommand {
        ChangeCommand::RenameState {
            old_state_name: old.into(),
            new_state_name: new.into(),
        }
    }

    fn edit(name: &str) -> ChangeCommand {
        ChangeCommand::EditStateProperty {
            state_name: name.into(),
            property_name: "content".into(),
            old_value: json!("old"),
            new_value: json!("new"),
        }
    }

    fn seeded(names: &[&str]) -> ReplayState {
        let snapshot: EntitySnapshot = names.iter().map(|n| (*n, json!({}))).collect();
        ReplayState::seed(&snapshot, MissingIdentityPolicy::Fail)
    }

    fn status_of(state: &ReplayState, name: &str) -> StateStatus {
        let id = state.id_of(name).unwrap();
        state.identities[&id].entry.status
    }

    #[test]
    fn seeding_assigns_ids_in_name_order() {
        let state = seeded(&["B", "A"]);
        assert_eq!(state.id_of("A"), Some(StateId(0)));
        assert_eq!(state.id_of("B"), Some(StateId(1)));
        assert_eq!(status_of(&state, "A"), StateStatus::Unchanged);
    }

    #[test]
    fn forward_add_and_backward_delete_are_symmetric() {
        let mut forward = seeded(&[]);
        forward.apply(&add("X"), Direction::Forward, rev(2)).unwrap();
        let mut backward = seeded(&[]);
        backward.apply(&delete("X"), Direction::Backward, rev(2)).unwrap();

        assert_eq!(forward.into_table(), backward.into_table());
    }

    #[test]
    fn delete_of_seeded_state() {
        let mut state = seeded(&["A"]);
        state.apply(&delete("A"), Direction::Forward, rev(2)).unwrap();
        assert_eq!(status_of(&state, "A"), StateStatus::Deleted);
    }

    #[test]
    fn add_then_delete_is_changed() {
        let mut state = seeded(&[]);
        state.apply(&add("X"), Direction::Forward, rev(2)).unwrap();
        state.apply(&delete("X"), Direction::Forward, rev(3)).unwrap();
        assert_eq!(status_of(&state, "X"), StateStatus::Changed);
    }

    #[test]
    fn delete_then_readd_collapses_to_changed() {
        let mut state = seeded(&["A"]);
        state.apply(&delete("A"), Direction::Forward, rev(2)).unwrap();
        state.apply(&add("A"), Direction::Forward, rev(3)).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(status_of(&state, "A"), StateStatus::Changed);
    }

    #[test]
    fn readd_of_live_name_gets_fresh_identity() {
        let mut state = seeded(&["A"]);
        state.apply(&add("A"), Direction::Forward, rev(2)).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.id_of("A"), Some(StateId(1)));
        assert_eq!(status_of(&state, "A"), StateStatus::Added);
    }

    #[test]
    fn rename_keeps_identity_and_status() {
        let mut state = seeded(&["A"]);
        state.apply(&rename("A", "B"), Direction::Forward, rev(2)).unwrap();
        assert_eq!(state.id_of("A"), None);
        assert_eq!(state.id_of("B"), Some(StateId(0)));
        assert_eq!(status_of(&state, "B"), StateStatus::Unchanged);

        let table = state.into_table();
        let entry = table.get(StateId(0)).unwrap();
        assert_eq!(entry.original_name, "A");
        assert_eq!(entry.newest_name, "B");
    }

    #[test]
    fn backward_rename_swaps_names() {
        let mut state = seeded(&["B"]);
        state.apply(&rename("A", "B"), Direction::Backward, rev(2)).unwrap();
        assert_eq!(state.id_of("A"), Some(StateId(0)));
    }

    #[test]
    fn edit_only_promotes_unchanged() {
        let mut state = seeded(&["A"]);
        state.apply(&edit("A"), Direction::Forward, rev(2)).unwrap();
        assert_eq!(status_of(&state, "A"), StateStatus::Changed);

        state.apply(&add("N"), Direction::Forward, rev(3)).unwrap();
        state.apply(&edit("N"), Direction::Forward, rev(4)).unwrap();
        assert_eq!(status_of(&state, "N"), StateStatus::Added);
    }

    #[test]
    fn revert_marker_has_no_effect() {
        let mut state = seeded(&["A"]);
        let before = state.clone().into_table();
        state
            .apply(
                &ChangeCommand::RevertMarker {
                    version_number: rev(1),
                },
                Direction::Forward,
                rev(2),
            )
            .unwrap();
        assert_eq!(state.into_table(), before);
    }

    #[test]
    fn missing_identity_fails_by_default() {
        let mut state = seeded(&[]);
        for cmd in [delete("Z"), rename("Z", "Y"), edit("Z")] {
            let err = state.apply(&cmd, Direction::Forward, rev(3)).unwrap_err();
            assert_eq!(
                err,
                DiffError::MissingIdentity {
                    name: "Z".into(),
                    revision: rev(3)
                }
            );
        }
        assert!(state.is_empty());
    }

    #[test]
    fn missing_identity_self_heals_when_asked() {
        let mut state = ReplayState::seed(&EntitySnapshot::new(), MissingIdentityPolicy::SelfHeal);
        state.apply(&delete("Z"), Direction::Forward, rev(2)).unwrap();
        state.apply(&rename("Q", "R"), Direction::Forward, rev(3)).unwrap();

        let table = state.into_table();
        assert_eq!(table.get(StateId(0)).unwrap().status, StateStatus::Deleted);
        let renamed = table.get(StateId(1)).unwrap();
        assert_eq!(renamed.original_name, "Q");
        assert_eq!(renamed.newest_name, "R");
        assert_eq!(renamed.status, StateStatus::Unchanged);
    }
}
