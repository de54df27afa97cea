//! Identity records produced by a state diff.
//!
//! Each state seen during a diff receives a [`StateId`] that stays the same
//! across renames. The [`StateDiffTable`] maps those ids to the state's name
//! at both ends of the range and its overall [`StateStatus`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a state for the duration of one diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to a state between the two ends of a diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStatus {
    Unchanged,
    Added,
    Deleted,
    Changed,
}

impl fmt::Display for StateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Added => write!(f, "added"),
            Self::Deleted => write!(f, "deleted"),
            Self::Changed => write!(f, "changed"),
        }
    }
}

/// Name history and status of one state identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiffEntry {
    /// The state's name at the later end of the diff.
    pub newest_name: String,
    /// The state's name at the earlier end of the diff.
    pub original_name: String,
    pub status: StateStatus,
}

impl StateDiffEntry {
    /// A state whose name and status are unchanged so far.
    pub fn unchanged(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            newest_name: name.clone(),
            original_name: name,
            status: StateStatus::Unchanged,
        }
    }

    /// A state first seen inside the diff range.
    pub fn added(name: impl Into<String>) -> Self {
        Self {
            status: StateStatus::Added,
            ..Self::unchanged(name)
        }
    }

    /// Returns `true` if the state carries a different name at each end.
    pub fn is_renamed(&self) -> bool {
        self.newest_name != self.original_name
    }
}

/// The result of a state diff: identity to entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDiffTable {
    entries: BTreeMap<StateId, StateDiffEntry>,
}

impl StateDiffTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StateId, entry: StateDiffEntry) -> Option<StateDiffEntry> {
        self.entries.insert(id, entry)
    }

    pub fn get(&self, id: StateId) -> Option<&StateDiffEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut StateDiffEntry> {
        self.entries.get_mut(&id)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &StateDiffEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut StateDiffEntry> {
        self.entries.values_mut()
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no identity was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently assigned identity whose newest name is `name`.
    pub fn find_by_newest_name(&self, name: &str) -> Option<(StateId, &StateDiffEntry)> {
        self.entries
            .iter()
            .rev()
            .find(|(_, entry)| entry.newest_name == name)
            .map(|(id, entry)| (*id, entry))
    }

    /// The earliest assigned identity whose original name is `name`.
    pub fn find_by_original_name(&self, name: &str) -> Option<(StateId, &StateDiffEntry)> {
        self.iter().find(|(_, entry)| entry.original_name == name)
    }

    /// Number of identities with the given status.
    pub fn count(&self, status: StateStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }

    /// Returns `true` if every identity is unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.entries
            .values()
            .all(|e| e.status == StateStatus::Unchanged)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<StateId, StateDiffEntry> {
        &self.entries
    }
}

impl IntoIterator for StateDiffTable {
    type Item = (StateId, StateDiffEntry);
    type IntoIter = std::collections::btree_map::IntoIter<StateId, StateDiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
