//! Change commands recorded in a commit.
//!
//! The set of commands is closed: every consumer matches on [`ChangeCommand`]
//! exhaustively, so a new kind of command fails to compile until every
//! replay site handles it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::revision::Revision;

/// A single entity-level change recorded in a commit.
///
/// On the wire each command is a JSON object tagged by its `cmd` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum ChangeCommand {
    /// A new entity was created.
    #[serde(rename = "add_state")]
    AddState { state_name: String },
    /// An existing entity was removed.
    #[serde(rename = "delete_state")]
    DeleteState { state_name: String },
    /// An entity was renamed; its identity is unchanged.
    #[serde(rename = "rename_state")]
    RenameState {
        old_state_name: String,
        new_state_name: String,
    },
    /// One property of an entity was edited.
    #[serde(rename = "edit_state_property")]
    EditStateProperty {
        state_name: String,
        property_name: String,
        #[serde(default)]
        old_value: Value,
        #[serde(default)]
        new_value: Value,
    },
    /// Marks a revert commit; the commit's tree parent is `version_number`.
    #[serde(rename = "AUTO_revert_version_number")]
    RevertMarker { version_number: Revision },
}

impl ChangeCommand {
    /// The wire tag of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddState { .. } => "add_state",
            Self::DeleteState { .. } => "delete_state",
            Self::RenameState { .. } => "rename_state",
            Self::EditStateProperty { .. } => "edit_state_property",
            Self::RevertMarker { .. } => "AUTO_revert_version_number",
        }
    }

    /// The revert target, if this is a revert marker.
    pub fn revert_target(&self) -> Option<Revision> {
        match self {
            Self::RevertMarker { version_number } => Some(*version_number),
            _ => None,
        }
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        match self {
            Self::AddState { state_name } => format!("add {state_name:?}"),
            Self::DeleteState { state_name } => format!("delete {state_name:?}"),
            Self::RenameState {
                old_state_name,
                new_state_name,
            } => format!("rename {old_state_name:?} -> {new_state_name:?}"),
            Self::EditStateProperty {
                state_name,
                property_name,
                ..
            } => format!("edit {state_name:?}.{property_name}"),
            Self::RevertMarker { version_number } => format!("revert to {version_number}"),
        }
    }
}
