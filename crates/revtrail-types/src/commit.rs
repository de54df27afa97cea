//! Commit records: the stored metadata for one revision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::ChangeCommand;
use crate::error::{TypeError, TypeResult};
use crate::revision::Revision;

/// The kind of a commit.
///
/// Only `"revert"` changes how the version tree is built. Any other tag is
/// an ordinary edit and is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommitType {
    /// The commit restores an earlier revision.
    Revert,
    /// Any other commit (`"edit"`, `"create"`, ...).
    Edit(String),
}

impl CommitType {
    /// Returns `true` for revert commits.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert)
    }

    /// The wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Revert => "revert",
            Self::Edit(tag) => tag,
        }
    }
}

impl Default for CommitType {
    fn default() -> Self {
        Self::Edit("edit".into())
    }
}

impl From<String> for CommitType {
    fn from(tag: String) -> Self {
        if tag == "revert" {
            Self::Revert
        } else {
            Self::Edit(tag)
        }
    }
}

impl From<CommitType> for String {
    fn from(kind: CommitType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored metadata for one revision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The revision this commit produced.
    pub version_number: Revision,
    /// Ordinary edit or revert.
    #[serde(default)]
    pub commit_type: CommitType,
    /// Ordered change commands.
    #[serde(default)]
    pub commit_cmds: Vec<ChangeCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on_ms: Option<f64>,
}

impl CommitRecord {
    /// An ordinary edit commit carrying `commands`.
    pub fn edit(version_number: Revision, commands: Vec<ChangeCommand>) -> Self {
        Self {
            version_number,
            commit_type: CommitType::default(),
            commit_cmds: commands,
            commit_message: None,
            committer_id: None,
            created_on_ms: None,
        }
    }

    /// A revert commit restoring `target`.
    pub fn revert(version_number: Revision, target: Revision) -> Self {
        Self {
            commit_type: CommitType::Revert,
            commit_message: Some(format!("Reverted to version {}", target.get())),
            ..Self::edit(
                version_number,
                vec![ChangeCommand::RevertMarker {
                    version_number: target,
                }],
            )
        }
    }

    /// Attach a commit message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }

    /// The target of the first revert marker among the commands.
    pub fn revert_target(&self) -> Option<Revision> {
        self.commit_cmds.iter().find_map(ChangeCommand::revert_target)
    }
}

/// Parse a JSON array of commit records.
pub fn parse_history(json: &str) -> TypeResult<Vec<CommitRecord>> {
    serde_json::from_str(json).map_err(|e| TypeError::Serialization(e.to_string()))
}
