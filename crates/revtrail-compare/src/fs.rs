//! File-backed snapshot source.
//!
//! History is a JSON array of commit records. Snapshots live in a directory
//! as `<revision>.json`, each a JSON object of state name to content.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use revtrail_types::{parse_history, CommitRecord, EntitySnapshot, Revision};

use crate::error::{SourceError, SourceResult};
use crate::source::SnapshotSource;

/// Reads history and snapshots from the local filesystem.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    history_path: PathBuf,
    snapshot_dir: Option<PathBuf>,
}

impl DirectorySource {
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            snapshot_dir: None,
        }
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Path of the snapshot file for `revision`, if a directory is set.
    pub fn snapshot_path(&self, revision: Revision) -> Option<PathBuf> {
        self.snapshot_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", revision.get())))
    }
}

async fn read(path: &Path) -> std::io::Result<String> {
    debug!(path = %path.display(), "reading");
    tokio::fs::read_to_string(path).await
}

#[async_trait]
impl SnapshotSource for DirectorySource {
    async fn fetch_history(&self) -> SourceResult<Vec<CommitRecord>> {
        let text = read(&self.history_path)
            .await
            .map_err(|e| SourceError::Io(format!("{}: {e}", self.history_path.display())))?;
        parse_history(&text).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    async fn fetch_snapshot(&self, revision: Revision) -> SourceResult<EntitySnapshot> {
        let path = self
            .snapshot_path(revision)
            .ok_or(SourceError::SnapshotNotFound(revision))?;
        let text = match read(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::SnapshotNotFound(revision))
            }
            Err(e) => return Err(SourceError::Io(format!("{}: {e}", path.display()))),
        };
        EntitySnapshot::from_json(&text).map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_history_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history.json");
        std::fs::write(
            &history,
            r#"[{"version_number": 2, "commit_type": "edit",
                 "commit_cmds": [{"cmd": "add_state", "state_name": "B"}]}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("2.json"), r#"{"A": {}, "B": {}}"#).unwrap();

        let source = DirectorySource::new(&history).with_snapshot_dir(dir.path());
        assert_eq!(source.fetch_history().await.unwrap().len(), 1);

        let rev2 = Revision::new(2).unwrap();
        assert_eq!(source.fetch_snapshot(rev2).await.unwrap().len(), 2);
        assert_eq!(
            source.fetch_snapshot(Revision::ROOT).await.unwrap_err(),
            SourceError::SnapshotNotFound(Revision::ROOT)
        );
    }

    #[tokio::test]
    async fn malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history.json");
        std::fs::write(&history, "{not json").unwrap();
        std::fs::write(dir.path().join("1.json"), "[]").unwrap();

        let source = DirectorySource::new(&history).with_snapshot_dir(dir.path());
        assert!(matches!(
            source.fetch_history().await.unwrap_err(),
            SourceError::Malformed(_)
        ));
        assert!(matches!(
            source.fetch_snapshot(Revision::ROOT).await.unwrap_err(),
            SourceError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn missing_history_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("nope.json"));
        assert!(matches!(
            source.fetch_history().await.unwrap_err(),
            SourceError::Io(_)
        ));
        assert!(source.snapshot_path(Revision::ROOT).is_none());
    }
}
