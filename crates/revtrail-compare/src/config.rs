use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use revtrail_diff::DiffOptions;

use crate::error::{CompareError, CompareResult};

/// Configuration for the comparison service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Upper bound on each history or snapshot fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Options passed to the state diff engine.
    pub diff: DiffOptions,
    /// Content keys whose string values name a linked state.
    pub link_keys: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 30_000,
            diff: DiffOptions::default(),
            link_keys: vec!["dest".into()],
        }
    }
}

impl CompareConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Parse a TOML document; absent keys take their defaults.
    pub fn from_toml_str(text: &str) -> CompareResult<Self> {
        toml::from_str(text).map_err(|e| CompareError::Config(e.to_string()))
    }

    /// Read and parse a TOML file. Blocks the calling thread; use
    /// [`CompareConfig::load_async`] from async code.
    pub fn load(path: impl AsRef<Path>) -> CompareResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| unreadable(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Read and parse a TOML file without blocking the runtime.
    pub async fn load_async(path: impl AsRef<Path>) -> CompareResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| unreadable(path, e))?;
        Self::from_toml_str(&text)
    }
}

fn unreadable(path: &Path, err: std::io::Error) -> CompareError {
    CompareError::Config(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revtrail_diff::MissingIdentityPolicy;

    #[test]
    fn default_config() {
        let c = CompareConfig::default();
        assert_eq!(c.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(c.diff.missing_identity, MissingIdentityPolicy::Fail);
        assert!(c.diff.reconcile);
        assert_eq!(c.link_keys, vec!["dest".to_string()]);
    }

    #[test]
    fn partial_toml() {
        let c = CompareConfig::from_toml_str(
            r#"
            fetch_timeout_ms = 500

            [diff]
            missing_identity = "self_heal"
            "#,
        )
        .unwrap();
        assert_eq!(c.fetch_timeout(), Duration::from_millis(500));
        assert_eq!(c.diff.missing_identity, MissingIdentityPolicy::SelfHeal);
        assert!(c.diff.reconcile);
        assert_eq!(c.link_keys, vec!["dest".to_string()]);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = CompareConfig::from_toml_str("fetch_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, CompareError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revtrail.toml");
        std::fs::write(&path, "link_keys = [\"next\", \"dest\"]\n").unwrap();
        let c = CompareConfig::load(&path).unwrap();
        assert_eq!(c.link_keys.len(), 2);
        assert!(CompareConfig::load(dir.path().join("missing.toml")).is_err());
    }

    #[tokio::test]
    async fn load_async_matches_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revtrail.toml");
        std::fs::write(&path, "fetch_timeout_ms = 250\n[diff]\nreconcile = false\n").unwrap();
        let c = CompareConfig::load_async(&path).await.unwrap();
        assert_eq!(c, CompareConfig::load(&path).unwrap());
        assert_eq!(c.fetch_timeout(), Duration::from_millis(250));
        assert!(!c.diff.reconcile);

        let err = CompareConfig::load_async(dir.path().join("missing.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Config(_)));
    }
}
