//! The comparison service.
//!
//! [`VersionComparer`] owns a [`SnapshotSource`] and the version tree built
//! from its history. The tree is built once by [`load_history`]; queries
//! made before that fail with [`TreeError::Uninitialized`].
//!
//! [`load_history`]: VersionComparer::load_history

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use revtrail_diff::{
    diff_links, DestinationExtractor, DiffError, LinkDiff, StateDiffEngine, StateDiffTable,
    StateStatus,
};
use revtrail_tree::{ParentMap, TreeError, VersionTree};
use revtrail_types::{ChangeCommand, EntitySnapshot, Revision};

use crate::config::CompareConfig;
use crate::error::{CompareError, CompareResult};
use crate::source::SnapshotSource;

/// The outcome of comparing two revisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub v1: Revision,
    pub v2: Revision,
    /// Lowest common ancestor of `v1` and `v2`.
    pub lca: Revision,
    pub states: StateDiffTable,
    pub links: Vec<LinkDiff>,
}

impl VersionComparison {
    /// Returns `true` if no state differs between the two revisions.
    pub fn is_unchanged(&self) -> bool {
        self.states.is_unchanged()
    }

    /// Number of states with the given status.
    pub fn count(&self, status: StateStatus) -> usize {
        self.states.count(status)
    }
}

/// Compares revisions served by a [`SnapshotSource`].
pub struct VersionComparer<S> {
    source: S,
    config: CompareConfig,
    tree: OnceCell<VersionTree>,
}

impl<S: SnapshotSource> VersionComparer<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, CompareConfig::default())
    }

    pub fn with_config(source: S, config: CompareConfig) -> Self {
        Self {
            source,
            config,
            tree: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // ---------------------------------------------------------------
    // History
    // ---------------------------------------------------------------

    /// Fetch the commit history and build the version tree.
    ///
    /// Only the first successful call fetches; later calls return the same
    /// tree. A failed load leaves the comparer uninitialized.
    pub async fn load_history(&self) -> CompareResult<&VersionTree> {
        self.tree
            .get_or_try_init(|| async {
                let records =
                    with_timeout(self.config.fetch_timeout(), "history", self.source.fetch_history())
                        .await?;
                let tree = VersionTree::build(records)?;
                info!(latest = %tree.latest(), "loaded version history");
                Ok::<_, CompareError>(tree)
            })
            .await
    }

    /// Returns `true` once the history has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.tree.initialized()
    }

    /// The loaded version tree.
    pub fn tree(&self) -> CompareResult<&VersionTree> {
        self.tree
            .get()
            .ok_or(CompareError::Tree(TreeError::Uninitialized))
    }

    pub fn parent_map(&self) -> CompareResult<&ParentMap> {
        Ok(self.tree()?.parent_map())
    }

    pub fn find_lca(&self, v1: Revision, v2: Revision) -> CompareResult<Revision> {
        Ok(self.tree()?.find_lca(v1, v2)?)
    }

    pub fn change_list(&self, revision: Revision) -> CompareResult<Vec<ChangeCommand>> {
        Ok(self.tree()?.change_list(revision)?)
    }

    // ---------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------

    /// Compare `v1` against `v2` (`v1 <= v2`).
    ///
    /// Both snapshots are fetched concurrently; if either fetch fails no
    /// diff is computed.
    pub async fn compare(&self, v1: Revision, v2: Revision) -> CompareResult<VersionComparison> {
        if v1 > v2 {
            return Err(DiffError::InvalidRange { v1, v2 }.into());
        }
        let tree = self.tree()?;

        let (v1_snapshot, v2_snapshot) =
            tokio::try_join!(self.fetch_snapshot(v1), self.fetch_snapshot(v2))?;
        debug!(
            %v1,
            %v2,
            v1_states = v1_snapshot.len(),
            v2_states = v2_snapshot.len(),
            "fetched snapshots"
        );

        let engine = StateDiffEngine::with_options(tree, self.config.diff.clone());
        let states = engine.states_diff(v1, v2, &v1_snapshot, &v2_snapshot)?;
        let lca = tree.find_lca(v1, v2)?;
        let extractor = DestinationExtractor::new(self.config.link_keys.iter().cloned());
        let links = diff_links(&states, &v1_snapshot, &v2_snapshot, &extractor);

        info!(
            %v1,
            %v2,
            %lca,
            states = states.len(),
            links = links.len(),
            "compared versions"
        );
        Ok(VersionComparison {
            v1,
            v2,
            lca,
            states,
            links,
        })
    }

    async fn fetch_snapshot(&self, revision: Revision) -> CompareResult<EntitySnapshot> {
        with_timeout(
            self.config.fetch_timeout(),
            revision,
            self.source.fetch_snapshot(revision),
        )
        .await
    }
}

async fn with_timeout<T, E, F>(limit: Duration, what: impl Display, fut: F) -> CompareResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<CompareError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(CompareError::Timeout {
            what: what.to_string(),
            after: limit,
        }),
    }
}
