//! State diff engine for revtrail.
//!
//! Computes which named entities ("states") were added, deleted, changed,
//! or left unchanged between two revisions. Entity identity survives
//! renames, so a state renamed from `A` to `A2` is reported once, with both
//! names.
//!
//! # Key Types
//!
//! - [`StateDiffEngine`] -- Replays change lists through the lowest common ancestor
//! - [`ReplayState`] / [`Direction`] -- Identity table driven by change commands
//! - [`StateDiffTable`] / [`StateDiffEntry`] / [`StateStatus`] -- Per-identity result
//! - [`LinkDiff`] / [`LinkExtractor`] -- Link-level comparison between states
//! - [`deep_equal`] -- Structural equality over entity content

pub mod engine;
pub mod equality;
pub mod error;
pub mod identity;
pub mod links;
pub mod replay;

pub use engine::{reconcile, DiffOptions, StateDiffEngine};
pub use equality::deep_equal;
pub use error::{DiffError, DiffResult};
pub use identity::{StateDiffEntry, StateDiffTable, StateId, StateStatus};
pub use links::{diff_links, DestinationExtractor, LinkDiff, LinkExtractor, LinkStatus};
pub use replay::{Direction, MissingIdentityPolicy, ReplayState};
