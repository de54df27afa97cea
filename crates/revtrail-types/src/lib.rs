//! Foundation types for revtrail.
//!
//! This crate provides the structural types shared by the version tree, the
//! state diff engine, and the comparison service. Every other revtrail crate
//! depends on `revtrail-types`.
//!
//! # Key Types
//!
//! - [`Revision`] -- 1-based commit number; revision 1 is the root
//! - [`CommitRecord`] / [`CommitType`] -- Stored metadata for one revision
//! - [`ChangeCommand`] -- Closed set of entity-level change commands
//! - [`EntitySnapshot`] -- Full entity-name to content map for one revision

pub mod command;
pub mod commit;
pub mod error;
pub mod revision;
pub mod snapshot;

pub use command::ChangeCommand;
pub use commit::{parse_history, CommitRecord, CommitType};
pub use error::{TypeError, TypeResult};
pub use revision::Revision;
pub use snapshot::EntitySnapshot;
