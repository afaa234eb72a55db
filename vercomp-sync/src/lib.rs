//! # vercomp-sync
//!
//! Converges a destination project's versions and components onto a
//! selected subset of a source project's.
//!
//! Pieces, leaf first:
//! - [`accessor`] — the [`RemoteCollection`] seam every remote call goes through
//! - [`select`] — which source entities are in scope
//! - [`diff`] — which attributes disagree between source and destination
//! - [`policy`] — per-kind payload rules
//! - [`apply`] — create / update / skip one entity
//! - [`pipeline`] — a whole pass over both kinds
//!
//! [`memory::MemoryCollection`] is an in-process accessor for tests.

pub mod accessor;
pub mod apply;
pub mod diff;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod policy;
pub mod select;

pub use accessor::RemoteCollection;
pub use apply::{converge, ApplyResult};
pub use diff::{differing_fields, FieldChange, FieldDiff};
pub use error::SyncError;
pub use pipeline::{run, CloneReport, CloneRequest, EntityFailure, FailurePolicy, KindReport};
pub use select::select;
