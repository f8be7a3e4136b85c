//! Storage layer for Timekeep
//!
//! This crate implements the record store backend with:
//! - RecordStore: BTreeMap-based storage with RwLock
//! - Parent → children secondary index
//! - Version tracking with AtomicU64
//! - RecordSnapshot implementation of SnapshotView

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod record_store;
pub mod snapshot;

pub use index::ChildIndex;
pub use record_store::RecordStore;
pub use snapshot::RecordSnapshot;
