//! Core traits for storage and snapshot abstraction
//!
//! The engine and the transaction layer only talk to the record store through
//! these traits, so validation, derived fields and invariant enforcement do not
//! depend on the concrete store.

use crate::error::Result;
use crate::model::Record;
use crate::types::{EntityKind, RecordKey};
use crate::versioned::Versioned;

/// Storage abstraction for the record store
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait Storage: Send + Sync {
    /// Get the latest committed version of a record
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &RecordKey) -> Result<Option<Versioned<Record>>>;

    /// All records of a kind, in key order
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scan_kind(&self, kind: EntityKind) -> Result<Vec<Versioned<Record>>>;

    /// Keys of all records directly owned by `parent`
    ///
    /// Results are sorted by key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn children_of(&self, parent: &RecordKey) -> Result<Vec<RecordKey>>;

    /// Apply a committed batch atomically
    ///
    /// Every write and delete in the batch gets `version`. Readers observe
    /// either none or all of the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn apply_batch(&self, writes: Vec<Record>, deletes: Vec<RecordKey>, version: u64)
        -> Result<()>;

    /// Highest commit version applied so far
    fn current_version(&self) -> u64;
}

/// Read-only, point-in-time view of the store
///
/// Transactions read from a snapshot so that a transaction never observes
/// another transaction's partial effects.
pub trait SnapshotView: Send + Sync {
    /// Get a record as of the snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &RecordKey) -> Result<Option<Versioned<Record>>>;

    /// All records of a kind as of the snapshot, in key order
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scan_kind(&self, kind: EntityKind) -> Result<Vec<Versioned<Record>>>;

    /// Keys of all records directly owned by `parent` as of the snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn children_of(&self, parent: &RecordKey) -> Result<Vec<RecordKey>>;

    /// Version the snapshot was taken at
    fn version(&self) -> u64;
}
