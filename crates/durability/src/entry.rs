//! Commit log entry
//!
//! One entry per committed transaction, written after validation and before
//! the batch is applied to the store. Replaying the entries in order
//! reproduces the store.

use serde::{Deserialize, Serialize};
use timekeep_core::{Record, RecordKey};

/// Entry type tag for a committed transaction
pub const TYPE_COMMIT: u8 = 1;

/// A committed transaction's effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Transaction id
    pub txn_id: u64,
    /// Commit version assigned to every write and delete
    pub version: u64,
    /// Records written (full images)
    pub writes: Vec<Record>,
    /// Keys deleted
    pub deletes: Vec<RecordKey>,
}

impl LogEntry {
    /// Build an entry
    pub fn new(txn_id: u64, version: u64, writes: Vec<Record>, deletes: Vec<RecordKey>) -> Self {
        LogEntry {
            txn_id,
            version,
            writes,
            deletes,
        }
    }

    /// Type tag written in the frame header
    pub fn type_tag(&self) -> u8 {
        TYPE_COMMIT
    }

    /// Number of operations in the entry
    pub fn op_count(&self) -> usize {
        self.writes.len() + self.deletes.len()
    }
}
