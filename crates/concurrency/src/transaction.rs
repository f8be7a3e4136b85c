//! Transaction context for OCC
//!
//! `TransactionContext` tracks all reads, writes and deletes of one
//! transaction so the manager can validate and apply them at commit.
//!
//! ## Read-your-writes
//!
//! Reads check, in order:
//! 1. the write-set (own uncommitted writes) - no read-set entry
//! 2. the delete-set (own uncommitted deletes) - no read-set entry
//! 3. the snapshot - recorded in the read-set with the version read
//!    (0 when the record did not exist)

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use timekeep_core::{
    EntityKind, Record, RecordKey, Result, SnapshotView, TimekeepError,
};

/// Status of a transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `Validating` (begin commit)
/// - `Validating` → `Committed` (validation and apply succeeded)
/// - `Validating` → `Aborted` (conflict, violation or log failure)
/// - `Active` → `Aborted` (caller abort or error in the closure)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Transaction is being validated
    Validating,
    /// Transaction committed successfully
    Committed,
    /// Transaction was aborted
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Active => f.write_str("active"),
            TransactionStatus::Validating => f.write_str("validating"),
            TransactionStatus::Committed => f.write_str("committed"),
            TransactionStatus::Aborted { reason } => write!(f, "aborted ({})", reason),
        }
    }
}

/// Summary of buffered operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperations {
    /// Number of buffered writes
    pub writes: usize,
    /// Number of buffered deletes
    pub deletes: usize,
}

impl PendingOperations {
    /// Total number of buffered operations
    pub fn total(&self) -> usize {
        self.writes + self.deletes
    }

    /// True if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Transaction context
pub struct TransactionContext {
    /// Unique transaction id
    pub txn_id: u64,
    /// Snapshot version the transaction reads at
    pub start_version: u64,
    snapshot: Box<dyn SnapshotView>,
    /// Keys read from the snapshot with the version observed
    pub read_set: HashMap<RecordKey, u64>,
    write_set: BTreeMap<RecordKey, Record>,
    delete_set: BTreeSet<RecordKey>,
    /// Current lifecycle state
    pub status: TransactionStatus,
    start_time: Instant,
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("start_version", &self.start_version)
            .field("reads", &self.read_set.len())
            .field("writes", &self.write_set.len())
            .field("deletes", &self.delete_set.len())
            .field("status", &self.status)
            .finish()
    }
}

impl TransactionContext {
    /// Create a transaction reading from `snapshot`
    pub fn with_snapshot(txn_id: u64, snapshot: Box<dyn SnapshotView>) -> Self {
        let start_version = snapshot.version();
        TransactionContext {
            txn_id,
            start_version,
            snapshot,
            read_set: HashMap::new(),
            write_set: BTreeMap::new(),
            delete_set: BTreeSet::new(),
            status: TransactionStatus::Active,
            start_time: Instant::now(),
        }
    }

    // ===== Read Operations =====

    /// Get a record in the transaction's view
    pub fn get(&mut self, key: &RecordKey) -> Result<Option<Record>> {
        self.ensure_active()?;

        if let Some(record) = self.write_set.get(key) {
            return Ok(Some(record.clone()));
        }
        if self.delete_set.contains(key) {
            return Ok(None);
        }
        self.read_from_snapshot(key)
    }

    fn read_from_snapshot(&mut self, key: &RecordKey) -> Result<Option<Record>> {
        match self.snapshot.get(key)? {
            Some(versioned) => {
                self.read_set.insert(*key, versioned.version);
                Ok(Some(versioned.value))
            }
            None => {
                // A record created before we commit invalidates this read
                self.read_set.insert(*key, 0);
                Ok(None)
            }
        }
    }

    /// True if the record exists in the transaction's view
    pub fn exists(&mut self, key: &RecordKey) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All records of a kind in the transaction's view, in key order
    ///
    /// Records read from the snapshot are added to the read-set.
    pub fn scan_kind(&mut self, kind: EntityKind) -> Result<Vec<Record>> {
        self.ensure_active()?;

        let mut results: BTreeMap<RecordKey, Record> = BTreeMap::new();
        for versioned in self.snapshot.scan_kind(kind)? {
            let key = versioned.value.key();
            if !self.delete_set.contains(&key) {
                self.read_set.insert(key, versioned.version);
                results.insert(key, versioned.value);
            }
        }
        for (key, record) in self.write_set.range(RecordKey::kind_start(kind)..=RecordKey::kind_end(kind)) {
            results.insert(*key, record.clone());
        }
        Ok(results.into_values().collect())
    }

    /// Keys of the records owned by `parent` in the transaction's view
    ///
    /// Includes own writes that point at `parent`; excludes own deletes and
    /// own writes that moved a child elsewhere.
    pub fn children_of(&mut self, parent: &RecordKey) -> Result<Vec<RecordKey>> {
        self.ensure_active()?;

        let mut keys: BTreeSet<RecordKey> = self
            .snapshot
            .children_of(parent)?
            .into_iter()
            .filter(|k| !self.delete_set.contains(k))
            .collect();
        for (key, record) in &self.write_set {
            if record.parent().as_ref() == Some(parent) {
                keys.insert(*key);
            } else {
                keys.remove(key);
            }
        }
        Ok(keys.into_iter().collect())
    }

    /// Version recorded for a key in the read-set
    pub fn get_read_version(&self, key: &RecordKey) -> Option<u64> {
        self.read_set.get(key).copied()
    }

    // ===== Write Operations =====

    /// Buffer a write of the full record
    pub fn put(&mut self, record: Record) -> Result<()> {
        self.ensure_active()?;
        let key = record.key();
        self.delete_set.remove(&key);
        self.write_set.insert(key, record);
        Ok(())
    }

    /// Buffer a delete
    pub fn delete(&mut self, key: RecordKey) -> Result<()> {
        self.ensure_active()?;
        self.write_set.remove(&key);
        self.delete_set.insert(key);
        Ok(())
    }

    /// Buffered writes, in key order
    pub fn writes(&self) -> impl Iterator<Item = &Record> {
        self.write_set.values()
    }

    /// Buffered deletes, in key order
    pub fn deletes(&self) -> impl Iterator<Item = &RecordKey> {
        self.delete_set.iter()
    }

    /// Buffered write for a key, if any
    pub fn written(&self, key: &RecordKey) -> Option<&Record> {
        self.write_set.get(key)
    }

    /// True if the key is deleted in this transaction
    pub fn is_deleted(&self, key: &RecordKey) -> bool {
        self.delete_set.contains(key)
    }

    /// Clone the buffered batch for the commit log and store
    pub fn batch(&self) -> (Vec<Record>, Vec<RecordKey>) {
        (
            self.write_set.values().cloned().collect(),
            self.delete_set.iter().copied().collect(),
        )
    }

    /// Buffered operation counts
    pub fn pending_operations(&self) -> PendingOperations {
        PendingOperations {
            writes: self.write_set.len(),
            deletes: self.delete_set.len(),
        }
    }

    /// True if the transaction buffered no writes or deletes
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.delete_set.is_empty()
    }

    // ===== State Management =====

    /// True while the transaction accepts operations
    pub fn is_active(&self) -> bool {
        matches!(self.status, TransactionStatus::Active)
    }

    /// True after a successful commit
    pub fn is_committed(&self) -> bool {
        matches!(self.status, TransactionStatus::Committed)
    }

    /// True after an abort
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TransactionStatus::Aborted { .. })
    }

    /// Time since the transaction started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Error unless the transaction is active
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(TimekeepError::TransactionNotActive {
                state: self.status.to_string(),
            })
        }
    }

    /// `Active` → `Validating`
    pub fn mark_validating(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.status = TransactionStatus::Validating;
        Ok(())
    }

    /// `Validating` → `Committed`
    pub fn mark_committed(&mut self) -> Result<()> {
        match self.status {
            TransactionStatus::Validating => {
                self.status = TransactionStatus::Committed;
                Ok(())
            }
            _ => Err(TimekeepError::TransactionNotActive {
                state: self.status.to_string(),
            }),
        }
    }

    /// Abort and discard buffered operations
    ///
    /// The read-set is kept for diagnostics.
    pub fn mark_aborted(&mut self, reason: impl Into<String>) -> Result<()> {
        match self.status {
            TransactionStatus::Committed | TransactionStatus::Aborted { .. } => {
                Err(TimekeepError::TransactionNotActive {
                    state: self.status.to_string(),
                })
            }
            _ => {
                self.status = TransactionStatus::Aborted {
                    reason: reason.into(),
                };
                self.write_set.clear();
                self.delete_set.clear();
                Ok(())
            }
        }
    }
}
