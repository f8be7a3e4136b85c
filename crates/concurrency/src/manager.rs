//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation (read-set and constraints, under the commit lock)
//! 2. Commit log append (durability)
//! 3. Storage application (visibility)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. mark_validating()        Active -> Validating
//! 2. read-only? commit at the current version, nothing logged
//! 3. take the commit lock
//! 4. validate_transaction()   IF findings: abort and return error
//! 5. allocate commit version
//! 6. append LogEntry          (DURABILITY POINT)
//! 7. mark_committed()
//! 8. apply_batch() to storage
//! 9. release the lock, return commit version
//! ```
//!
//! A crash before step 6 loses the transaction. A crash after step 6
//! replays it on the next open.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use timekeep_core::{Storage, TimekeepError};
use timekeep_durability::{CommitLog, LogEntry, LogError};
use tracing::{debug, error};

use crate::transaction::TransactionContext;
use crate::validation::{validate_transaction, ValidationResult};

/// Errors from the commit protocol
#[derive(Debug, Error)]
pub enum CommitError {
    /// Validation found conflicts or integrity violations
    #[error("validation failed: {}", .0.summary())]
    ValidationFailed(ValidationResult),

    /// Transaction was not active when commit was attempted
    #[error("invalid transaction state: {0}")]
    InvalidState(String),

    /// Commit log append failed; nothing was applied
    #[error("commit log write failed: {0}")]
    Log(#[from] LogError),

    /// Reading the store during validation failed
    #[error(transparent)]
    Store(TimekeepError),
}

impl From<CommitError> for TimekeepError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::ValidationFailed(result) if result.has_conflicts() => {
                TimekeepError::conflict(result.summary())
            }
            CommitError::ValidationFailed(result) => TimekeepError::integrity(result.summary()),
            CommitError::InvalidState(state) => TimekeepError::TransactionNotActive { state },
            CommitError::Log(e) => e.into(),
            CommitError::Store(e) => e,
        }
    }
}

/// Manages transaction ids, the global version, and atomic commits
///
/// The global version is incremented once per committed write transaction.
/// All records in a transaction get the same commit version.
pub struct TransactionManager {
    /// Global version counter
    version: AtomicU64,

    /// Next transaction ID
    next_txn_id: AtomicU64,

    /// Serializes validate + log + apply
    commit_lock: Mutex<()>,
}

impl TransactionManager {
    /// Create a manager starting at `initial_version`
    pub fn new(initial_version: u64) -> Self {
        Self::with_txn_id(initial_version, 0)
    }

    /// Create a manager whose new transaction ids start after `max_txn_id`
    ///
    /// Used after recovery so new ids never repeat ids found in the log.
    pub fn with_txn_id(initial_version: u64, max_txn_id: u64) -> Self {
        TransactionManager {
            version: AtomicU64::new(initial_version),
            next_txn_id: AtomicU64::new(max_txn_id + 1),
            commit_lock: Mutex::new(()),
        }
    }

    /// Current global version
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Allocate the next transaction id
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Allocate the next commit version
    pub fn allocate_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit a transaction atomically
    ///
    /// Returns the commit version. Read-only transactions return the
    /// current version without taking the commit lock or writing the log.
    ///
    /// When `log` is `None` (ephemeral databases) the durability step is
    /// skipped.
    pub fn commit<S: Storage>(
        &self,
        txn: &mut TransactionContext,
        store: &S,
        log: Option<&CommitLog>,
    ) -> std::result::Result<u64, CommitError> {
        txn.mark_validating()
            .map_err(|_| CommitError::InvalidState(txn.status.to_string()))?;

        if txn.is_read_only() {
            txn.mark_committed()
                .map_err(|_| CommitError::InvalidState(txn.status.to_string()))?;
            return Ok(self.current_version());
        }

        let _guard = self.commit_lock.lock();

        let result = match validate_transaction(txn, store) {
            Ok(result) => result,
            Err(e) => {
                let _ = txn.mark_aborted(format!("validation error: {}", e));
                return Err(CommitError::Store(e));
            }
        };
        if !result.is_valid() {
            let _ = txn.mark_aborted(result.summary());
            return Err(CommitError::ValidationFailed(result));
        }

        let commit_version = self.allocate_version();
        let (writes, deletes) = txn.batch();

        if let Some(log) = log {
            let entry = LogEntry::new(txn.txn_id, commit_version, writes.clone(), deletes.clone());
            if let Err(e) = log.append(&entry) {
                let _ = txn.mark_aborted(format!("commit log write failed: {}", e));
                return Err(CommitError::Log(e));
            }
        }

        txn.mark_committed()
            .map_err(|_| CommitError::InvalidState(txn.status.to_string()))?;

        debug!(
            target: "timekeep::txn",
            txn_id = txn.txn_id,
            commit_version,
            writes = writes.len(),
            deletes = deletes.len(),
            "Applying committed batch"
        );

        if let Err(e) = store.apply_batch(writes, deletes, commit_version) {
            // The log is authoritative; recovery replays this batch
            error!(
                target: "timekeep::txn",
                txn_id = txn.txn_id,
                commit_version,
                error = %e,
                "Storage application failed after log append, will be recovered on restart"
            );
        }

        Ok(commit_version)
    }

    /// Explicitly abort a transaction
    ///
    /// Nothing is written to the log; buffered operations are discarded.
    pub fn abort(
        &self,
        txn: &mut TransactionContext,
        reason: impl Into<String>,
    ) -> timekeep_core::Result<()> {
        txn.mark_aborted(reason)
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(0)
    }
}
