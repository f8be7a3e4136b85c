//! Recovery: rebuild the store from the commit log
//!
//! Replay semantics:
//! - Replays do NOT re-run validation
//! - Replays apply commit decisions in log order
//! - Versions are preserved exactly
//!
//! ## Procedure
//!
//! 1. Read the log, truncating a torn or corrupt tail
//! 2. Apply each intact entry's batch at its recorded version
//! 3. Initialize the TransactionManager with the final version and max txn id

use std::path::{Path, PathBuf};

use timekeep_core::{Result, Storage};
use timekeep_durability::{CommitLog, DurabilityMode, LogEntry};
use timekeep_storage::RecordStore;
use tracing::info;

use crate::manager::TransactionManager;

/// Statistics from recovery
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Committed transactions replayed
    pub txns_replayed: usize,
    /// Entries skipped because the store already held their version
    pub txns_skipped: usize,
    /// Records written
    pub writes_applied: usize,
    /// Records deleted
    pub deletes_applied: usize,
    /// Highest version seen
    pub final_version: u64,
    /// Highest transaction id seen
    pub max_txn_id: u64,
    /// Bytes truncated from a damaged tail
    pub discarded_bytes: u64,
}

impl RecoveryStats {
    /// Total operations applied (writes + deletes)
    pub fn total_operations(&self) -> usize {
        self.writes_applied + self.deletes_applied
    }
}

/// Apply log entries to `store`, in order
///
/// Entries whose version is not above the store's current version are
/// skipped, so replaying a log into a store that already holds a prefix of
/// it is harmless.
pub fn replay_entries<S: Storage>(entries: Vec<LogEntry>, store: &S) -> Result<RecoveryStats> {
    let mut stats = RecoveryStats {
        final_version: store.current_version(),
        ..Default::default()
    };

    for entry in entries {
        stats.max_txn_id = stats.max_txn_id.max(entry.txn_id);
        if entry.version <= stats.final_version {
            stats.txns_skipped += 1;
            continue;
        }
        stats.writes_applied += entry.writes.len();
        stats.deletes_applied += entry.deletes.len();
        stats.final_version = entry.version;
        store.apply_batch(entry.writes, entry.deletes, entry.version)?;
        stats.txns_replayed += 1;
    }

    Ok(stats)
}

/// Result of recovery
pub struct RecoveryResult {
    /// Store with every committed transaction applied
    pub storage: RecordStore,
    /// Manager continuing after the recovered version and txn id
    pub txn_manager: TransactionManager,
    /// Log reopened for appending
    pub log: CommitLog,
    /// What happened
    pub stats: RecoveryStats,
}

/// Coordinates recovery on open
pub struct RecoveryCoordinator {
    log_path: PathBuf,
    mode: DurabilityMode,
}

impl RecoveryCoordinator {
    /// Recover from the log at `log_path`
    pub fn new(log_path: impl Into<PathBuf>, mode: DurabilityMode) -> Self {
        RecoveryCoordinator {
            log_path: log_path.into(),
            mode,
        }
    }

    /// Log path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Perform recovery
    pub fn recover(&self) -> Result<RecoveryResult> {
        let (log, scan) = CommitLog::open_recovering(&self.log_path, self.mode)?;
        let discarded_bytes = scan.discarded_bytes;

        let storage = RecordStore::new();
        let mut stats = replay_entries(scan.entries, &storage)?;
        stats.discarded_bytes = discarded_bytes;

        let txn_manager = TransactionManager::with_txn_id(stats.final_version, stats.max_txn_id);

        info!(
            target: "timekeep::db",
            path = %self.log_path.display(),
            txns = stats.txns_replayed,
            writes = stats.writes_applied,
            deletes = stats.deletes_applied,
            version = stats.final_version,
            discarded_bytes,
            "Recovered from commit log"
        );

        Ok(RecoveryResult {
            storage,
            txn_manager,
            log,
            stats,
        })
    }
}
