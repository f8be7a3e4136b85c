//! Transaction coordinator for managing transaction lifecycle
//!
//! The TransactionCoordinator wraps TransactionManager and adds:
//! - Active transaction tracking
//! - Transaction metrics (started, committed, aborted)
//! - Commit rate calculation

use std::sync::atomic::{AtomicU64, Ordering};

use timekeep_concurrency::{TransactionContext, TransactionManager};
use timekeep_core::{Result, SnapshotView, Storage, TimekeepError};
use timekeep_durability::CommitLog;
use timekeep_storage::RecordStore;
use tracing::{debug, warn};

/// Coordinates transaction lifecycle and commit
pub struct TransactionCoordinator {
    manager: TransactionManager,
    active_count: AtomicU64,
    total_started: AtomicU64,
    total_committed: AtomicU64,
    total_aborted: AtomicU64,
}

impl TransactionCoordinator {
    /// Coordinator starting at `initial_version`
    pub fn new(initial_version: u64) -> Self {
        Self::with_manager(TransactionManager::new(initial_version))
    }

    /// Coordinator around an existing manager (e.g. from recovery)
    pub fn with_manager(manager: TransactionManager) -> Self {
        Self {
            manager,
            active_count: AtomicU64::new(0),
            total_started: AtomicU64::new(0),
            total_committed: AtomicU64::new(0),
            total_aborted: AtomicU64::new(0),
        }
    }

    /// Begin a transaction over a fresh snapshot of `storage`
    pub fn start_transaction(&self, storage: &RecordStore) -> TransactionContext {
        let txn_id = self.manager.next_txn_id();
        let snapshot = storage.create_snapshot();
        self.record_start();

        debug!(target: "timekeep::txn", txn_id, start_version = snapshot.version(), "Transaction started");

        TransactionContext::with_snapshot(txn_id, Box::new(snapshot))
    }

    /// Commit through the manager and record the outcome
    pub fn commit<S: Storage>(
        &self,
        txn: &mut TransactionContext,
        store: &S,
        log: Option<&CommitLog>,
    ) -> Result<u64> {
        match self.manager.commit(txn, store, log) {
            Ok(version) => {
                self.record_commit();
                debug!(target: "timekeep::txn", txn_id = txn.txn_id, version, "Transaction committed");
                Ok(version)
            }
            Err(e) => {
                self.record_abort();
                warn!(target: "timekeep::txn", txn_id = txn.txn_id, error = %e, "Transaction aborted");
                Err(TimekeepError::from(e))
            }
        }
    }

    /// Count a started transaction
    pub fn record_start(&self) {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a committed transaction
    pub fn record_commit(&self) {
        self.decrement_active();
        self.total_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an aborted transaction
    pub fn record_abort(&self) {
        self.decrement_active();
        self.total_aborted.fetch_add(1, Ordering::Relaxed);
    }

    fn decrement_active(&self) {
        // Saturating decrement
        let _ = self
            .active_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
                Some(x.saturating_sub(1))
            });
    }

    /// Current global version
    pub fn current_version(&self) -> u64 {
        self.manager.current_version()
    }

    /// Snapshot of the counters
    pub fn metrics(&self) -> TransactionMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        TransactionMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_aborted: self.total_aborted.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }

    /// Transactions started and not yet finished
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until no transaction is active, up to `timeout`
    pub fn wait_for_idle(&self, timeout: std::time::Duration) -> bool {
        let start = std::time::Instant::now();
        let sleep_duration = std::time::Duration::from_millis(1);

        while self.active_count.load(Ordering::SeqCst) > 0 {
            if start.elapsed() > timeout {
                return false;
            }
            std::thread::sleep(sleep_duration);
        }
        true
    }
}

/// Transaction counters
#[derive(Debug, Clone)]
pub struct TransactionMetrics {
    /// Transactions currently running
    pub active_count: u64,
    /// Transactions started
    pub total_started: u64,
    /// Transactions committed
    pub total_committed: u64,
    /// Transactions aborted (closure error or failed commit)
    pub total_aborted: u64,
    /// committed / started
    pub commit_rate: f64,
}

impl TransactionMetrics {
    /// Committed plus aborted
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_aborted
    }

    /// aborted / started
    pub fn abort_rate(&self) -> f64 {
        if self.total_started > 0 {
            self.total_aborted as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
