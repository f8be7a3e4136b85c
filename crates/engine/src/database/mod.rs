//! Database struct and open/close logic
//!
//! This module provides the main Database struct that orchestrates:
//! - Storage initialization
//! - Commit log opening
//! - Automatic recovery on startup
//! - Transaction API
//!
//! ## Transaction API
//!
//! 1. **Closure API** (recommended): `db.transaction(|txn| { ... })`
//!    - Automatic commit on success, abort on error
//!    - Returns the closure's return value
//!    - `db.retrying(|txn| ...)` re-runs the closure on transient conflict
//!
//! 2. **Manual API**: `begin_transaction()` + `commit_transaction()`
//!    - For cases requiring external control over commit timing

pub mod config;
mod registry;
mod transactions;

mod builder;

pub use builder::DatabaseBuilder;
pub use config::{TimekeepConfig, CONFIG_FILE_NAME};
pub use registry::OPEN_DATABASES;
pub use transactions::RetryConfig;

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use timekeep_concurrency::{RecoveryCoordinator, TransactionContext};
use timekeep_core::{Limits, Result, TimekeepError};
use timekeep_durability::{CommitLog, DurabilityMode};
use timekeep_storage::{RecordSnapshot, RecordStore};
use tracing::{info, warn};

use crate::coordinator::{TransactionCoordinator, TransactionMetrics};

/// Commit log file name inside the data directory
pub const LOG_FILE_NAME: &str = "commit.log";

/// Exclusive process lock file name inside the data directory
pub const LOCK_FILE_NAME: &str = ".lock";

/// Whether the database has files behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// No files; data lost on drop
    Ephemeral,
    /// Commit log in a data directory
    Disk,
}

/// Main database struct
///
/// Owns the record store, the optional commit log and the transaction
/// coordinator. Shared as `Arc<Database>` by the record stores.
pub struct Database {
    /// Canonical data directory (empty for ephemeral databases)
    data_dir: PathBuf,

    /// In-memory record store
    storage: Arc<RecordStore>,

    /// Commit log (None for ephemeral databases)
    log: Option<CommitLog>,

    /// Disk-backed or ephemeral
    persistence_mode: PersistenceMode,

    /// Transaction coordination and metrics
    coordinator: TransactionCoordinator,

    /// Durability mode in effect
    durability_mode: DurabilityMode,

    /// Cleared by shutdown()
    accepting_transactions: AtomicBool,

    /// Settings in effect
    config: RwLock<TimekeepConfig>,

    /// Exclusive lock on `<dir>/.lock`, held for the database's lifetime
    _lock_file: Option<File>,
}

impl Database {
    /// Open database at given path with automatic recovery
    ///
    /// Reads `timekeep.toml` from the data directory, creating it with
    /// defaults on first open.
    ///
    /// Opening the same path from multiple threads returns the same
    /// `Arc<Database>`.
    ///
    /// # Flow
    ///
    /// 1. Create data directory if needed
    /// 2. Read or create `timekeep.toml`
    /// 3. Check registry for existing instance at this path
    /// 4. Otherwise: lock the directory, replay the commit log, register
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        TimekeepConfig::write_default_if_missing(&config_path)?;
        let cfg = TimekeepConfig::from_file(&config_path)?;

        Self::open_with_mode_and_config(data_dir, cfg)
    }

    /// Open database at the given path with an explicit configuration.
    ///
    /// The supplied config is written to `timekeep.toml` so that later
    /// `Database::open()` calls pick up the same settings.
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: TimekeepConfig) -> Result<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        cfg.durability_mode()?;
        cfg.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;

        Self::open_with_mode_and_config(data_dir, cfg)
    }

    /// Builder for explicit settings
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    fn open_with_mode_and_config(data_dir: PathBuf, cfg: TimekeepConfig) -> Result<Arc<Self>> {
        let durability_mode = cfg.durability_mode()?;

        // Canonicalize path for consistent registry keys
        let canonical_path = data_dir.canonicalize()?;

        // Held for the whole open so two threads cannot both create an instance
        let mut registry = OPEN_DATABASES.lock();

        if let Some(weak) = registry.get(&canonical_path) {
            if let Some(db) = weak.upgrade() {
                info!(target: "timekeep::db", path = ?canonical_path, "Returning existing database instance");
                return Ok(db);
            }
        }

        let lock_path = canonical_path.join(LOCK_FILE_NAME);
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| TimekeepError::storage(format!("failed to open lock file: {}", e)))?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            TimekeepError::storage(format!(
                "database at '{}' is already in use by another process",
                canonical_path.display()
            ))
        })?;

        let recovery =
            RecoveryCoordinator::new(canonical_path.join(LOG_FILE_NAME), durability_mode);
        let result = recovery.recover()?;

        if result.stats.discarded_bytes > 0 {
            warn!(
                target: "timekeep::db",
                discarded_bytes = result.stats.discarded_bytes,
                "Discarded damaged commit log tail"
            );
        }
        info!(
            target: "timekeep::db",
            path = %canonical_path.display(),
            durability = %durability_mode,
            records = result.storage.len(),
            version = result.stats.final_version,
            "Database opened"
        );

        let db = Arc::new(Self {
            data_dir: canonical_path.clone(),
            storage: Arc::new(result.storage),
            log: Some(result.log),
            persistence_mode: PersistenceMode::Disk,
            coordinator: TransactionCoordinator::with_manager(result.txn_manager),
            durability_mode,
            accepting_transactions: AtomicBool::new(true),
            config: RwLock::new(cfg),
            _lock_file: Some(lock_file),
        });

        registry.insert(canonical_path, Arc::downgrade(&db));

        Ok(db)
    }

    /// Create an ephemeral database with no disk I/O
    ///
    /// - Creates no files or directories
    /// - Has no commit log and cannot recover
    /// - Is NOT registered in the global registry
    pub fn ephemeral() -> Result<Arc<Self>> {
        Self::ephemeral_with_config(TimekeepConfig::default())
    }

    /// Ephemeral database with explicit retry and limit settings
    ///
    /// The durability setting is ignored: ephemeral databases never log.
    pub fn ephemeral_with_config(cfg: TimekeepConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            data_dir: PathBuf::new(),
            storage: Arc::new(RecordStore::new()),
            log: None,
            persistence_mode: PersistenceMode::Ephemeral,
            coordinator: TransactionCoordinator::new(0),
            durability_mode: DurabilityMode::Cache,
            accepting_transactions: AtomicBool::new(true),
            config: RwLock::new(cfg),
            _lock_file: None,
        }))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Record store (read-only use outside transactions)
    pub fn storage(&self) -> &Arc<RecordStore> {
        &self.storage
    }

    /// Consistent point-in-time view of every record
    pub fn snapshot(&self) -> RecordSnapshot {
        self.storage.create_snapshot()
    }

    /// Data directory (empty for ephemeral databases)
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// True if the database has no files
    pub fn is_ephemeral(&self) -> bool {
        self.persistence_mode == PersistenceMode::Ephemeral
    }

    /// Durability mode in effect
    pub fn durability_mode(&self) -> DurabilityMode {
        self.durability_mode
    }

    /// Settings in effect
    pub fn config(&self) -> TimekeepConfig {
        self.config.read().clone()
    }

    /// Field length limits applied to writes
    pub fn limits(&self) -> Limits {
        self.config.read().limits
    }

    /// Retry behavior of store operations
    pub fn retry_config(&self) -> RetryConfig {
        self.config.read().retry.clone()
    }

    /// Global commit version
    pub fn current_version(&self) -> u64 {
        self.coordinator.current_version()
    }

    /// Transaction counters
    pub fn metrics(&self) -> TransactionMetrics {
        self.coordinator.metrics()
    }

    /// False after shutdown()
    pub fn is_open(&self) -> bool {
        self.accepting_transactions.load(Ordering::SeqCst)
    }

    /// Flush the commit log to the OS (no-op for ephemeral databases)
    pub fn flush(&self) -> Result<()> {
        if let Some(log) = &self.log {
            log.flush()?;
        }
        Ok(())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    fn check_accepting(&self) -> Result<()> {
        if !self.is_open() {
            return Err(TimekeepError::Shutdown);
        }
        Ok(())
    }

    /// Execute one transaction attempt: commit on success, abort on error.
    fn run_single_attempt<T>(
        &self,
        txn: &mut TransactionContext,
        result: Result<T>,
    ) -> Result<(T, u64)> {
        match result {
            Ok(value) => {
                let commit_version = self.commit_transaction(txn)?;
                Ok((value, commit_version))
            }
            Err(e) => {
                let _ = txn.mark_aborted(format!("closure error: {}", e));
                self.coordinator.record_abort();
                Err(e)
            }
        }
    }

    /// Execute a transaction with the given closure
    ///
    /// Commits when the closure returns `Ok`, aborts when it returns `Err`.
    ///
    /// # Example
    /// ```text
    /// let client = db.transaction(|txn| txn.require::<Client>(id))?;
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TransactionContext) -> Result<T>,
    {
        self.transaction_with_version(f).map(|(value, _)| value)
    }

    /// Like `transaction()` but also returns the commit version
    pub fn transaction_with_version<F, T>(&self, f: F) -> Result<(T, u64)>
    where
        F: FnOnce(&mut TransactionContext) -> Result<T>,
    {
        self.check_accepting()?;
        let mut txn = self.begin_transaction();
        let result = f(&mut txn);
        self.run_single_attempt(&mut txn, result)
    }

    /// Execute a transaction with automatic retry on conflict
    ///
    /// The closure is called repeatedly until either:
    /// - The transaction commits successfully
    /// - A non-conflict error occurs (not retried)
    /// - Maximum retries are exceeded (the last conflict is returned)
    pub fn transaction_with_retry<F, T>(&self, config: &RetryConfig, f: F) -> Result<T>
    where
        F: Fn(&mut TransactionContext) -> Result<T>,
    {
        self.check_accepting()?;

        let mut attempt = 0;
        loop {
            let mut txn = self.begin_transaction();
            let result = f(&mut txn);
            match self.run_single_attempt(&mut txn, result) {
                Ok((value, _)) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < config.max_retries => {
                    warn!(target: "timekeep::txn", attempt, error = %e, "Retrying after conflict");
                    std::thread::sleep(config.calculate_delay(attempt));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `transaction_with_retry` using the configured `RetryConfig`
    pub fn retrying<F, T>(&self, f: F) -> Result<T>
    where
        F: Fn(&mut TransactionContext) -> Result<T>,
    {
        let config = self.retry_config();
        self.transaction_with_retry(&config, f)
    }

    /// Begin a new transaction (for manual control)
    ///
    /// Prefer the closure API; a transaction begun here must be passed to
    /// `commit_transaction()` or aborted.
    pub fn begin_transaction(&self) -> TransactionContext {
        self.coordinator.start_transaction(&self.storage)
    }

    /// Commit a transaction
    ///
    /// Returns the commit version assigned to all writes of the transaction.
    ///
    /// # Errors
    /// - `Conflict` - stale read or duplicate primary contact
    /// - `Integrity` - missing parent or orphaned child
    /// - `TransactionNotActive` - transaction not in Active state
    pub fn commit_transaction(&self, txn: &mut TransactionContext) -> Result<u64> {
        let log = if self.durability_mode.requires_log() {
            self.log.as_ref()
        } else {
            None
        };
        self.coordinator.commit(txn, self.storage.as_ref(), log)
    }

    // ========================================================================
    // Graceful Shutdown
    // ========================================================================

    /// Stop accepting transactions, wait for running ones, flush the log
    pub fn shutdown(&self) -> Result<()> {
        self.accepting_transactions.store(false, Ordering::SeqCst);

        let timeout = std::time::Duration::from_secs(30);
        if !self.coordinator.wait_for_idle(timeout) {
            warn!(
                target: "timekeep::db",
                active = self.coordinator.active_count(),
                "Shutdown timed out waiting for transactions"
            );
        }

        if let Some(log) = &self.log {
            log.fsync()?;
        }
        info!(target: "timekeep::db", path = %self.data_dir.display(), "Database shut down");
        Ok(())
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("persistence_mode", &self.persistence_mode)
            .field("durability_mode", &self.durability_mode)
            .field("version", &self.current_version())
            .field("records", &self.storage.len())
            .finish()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = self.flush();

        if self.persistence_mode == PersistenceMode::Disk && !self.data_dir.as_os_str().is_empty() {
            let mut registry = OPEN_DATABASES.lock();
            // Only remove our own entry; a new instance may already be registered
            if registry
                .get(&self.data_dir)
                .map_or(false, |weak| weak.strong_count() == 0)
            {
                registry.remove(&self.data_dir);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
