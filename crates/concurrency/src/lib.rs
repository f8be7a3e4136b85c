//! Concurrency layer for Timekeep
//!
//! This crate implements optimistic concurrency control (OCC) with:
//! - TransactionContext: read/write/delete set tracking over a snapshot
//! - Commit-time validation: stale reads and record constraints
//! - TransactionManager: validate, log, apply under one commit lock
//! - Recovery: replay of the commit log on open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod recovery;
pub mod transaction;
pub mod validation;

pub use manager::{CommitError, TransactionManager};
pub use recovery::{replay_entries, RecoveryCoordinator, RecoveryResult, RecoveryStats};
pub use transaction::{PendingOperations, TransactionContext, TransactionStatus};
pub use validation::{
    validate_constraints, validate_read_set, validate_transaction, ConflictType,
    IntegrityViolation, ValidationResult,
};
