//! Error types for Timekeep
//!
//! This module defines the single error enum used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! | Variant | Meaning | Retried |
//! |---------|---------|---------|
//! | `Validation` | Missing required field or field constraint violated | no |
//! | `NotFound` | Operation references an identifier that does not exist | no |
//! | `Integrity` | Commit would orphan records or reference a missing parent | no |
//! | `Conflict` | Transient transaction conflict (stale read, duplicate primary) | once |
//!
//! The remaining variants are infrastructure failures (I/O, encoding, config).

use crate::types::{EntityKind, RecordId};
use std::io;
use thiserror::Error;

/// Result type alias for Timekeep operations
pub type Result<T> = std::result::Result<T, TimekeepError>;

/// Error types for the Timekeep record store
#[derive(Debug, Error)]
pub enum TimekeepError {
    /// A field value is missing or violates a constraint
    #[error("invalid {entity} field '{field}': {reason}")]
    Validation {
        /// Entity being written
        entity: EntityKind,
        /// Offending field name
        field: String,
        /// Human-readable reason
        reason: String,
    },

    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing record
        entity: EntityKind,
        /// Identifier that was looked up
        id: RecordId,
    },

    /// Referential integrity would be broken by the commit
    #[error("integrity violation: {reason}")]
    Integrity {
        /// Description of the violation
        reason: String,
    },

    /// Transaction aborted due to a concurrent modification
    #[error("transaction conflict: {reason}")]
    Conflict {
        /// Description of the conflict
        reason: String,
    },

    /// Transaction used after commit or abort
    #[error("transaction not active (state: {state})")]
    TransactionNotActive {
        /// State the transaction was found in
        state: String,
    },

    /// Database is shutting down and no longer accepts transactions
    #[error("database is shutting down")]
    Shutdown,

    /// Storage layer error
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid configuration (config file or admin configuration)
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (config file, commit log, lock file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TimekeepError {
    /// Build a validation error for an entity field
    pub fn validation(
        entity: EntityKind,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TimekeepError::Validation {
            entity,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a not-found error
    pub fn not_found(entity: EntityKind, id: RecordId) -> Self {
        TimekeepError::NotFound { entity, id }
    }

    /// Build an integrity error
    pub fn integrity(reason: impl Into<String>) -> Self {
        TimekeepError::Integrity {
            reason: reason.into(),
        }
    }

    /// Build a conflict error
    pub fn conflict(reason: impl Into<String>) -> Self {
        TimekeepError::Conflict {
            reason: reason.into(),
        }
    }

    /// Build a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        TimekeepError::Storage(message.into())
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        TimekeepError::Config(message.into())
    }

    /// True for transient transaction conflicts
    pub fn is_conflict(&self) -> bool {
        matches!(self, TimekeepError::Conflict { .. })
    }

    /// True if retrying the whole transaction may succeed
    ///
    /// Only conflicts qualify. Validation, not-found and integrity errors
    /// are deterministic for a given input and store state.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// True for validation errors
    pub fn is_validation(&self) -> bool {
        matches!(self, TimekeepError::Validation { .. })
    }

    /// True for not-found errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, TimekeepError::NotFound { .. })
    }
}

impl From<bincode::Error> for TimekeepError {
    fn from(e: bincode::Error) -> Self {
        TimekeepError::Serialization(e.to_string())
    }
}
