//! Commit log errors

use std::io;
use thiserror::Error;
use timekeep_core::TimekeepError;

/// Result type for commit log operations
pub type LogResult<T> = std::result::Result<T, LogError>;

/// Errors raised while writing or reading the commit log
#[derive(Debug, Error)]
pub enum LogError {
    /// Buffer ends before the entry does (torn write at the tail)
    #[error("incomplete entry at offset {offset}: have {have} bytes, need {needed}")]
    Incomplete {
        /// Offset of the entry
        offset: u64,
        /// Bytes available
        have: usize,
        /// Bytes required
        needed: usize,
    },

    /// Entry is structurally invalid or fails its checksum
    #[error("corrupt entry at offset {offset}: {reason}")]
    Corruption {
        /// Offset of the entry
        offset: u64,
        /// What was wrong
        reason: String,
    },

    /// Payload could not be encoded
    #[error("failed to encode entry: {0}")]
    Encode(#[from] bincode::Error),

    /// Underlying file error
    #[error("commit log I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LogError {
    /// True for damage that recovery truncates away
    pub fn is_damage(&self) -> bool {
        matches!(self, LogError::Incomplete { .. } | LogError::Corruption { .. })
    }
}

impl From<LogError> for TimekeepError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::Io(io) => TimekeepError::Io(io),
            LogError::Encode(err) => TimekeepError::Serialization(err.to_string()),
            other => TimekeepError::storage(other.to_string()),
        }
    }
}
