//! Durability layer for Timekeep
//!
//! This crate handles everything that touches disk for committed data:
//!
//! - Commit log: one CRC-checked record per committed transaction
//! - Durability modes: Cache, Standard (default), Always
//! - Recovery reader: decodes intact entries and truncates a torn tail

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commit_log;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod mode;

pub use commit_log::{read_log, CommitLog, LogScan};
pub use encoding::{decode_entry, encode_entry};
pub use entry::{LogEntry, TYPE_COMMIT};
pub use error::{LogError, LogResult};
pub use mode::DurabilityMode;
