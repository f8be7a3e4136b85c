//! Append-only commit log
//!
//! ## File Operations
//!
//! - `CommitLog::open()` - open an existing log or create a new one
//! - `CommitLog::append()` - write one encoded entry at the end
//! - `CommitLog::flush()` / `CommitLog::fsync()`
//! - `read_log()` - decode every intact entry from the start
//! - `CommitLog::open_recovering()` - read, truncate a damaged tail, reopen
//!
//! The log is only ever appended to while open. A crash mid-append leaves a
//! torn frame at the tail; recovery stops at the first frame that does not
//! decode and truncates the file there, so later appends start on a clean
//! boundary.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::encoding::{decode_entry, encode_entry};
use crate::entry::LogEntry;
use crate::error::LogResult;
use crate::mode::DurabilityMode;

/// Result of scanning a log file
#[derive(Debug, Default)]
pub struct LogScan {
    /// Intact entries, in file order
    pub entries: Vec<LogEntry>,
    /// Length of the intact prefix in bytes
    pub valid_len: u64,
    /// Bytes after the intact prefix
    pub discarded_bytes: u64,
}

impl LogScan {
    /// True if bytes after the intact prefix were found
    pub fn has_damaged_tail(&self) -> bool {
        self.discarded_bytes > 0
    }
}

/// Read every intact entry of the log at `path`
///
/// A missing file reads as empty. Decoding stops at the first incomplete or
/// corrupt frame; everything from there on is reported as discarded.
pub fn read_log(path: &Path) -> LogResult<LogScan> {
    let mut bytes = Vec::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_end(&mut bytes)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LogScan::default()),
        Err(e) => return Err(e.into()),
    }

    let mut scan = LogScan::default();
    let mut pos = 0usize;
    while pos < bytes.len() {
        match decode_entry(&bytes[pos..], pos as u64) {
            Ok((entry, consumed)) => {
                scan.entries.push(entry);
                pos += consumed;
            }
            Err(e) if e.is_damage() => {
                warn!(
                    target: "timekeep::log",
                    path = %path.display(),
                    offset = pos,
                    error = %e,
                    "Commit log damaged, discarding tail"
                );
                break;
            }
            Err(e) => return Err(e),
        }
    }
    scan.valid_len = pos as u64;
    scan.discarded_bytes = (bytes.len() - pos) as u64;
    Ok(scan)
}

/// Append-only commit log file
#[derive(Debug)]
pub struct CommitLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    size: AtomicU64,
    mode: DurabilityMode,
}

impl CommitLog {
    /// Open the log at `path`, creating it and its parent directory if needed
    pub fn open(path: impl AsRef<Path>, mode: DurabilityMode) -> LogResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        debug!(target: "timekeep::log", path = %path.display(), size, %mode, "Opened commit log");

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            size: AtomicU64::new(size),
            mode,
        })
    }

    /// Read the log, truncate any damaged tail, then open it for appending
    ///
    /// Returns the open log together with the intact entries to replay.
    pub fn open_recovering(
        path: impl AsRef<Path>,
        mode: DurabilityMode,
    ) -> LogResult<(Self, LogScan)> {
        let path = path.as_ref();
        let scan = read_log(path)?;
        if scan.has_damaged_tail() {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
            warn!(
                target: "timekeep::log",
                path = %path.display(),
                valid_len = scan.valid_len,
                discarded = scan.discarded_bytes,
                "Truncated commit log"
            );
        }
        let log = Self::open(path, mode)?;
        Ok((log, scan))
    }

    /// Append one entry
    ///
    /// The entry is flushed to the OS before returning; in `Always` mode it
    /// is also fsynced. Returns the offset the entry was written at.
    pub fn append(&self, entry: &LogEntry) -> LogResult<u64> {
        let encoded = encode_entry(entry)?;
        let mut writer = self.writer.lock();
        let offset = self.size.load(Ordering::SeqCst);

        writer.write_all(&encoded)?;
        writer.flush()?;
        if self.mode.requires_fsync() {
            writer.get_ref().sync_all()?;
        }

        self.size
            .store(offset + encoded.len() as u64, Ordering::SeqCst);
        Ok(offset)
    }

    /// Flush buffered bytes to the OS
    pub fn flush(&self) -> LogResult<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    /// Flush and fsync
    pub fn fsync(&self) -> LogResult<()> {
        let mut writer = self.writer.lock();
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Current size of the log in bytes
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::SeqCst)
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode the log was opened with
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }
}
