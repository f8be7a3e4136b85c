//! Database builder for fluent configuration

use std::path::PathBuf;
use std::sync::Arc;
use timekeep_core::{Limits, Result, TimekeepError};
use timekeep_durability::DurabilityMode;

use super::{Database, RetryConfig, TimekeepConfig};

// ============================================================================
// Database Builder Pattern
// ============================================================================

/// Builder for Database configuration
///
/// # Three Ways to Open a Database
///
/// ```ignore
/// use timekeep_engine::Database;
///
/// // 1. Simple open, settings from timekeep.toml
/// let db = Database::open("/data/timekeep")?;
///
/// // 2. Builder for explicit settings (written back to timekeep.toml)
/// let db = Database::builder()
///     .path("/data/timekeep")
///     .always()
///     .retry(RetryConfig::no_retry())
///     .open()?;
///
/// // 3. Ephemeral (no files, testing)
/// let db = Database::ephemeral()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    /// Database path (required for open())
    path: Option<PathBuf>,
    /// Settings applied on open
    config: TimekeepConfig,
}

impl DatabaseBuilder {
    /// Create new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set database path
    ///
    /// Required for `open()`. Use `ephemeral()` for no-file testing.
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Append and flush every commit (default)
    pub fn standard(mut self) -> Self {
        self.config = self.config.with_durability(DurabilityMode::Standard);
        self
    }

    /// Append, flush and fsync every commit
    pub fn always(mut self) -> Self {
        self.config = self.config.with_durability(DurabilityMode::Always);
        self
    }

    /// Retry behavior for store operations
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Field length limits
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Open a disk-backed database at the configured path
    ///
    /// # Errors
    ///
    /// Returns `Config` if no path was set, otherwise any error from
    /// `Database::open_with_config`.
    pub fn open(self) -> Result<Arc<Database>> {
        let path = self.path.ok_or_else(|| {
            TimekeepError::config(
                "DatabaseBuilder::open() requires a path, use ephemeral() for testing",
            )
        })?;
        Database::open_with_config(path, self.config)
    }

    /// Open an ephemeral database with the configured retry and limits
    pub fn ephemeral(self) -> Result<Arc<Database>> {
        Database::ephemeral_with_config(self.config)
    }
}
