//! Database configuration via `timekeep.toml`
//!
//! On first open, a default `timekeep.toml` is created in the data directory.
//! To change settings, edit the file and reopen, or pass an explicit
//! configuration to `Database::open_with_config`, which writes it back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use timekeep_core::{Limits, Result, TimekeepError};
use timekeep_durability::DurabilityMode;

use super::RetryConfig;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "timekeep.toml";

/// Database configuration loaded from `timekeep.toml`.
///
/// # Example
///
/// ```toml
/// durability = "standard"
///
/// [retry]
/// max_retries = 1
///
/// [limits]
/// max_char_length = 255
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimekeepConfig {
    /// Durability mode: `"standard"` or `"always"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Retry behavior for store operations.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Field length limits.
    #[serde(default)]
    pub limits: Limits,
}

fn default_durability_str() -> String {
    "standard".to_string()
}

impl Default for TimekeepConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            retry: RetryConfig::default(),
            limits: Limits::default(),
        }
    }
}

impl TimekeepConfig {
    /// Parse the durability string into a `DurabilityMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"standard"` or `"always"`.
    pub fn durability_mode(&self) -> Result<DurabilityMode> {
        match self.durability.as_str() {
            "standard" => Ok(DurabilityMode::Standard),
            "always" => Ok(DurabilityMode::Always),
            other => Err(TimekeepError::config(format!(
                "invalid durability mode '{}' in {}, expected \"standard\" or \"always\"",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Set the durability mode
    pub fn with_durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode.as_str().to_string();
        self
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Timekeep database configuration
#
# Durability mode: "standard" (default) or "always"
#   "standard" = every commit is appended and flushed to the OS
#   "always"   = every commit is also fsynced, zero data loss
durability = "standard"

# Retries on transient transaction conflicts
[retry]
max_retries = 1
base_delay_ms = 1
max_delay_ms = 50

# Field length limits, in characters
[limits]
max_char_length = 255
max_text_length = 65535
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TimekeepError::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: TimekeepConfig = toml::from_str(&content).map_err(|e| {
            TimekeepError::config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        // Validate the durability value eagerly
        config.durability_mode()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TimekeepError::Serialization(format!("config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
