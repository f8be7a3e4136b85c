//! Durability modes
//!
//! Selected once per database at open time:
//!
//! | Mode | Commit log | fsync per commit |
//! |------|------------|------------------|
//! | `Cache` | none | no |
//! | `Standard` (default) | appended and flushed | no |
//! | `Always` | appended and flushed | yes |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How committed transactions are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurabilityMode {
    /// In-memory only; all data is lost when the process exits
    Cache,
    /// Append each commit to the log and flush it to the OS
    #[default]
    Standard,
    /// Append, flush and fsync each commit before it becomes visible
    Always,
}

impl DurabilityMode {
    /// True unless the mode is `Cache`
    pub fn requires_log(&self) -> bool {
        !matches!(self, DurabilityMode::Cache)
    }

    /// True only for `Always`
    pub fn requires_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Always)
    }

    /// Config-file spelling of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            DurabilityMode::Cache => "cache",
            DurabilityMode::Standard => "standard",
            DurabilityMode::Always => "always",
        }
    }
}

impl fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cache" => Ok(DurabilityMode::Cache),
            "standard" => Ok(DurabilityMode::Standard),
            "always" => Ok(DurabilityMode::Always),
            other => Err(format!(
                "unknown durability mode '{}' (expected \"standard\" or \"always\")",
                other
            )),
        }
    }
}
