//! Length limits for record fields
//!
//! Character fields (names, address lines, emails, phone numbers) are bounded
//! by `max_char_length`; free-text fields (project description, time-entry
//! notes) by `max_text_length`. Lengths are counted in characters, not bytes.
//!
//! Custom limits can be set at database open time through the `[limits]`
//! section of `timekeep.toml`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum length of a character field
pub const DEFAULT_MAX_CHAR_LENGTH: usize = 255;

/// Default maximum length of a free-text field
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 65_535;

/// Length limits enforced on every write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum character-field length (default: 255)
    #[serde(default = "default_max_char_length")]
    pub max_char_length: usize,

    /// Maximum free-text length (default: 65535)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_max_char_length() -> usize {
    DEFAULT_MAX_CHAR_LENGTH
}

fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_char_length: DEFAULT_MAX_CHAR_LENGTH,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_char_length: 16,
            max_text_length: 64,
        }
    }

    /// Validate a character-field value
    pub fn validate_char(&self, value: &str) -> Result<(), LimitError> {
        check_length(value, self.max_char_length)
    }

    /// Validate a free-text value
    pub fn validate_text(&self, value: &str) -> Result<(), LimitError> {
        check_length(value, self.max_text_length)
    }
}

fn check_length(value: &str, max: usize) -> Result<(), LimitError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(LimitError::TooLong { actual, max });
    }
    Ok(())
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Value exceeds the configured maximum length
    #[error("ensure this value has at most {max} characters (it has {actual})")]
    TooLong {
        /// Actual length in characters
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
