//! Versioned wrapper type
//!
//! Every read from the record store returns data wrapped in `Versioned<T>`.
//! The version is the commit version of the transaction that last wrote the
//! record; transactions record it in their read-set and validate it at commit.

use serde::{Deserialize, Serialize};

/// A value together with the commit version that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The actual value
    pub value: T,
    /// Commit version that wrote this value
    pub version: u64,
}

impl<T> Versioned<T> {
    /// Wrap a value with its version
    pub fn new(value: T, version: u64) -> Self {
        Versioned { value, version }
    }

    /// Map the inner value, keeping the version
    pub fn map<U, F>(self, f: F) -> Versioned<U>
    where
        F: FnOnce(T) -> U,
    {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }

    /// Borrow the inner value
    pub fn as_ref(&self) -> Versioned<&T> {
        Versioned {
            value: &self.value,
            version: self.version,
        }
    }

    /// Unwrap into the inner value
    pub fn into_value(self) -> T {
        self.value
    }
}
