//! Global database registry for singleton management
//!
//! Ensures only one Database instance exists per filesystem path.
//! Uses weak references to allow cleanup when all references are dropped.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Weak;

use super::Database;

// =============================================================================
// Global Database Registry
// =============================================================================
//
// Opening the same database path twice returns the same Database instance,
// so two instances never append to the same commit log. Entries are weak and
// removed when the database is dropped.

/// Global registry of open databases (canonical path -> weak reference)
pub static OPEN_DATABASES: Lazy<Mutex<HashMap<PathBuf, Weak<Database>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
