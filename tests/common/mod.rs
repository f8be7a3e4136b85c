//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Once};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
pub use timekeep::*;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (shown on failure)
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// 2024-01-01 at `h:m` UTC
pub fn at(h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
}

/// `day` January 2024 at `h:00` UTC
pub fn on(day: u32, h: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, day, h, 0, 0).unwrap()
}

// ============================================================================
// TestDb - database plus one store per entity
// ============================================================================

/// Test database wrapper with every store attached
pub struct TestDb {
    pub db: Arc<Database>,
    pub dir: Option<TempDir>,
    pub clients: ClientStore,
    pub contacts: ContactStore,
    pub projects: ProjectStore,
    pub entries: TimeEntryStore,
}

impl TestDb {
    fn wrap(db: Arc<Database>, dir: Option<TempDir>) -> Self {
        TestDb {
            clients: ClientStore::new(db.clone()),
            contacts: ContactStore::new(db.clone()),
            projects: ProjectStore::new(db.clone()),
            entries: TimeEntryStore::new(db.clone()),
            db,
            dir,
        }
    }

    /// Disk-backed database with standard durability
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open(dir.path()).expect("Failed to create test database");
        Self::wrap(db, Some(dir))
    }

    /// Disk-backed database that fsyncs every commit
    pub fn new_strict() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::builder()
            .path(dir.path())
            .always()
            .open()
            .expect("Failed to create test database");
        Self::wrap(db, Some(dir))
    }

    /// In-memory database
    pub fn new_in_memory() -> Self {
        init_tracing();
        let db = Database::ephemeral().expect("Failed to create ephemeral database");
        Self::wrap(db, None)
    }

    /// In-memory database with an explicit retry policy
    pub fn new_in_memory_with_retry(retry: RetryConfig) -> Self {
        init_tracing();
        let db = Database::builder()
            .retry(retry)
            .ephemeral()
            .expect("Failed to create ephemeral database");
        Self::wrap(db, None)
    }

    /// Data directory of a disk-backed database
    pub fn path(&self) -> &Path {
        self.dir.as_ref().expect("not disk-backed").path()
    }

    /// Drop every handle, then open the same directory again
    pub fn reopen(self) -> Self {
        self.reopen_after(|_| {})
    }

    /// Drop every handle, run `f` on the data directory, reopen
    pub fn reopen_after<F: FnOnce(&Path)>(self, f: F) -> Self {
        let TestDb {
            db,
            dir,
            clients,
            contacts,
            projects,
            entries,
        } = self;
        drop((clients, contacts, projects, entries));
        drop(db);
        let dir = dir.expect("reopen needs a disk-backed database");
        f(dir.path());
        let db = Database::open(dir.path()).expect("Failed to reopen database");
        Self::wrap(db, Some(dir))
    }

    // ========================================================================
    // Fixtures
    // ========================================================================

    /// Client with only a company name
    pub fn client(&self, name: &str) -> Client {
        self.clients.create(&ClientDraft::new(name)).unwrap()
    }

    /// Non-primary contact
    pub fn contact(&self, client: &Client, first: &str, last: &str) -> Contact {
        self.contacts
            .create(&ContactDraft::new(client.id, first, last))
            .unwrap()
    }

    /// Primary contact
    pub fn primary(&self, client: &Client, first: &str, last: &str) -> Contact {
        self.contacts
            .create(&ContactDraft::new(client.id, first, last).primary(true))
            .unwrap()
    }

    /// Open project
    pub fn project(&self, client: &Client, name: &str) -> Project {
        self.projects
            .create(&ProjectDraft::new(client.id, name))
            .unwrap()
    }

    /// Time entry over `start..end`
    pub fn entry(&self, project: &Project, start: Timestamp, end: Timestamp) -> TimeEntry {
        self.entries
            .create(&TimeEntryDraft::new(project.id, start, end))
            .unwrap()
    }

    /// Ids of the client's primary contacts
    pub fn primaries_of(&self, client: RecordId) -> Vec<RecordId> {
        self.contacts
            .list()
            .unwrap()
            .into_iter()
            .filter(|c| c.client == client && c.is_primary)
            .map(|c| c.id)
            .collect()
    }
}
