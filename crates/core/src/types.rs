//! Core types for Timekeep
//!
//! This module defines the foundational types:
//! - RecordId: Globally unique 128-bit identifier for every record
//! - EntityKind: Discriminates between the four record collections
//! - RecordKey: Composite key (kind + id) used by the record store
//! - Timestamp: UTC wall-clock instant used for record timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// UTC instant used for `created_at`, `updated_at` and time-entry bounds
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for a record
///
/// A RecordId is a wrapper around a UUID v4. It is assigned when a record
/// is first created and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random RecordId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RecordId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a RecordId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this RecordId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Kind of record stored in the unified record store
///
/// The store keeps every record in one ordered map keyed by `RecordKey`.
/// The kind is the first component of the key, so all records of one kind
/// are contiguous and can be range-scanned.
///
/// These byte values are part of the commit-log format and MUST NOT change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Client company
    Client = 0x01,
    /// Contact person of a client
    Contact = 0x02,
    /// Project of a client
    Project = 0x03,
    /// Logged interval of work against a project
    TimeEntry = 0x04,
}

impl EntityKind {
    /// All kinds, in key order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Client,
        EntityKind::Contact,
        EntityKind::Project,
        EntityKind::TimeEntry,
    ];

    /// Convert to byte representation
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(EntityKind::Client),
            0x02 => Some(EntityKind::Contact),
            0x03 => Some(EntityKind::Project),
            0x04 => Some(EntityKind::TimeEntry),
            _ => None,
        }
    }

    /// Snake-case name used in errors and field paths
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Contact => "contact",
            EntityKind::Project => "project",
            EntityKind::TimeEntry => "time_entry",
        }
    }

    /// Singular human-readable name
    pub fn verbose_name(&self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Contact => "Contact",
            EntityKind::Project => "Project",
            EntityKind::TimeEntry => "Time Entry",
        }
    }

    /// Plural human-readable name
    pub fn verbose_name_plural(&self) -> &'static str {
        match self {
            EntityKind::Client => "Clients",
            EntityKind::Contact => "Contacts",
            EntityKind::Project => "Projects",
            EntityKind::TimeEntry => "Time Entries",
        }
    }

    /// Kinds owned by this kind (deleted with it)
    pub fn owned_kinds(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Client => &[EntityKind::Contact, EntityKind::Project],
            EntityKind::Project => &[EntityKind::TimeEntry],
            EntityKind::Contact | EntityKind::TimeEntry => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unified key for all records
///
/// # Ordering
///
/// Keys are ordered by: kind → id. All keys of one kind are grouped,
/// which makes `RecordKey::kind_start(kind)..` a valid scan range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Record kind
    pub kind: EntityKind,
    /// Record identifier
    pub id: RecordId,
}

impl RecordKey {
    /// Create a new key
    pub fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }

    /// Smallest possible key of a kind, for range scans
    pub fn kind_start(kind: EntityKind) -> Self {
        Self::new(kind, RecordId::from_bytes([0u8; 16]))
    }

    /// Largest possible key of a kind, for range scans
    pub fn kind_end(kind: EntityKind) -> Self {
        Self::new(kind, RecordId::from_bytes([0xFF; 16]))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
