//! Record schema
//!
//! The four record types, their drafts and the `Entity` trait that lets the
//! engine and the presentation layer handle them generically.
//!
//! ## Lifecycle
//!
//! ```text
//! Draft (untrusted field values)
//!   → Entity::from_draft (validation + normalization)
//!   → Record (stored, versioned)
//!   → Entity::to_draft (for updates) → Entity::from_draft ...
//! ```
//!
//! Ownership: Client owns Contacts and Projects; Project owns TimeEntries.
//! `Entity::parent` names the owner and drives the store's children index.

mod client;
mod contact;
mod project;
mod record;
mod time_entry;

pub use client::{Client, ClientDraft};
pub use contact::{Contact, ContactDraft};
pub use project::{Project, ProjectDraft};
pub use record::{default_ordering_of, field_spec_of, fields_of, Record};
pub use time_entry::{TimeEntry, TimeEntryDraft};

use crate::error::Result;
use crate::limits::Limits;
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::value::{FieldSpec, FieldValue};

/// One component of an entity's default ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderField {
    /// Field name
    pub field: &'static str,
    /// Sort descending
    pub descending: bool,
}

impl OrderField {
    /// Ascending on `field`
    pub const fn asc(field: &'static str) -> Self {
        OrderField {
            field,
            descending: false,
        }
    }

    /// Descending on `field`
    pub const fn desc(field: &'static str) -> Self {
        OrderField {
            field,
            descending: true,
        }
    }
}

/// Common surface of the four record types
pub trait Entity: Clone + Send + Sync + 'static {
    /// Record kind
    const KIND: EntityKind;

    /// Declared fields, including derived ones
    const FIELDS: &'static [FieldSpec];

    /// Ordering applied when a listing asks for none
    const DEFAULT_ORDERING: &'static [OrderField];

    /// Untrusted input used to create or update the record
    type Draft: Clone + Default + Send;

    /// Record identifier
    fn id(&self) -> RecordId;

    /// Store key
    fn key(&self) -> RecordKey {
        RecordKey::new(Self::KIND, self.id())
    }

    /// Owning record, if any
    fn parent(&self) -> Option<RecordKey>;

    /// First persistence time
    fn created_at(&self) -> Timestamp;

    /// Last persisted mutation time
    fn updated_at(&self) -> Timestamp;

    /// Dynamic value of a declared field; `None` for unknown names
    ///
    /// Relation fields yield the related record's id.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Human-readable value of a field for list display
    fn display_field(&self, name: &str) -> Option<String> {
        self.field(name).map(|v| v.to_string())
    }

    /// Display label of the record
    fn label(&self) -> String;

    /// Validate a draft and build the record
    ///
    /// # Errors
    ///
    /// Returns `TimekeepError::Validation` naming the first offending field.
    fn from_draft(
        id: RecordId,
        draft: &Self::Draft,
        limits: &Limits,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self>;

    /// Current field values as a draft
    fn to_draft(&self) -> Self::Draft;

    /// Wrap into the store's record enum
    fn into_record(self) -> Record;

    /// Unwrap from the store's record enum; `None` on kind mismatch
    fn from_record(record: Record) -> Option<Self>;

    /// Look up a declared field
    fn field_spec(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    pub fn build<E: Entity>(draft: &E::Draft) -> Result<E> {
        let now = at(12, 0);
        E::from_draft(RecordId::new(), draft, &Limits::default(), now, now)
    }
}
