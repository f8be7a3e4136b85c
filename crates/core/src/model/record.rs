//! Stored record enum
//!
//! The record store holds every record as a `Record` keyed by
//! `RecordKey { kind, id }`. The enum is also the commit-log payload type,
//! so its variants and their field order are part of the on-disk format.

use super::{Client, Contact, Entity, OrderField, Project, TimeEntry};
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::value::{FieldSpec, FieldValue};
use serde::{Deserialize, Serialize};

/// Any stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// Client company
    Client(Client),
    /// Contact person
    Contact(Contact),
    /// Project
    Project(Project),
    /// Time entry
    TimeEntry(TimeEntry),
}

macro_rules! dispatch {
    ($self:expr, $r:ident => $body:expr) => {
        match $self {
            Record::Client($r) => $body,
            Record::Contact($r) => $body,
            Record::Project($r) => $body,
            Record::TimeEntry($r) => $body,
        }
    };
}

impl Record {
    /// Record kind
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Client(_) => EntityKind::Client,
            Record::Contact(_) => EntityKind::Contact,
            Record::Project(_) => EntityKind::Project,
            Record::TimeEntry(_) => EntityKind::TimeEntry,
        }
    }

    /// Record id
    pub fn id(&self) -> RecordId {
        dispatch!(self, r => r.id())
    }

    /// Store key
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.kind(), self.id())
    }

    /// Owning record, if any
    pub fn parent(&self) -> Option<RecordKey> {
        dispatch!(self, r => r.parent())
    }

    /// Last persisted mutation time
    pub fn updated_at(&self) -> Timestamp {
        dispatch!(self, r => r.updated_at())
    }

    /// Dynamic field access
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        dispatch!(self, r => r.field(name))
    }

    /// Human-readable field value
    pub fn display_field(&self, name: &str) -> Option<String> {
        dispatch!(self, r => r.display_field(name))
    }

    /// Display label
    pub fn label(&self) -> String {
        dispatch!(self, r => r.label())
    }

    /// Borrow as a contact, if it is one
    pub fn as_contact(&self) -> Option<&Contact> {
        match self {
            Record::Contact(c) => Some(c),
            _ => None,
        }
    }
}

/// Declared fields of a record kind
pub fn fields_of(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::Client => Client::FIELDS,
        EntityKind::Contact => Contact::FIELDS,
        EntityKind::Project => Project::FIELDS,
        EntityKind::TimeEntry => TimeEntry::FIELDS,
    }
}

/// Default listing order of a record kind
pub fn default_ordering_of(kind: EntityKind) -> &'static [OrderField] {
    match kind {
        EntityKind::Client => Client::DEFAULT_ORDERING,
        EntityKind::Contact => Contact::DEFAULT_ORDERING,
        EntityKind::Project => Project::DEFAULT_ORDERING,
        EntityKind::TimeEntry => TimeEntry::DEFAULT_ORDERING,
    }
}

/// Look up a declared field of a record kind
pub fn field_spec_of(kind: EntityKind, name: &str) -> Option<&'static FieldSpec> {
    fields_of(kind).iter().find(|f| f.name == name)
}
