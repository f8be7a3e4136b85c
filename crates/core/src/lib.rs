//! Core types and traits for Timekeep
//!
//! This crate defines the foundational types used throughout the workspace:
//! - RecordId / EntityKind / RecordKey: record identity and store keys
//! - Model: Client, Contact, Project, TimeEntry, their drafts and the Entity trait
//! - Validation: field validators, length limits, ISO 3166-1 country table
//! - FieldValue: dynamic field view for querying and presentation
//! - Error: the workspace error type
//! - Traits: Storage and SnapshotView

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod country;
pub mod error;
pub mod limits;
pub mod model;
pub mod traits;
pub mod types;
pub mod validate;
pub mod value;
pub mod versioned;

pub use country::{country_name, CountryCode, COUNTRIES};
pub use error::{Result, TimekeepError};
pub use limits::{LimitError, Limits};
pub use model::{
    default_ordering_of, field_spec_of, fields_of, Client, ClientDraft, Contact, ContactDraft,
    Entity, OrderField, Project, ProjectDraft, Record, TimeEntry, TimeEntryDraft,
};
pub use traits::{SnapshotView, Storage};
pub use types::{EntityKind, RecordId, RecordKey, Timestamp};
pub use value::{format_duration, parse_timestamp, FieldSpec, FieldType, FieldValue};
pub use versioned::Versioned;
