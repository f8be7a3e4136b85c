//! Timekeep - embedded record store for time tracking
//!
//! Timekeep records client companies, their contacts, projects and the time
//! entries logged against them, with field validation, a computed duration,
//! the one-primary-contact-per-client rule and admin list presentation.
//!
//! # Quick Start
//!
//! ```ignore
//! use timekeep::{ClientDraft, ClientStore, ContactDraft, ContactStore, Database};
//!
//! let db = Database::open("./data")?;
//! let clients = ClientStore::new(db.clone());
//! let acme = clients.create(&ClientDraft::new("Acme"))?;
//!
//! let contacts = ContactStore::new(db.clone());
//! contacts.create(&ContactDraft::new(acme.id, "Ada", "Lovelace").primary(true))?;
//! ```
//!
//! # Architecture
//!
//! Writes go through the per-entity stores, each a thin facade over one
//! optimistic transaction on the `Database`. Storage, concurrency and
//! durability internals are not re-exported.

pub use timekeep_admin::{
    client_admin, contact_admin, project_admin, time_entry_admin, AdminSite, ChangeList,
    ChangeListPage, ChangeListParams, ChangeView, Choice, DatePreset, FilterChoice, FilterKind,
    FilterSpec, Inline, InlineRows, ModelAdmin, ModelAdminBuilder, Row,
};
pub use timekeep_core::{
    country_name, format_duration, Client, ClientDraft, Contact, ContactDraft, CountryCode,
    Entity, EntityKind, FieldType, FieldValue, Limits, Project, ProjectDraft, RecordId, RecordKey,
    Result, TimeEntry, TimeEntryDraft, TimekeepError, Timestamp,
};
pub use timekeep_engine::{
    CascadeSummary, ClientStore, ContactStore, Database, DatabaseBuilder, Filter, ProjectStore,
    Query, RetryConfig, Search, SortKey, TimeEntryStore, TimekeepConfig, TransactionMetrics,
};
