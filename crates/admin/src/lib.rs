//! List, search and filter presentation for Timekeep records
//!
//! This crate turns store contents into what an admin front end shows; it
//! renders nothing itself:
//! - ModelAdmin: validated per-entity configuration
//! - ChangeList: search, filters, date presets, ordering and pagination
//!   evaluated into display rows
//! - AdminSite: the four admins, autocomplete and change views with inlines

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod changelist;
pub mod filters;
pub mod options;
pub mod site;

pub use changelist::{ChangeList, ChangeListPage, ChangeListParams, Row};
pub use filters::{DatePreset, FilterChoice, FilterKind, FilterSpec};
pub use options::{Inline, ModelAdmin, ModelAdminBuilder, DEFAULT_LIST_PER_PAGE};
pub use site::{
    client_admin, contact_admin, project_admin, time_entry_admin, AdminSite, ChangeView, Choice,
    InlineRows, AUTOCOMPLETE_LIMIT,
};
