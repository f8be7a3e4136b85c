//! Database engine for Timekeep
//!
//! This crate orchestrates all lower layers:
//! - Database: open/close, the data-directory lock, config and recovery
//! - Transaction coordination and the closure transaction API with retry
//! - Query: search, filters and ordering over `__` field paths
//! - Stores: one facade per entity, including cascade delete and the
//!   primary-contact rule
//!
//! The engine is the only component that knows about:
//! - Cross-layer coordination (storage + commit log + recovery)
//! - Which writes a store operation fans out to

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod database;
pub mod query;
pub mod stores;
pub mod transaction;

pub use coordinator::{TransactionCoordinator, TransactionMetrics};
pub use database::config::{TimekeepConfig, CONFIG_FILE_NAME};
pub use database::{Database, DatabaseBuilder, PersistenceMode, RetryConfig};
pub use query::{field_type_of, FieldResolver, Filter, Query, Search, SortKey, PATH_SEPARATOR};
pub use stores::{CascadeSummary, ClientStore, ContactStore, ProjectStore, TimeEntryStore};
pub use transaction::RecordOps;
