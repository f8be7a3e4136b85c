//! Per-entity record stores
//!
//! Each store is a stateless facade over the Database engine. It holds no
//! in-memory state beyond an `Arc<Database>` reference; every operation is
//! one transaction (writes retry on transient conflict).
//!
//! | Store | Extra operations |
//! |-------|------------------|
//! | `ClientStore` | `primary_contact`, cascade delete |
//! | `ContactStore` | `set_primary` (primary-contact enforcement) |
//! | `ProjectStore` | `set_completed`, cascade delete |
//! | `TimeEntryStore` | `total_duration` |

mod client;
mod contact;
mod project;
mod time_entry;

pub use client::ClientStore;
pub use contact::ContactStore;
pub use project::ProjectStore;
pub use time_entry::TimeEntryStore;

use chrono::Utc;
use timekeep_concurrency::TransactionContext;
use timekeep_core::{Entity, EntityKind, Limits, RecordId, RecordKey, Result, TimekeepError};

use crate::transaction::RecordOps;

/// Records removed by a delete, per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Clients deleted
    pub clients: usize,
    /// Contacts deleted
    pub contacts: usize,
    /// Projects deleted
    pub projects: usize,
    /// Time entries deleted
    pub time_entries: usize,
}

impl CascadeSummary {
    fn record(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Client => self.clients += 1,
            EntityKind::Contact => self.contacts += 1,
            EntityKind::Project => self.projects += 1,
            EntityKind::TimeEntry => self.time_entries += 1,
        }
    }

    /// Count for one kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Client => self.clients,
            EntityKind::Contact => self.contacts,
            EntityKind::Project => self.projects,
            EntityKind::TimeEntry => self.time_entries,
        }
    }

    /// Records deleted in total
    pub fn total(&self) -> usize {
        self.clients + self.contacts + self.projects + self.time_entries
    }
}

/// Validate a draft, check its owner exists, buffer the new record
pub(crate) fn create_entity<E: Entity>(
    txn: &mut TransactionContext,
    draft: &E::Draft,
    limits: &Limits,
) -> Result<E> {
    let now = Utc::now();
    let entity = E::from_draft(RecordId::new(), draft, limits, now, now)?;
    require_parent(txn, &entity)?;
    txn.store(entity.clone())?;
    Ok(entity)
}

/// Validate a draft over an existing record, keeping `created_at`
pub(crate) fn update_entity<E: Entity>(
    txn: &mut TransactionContext,
    id: RecordId,
    draft: &E::Draft,
    limits: &Limits,
) -> Result<E> {
    let existing: E = txn.require(id)?;
    let entity = E::from_draft(id, draft, limits, existing.created_at(), Utc::now())?;
    require_parent(txn, &entity)?;
    txn.store(entity.clone())?;
    Ok(entity)
}

fn require_parent<E: Entity>(txn: &mut TransactionContext, entity: &E) -> Result<()> {
    if let Some(parent) = entity.parent() {
        if !txn.exists(&parent)? {
            return Err(TimekeepError::not_found(parent.kind, parent.id));
        }
    }
    Ok(())
}

/// Delete a record and everything it owns, children first
pub(crate) fn delete_cascade(
    txn: &mut TransactionContext,
    key: RecordKey,
    summary: &mut CascadeSummary,
) -> Result<()> {
    for child in txn.children_of(&key)? {
        delete_cascade(txn, child, summary)?;
    }
    txn.remove(key)?;
    summary.record(key.kind);
    Ok(())
}

/// Delete an existing record of kind `E` with its owned records
pub(crate) fn delete_entity<E: Entity>(
    txn: &mut TransactionContext,
    id: RecordId,
) -> Result<CascadeSummary> {
    let entity: E = txn.require(id)?;
    let mut summary = CascadeSummary::default();
    delete_cascade(txn, entity.key(), &mut summary)?;
    Ok(summary)
}
