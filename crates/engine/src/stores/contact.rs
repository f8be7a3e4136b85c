//! ContactStore: client contacts and the primary-contact rule
//!
//! At most one contact per client is primary. Every write that makes a
//! contact primary demotes the client's other primary contacts in the same
//! transaction. The commit protocol re-checks the rule against committed
//! state, so two concurrent promotions cannot both land; the loser gets a
//! conflict and is retried against the winner's result.

use std::sync::Arc;

use chrono::Utc;
use timekeep_concurrency::TransactionContext;
use timekeep_core::{
    Client, Contact, ContactDraft, Entity, EntityKind, RecordId, Result, TimekeepError,
};
use tracing::debug;

use super::{create_entity, delete_entity, update_entity, CascadeSummary};
use crate::database::Database;
use crate::query::Query;
use crate::transaction::RecordOps;

/// Clear `is_primary` on every other primary contact of `client`
///
/// Only contacts that are currently primary are written. Returns the number
/// demoted.
pub(crate) fn demote_other_primaries(
    txn: &mut TransactionContext,
    client: RecordId,
    keep: RecordId,
) -> Result<usize> {
    let client: Client = txn.require(client)?;
    let mut demoted = 0;
    for mut other in txn.children::<Contact>(client.key())? {
        if other.id == keep || !other.is_primary {
            continue;
        }
        other.is_primary = false;
        other.updated_at = Utc::now();
        debug!(target: "timekeep::txn", client = %client.id, contact = %other.id, "Demoting primary contact");
        txn.store(other)?;
        demoted += 1;
    }
    Ok(demoted)
}

/// Contact records
#[derive(Clone)]
pub struct ContactStore {
    db: Arc<Database>,
}

impl ContactStore {
    /// Create new ContactStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Validate and insert a new contact
    ///
    /// A primary contact demotes the client's current primary.
    pub fn create(&self, draft: &ContactDraft) -> Result<Contact> {
        let limits = self.db.limits();
        self.db.retrying(|txn| {
            let contact: Contact = create_entity(txn, draft, &limits)?;
            if contact.is_primary {
                demote_other_primaries(txn, contact.client, contact.id)?;
            }
            Ok(contact)
        })
    }

    /// Contact by id
    pub fn get(&self, id: RecordId) -> Result<Contact> {
        self.db.transaction(|txn| txn.require(id))
    }

    /// Every contact, ordered by last then first name
    pub fn list(&self) -> Result<Vec<Contact>> {
        self.query(&Query::new())
    }

    /// Contacts matching `query`
    pub fn query(&self, query: &Query) -> Result<Vec<Contact>> {
        query.run(&self.db.snapshot())
    }

    /// Replace every field of a contact with the draft's values
    ///
    /// Moving a primary contact to another client demotes the primaries of
    /// the destination client.
    pub fn update(&self, id: RecordId, draft: &ContactDraft) -> Result<Contact> {
        let limits = self.db.limits();
        self.db.retrying(|txn| {
            let contact: Contact = update_entity(txn, id, draft, &limits)?;
            if contact.is_primary {
                demote_other_primaries(txn, contact.client, contact.id)?;
            }
            Ok(contact)
        })
    }

    /// Delete a contact
    pub fn delete(&self, id: RecordId) -> Result<CascadeSummary> {
        self.db.retrying(|txn| delete_entity::<Contact>(txn, id))
    }

    /// Make `contact_id` the primary contact of `client_id`
    ///
    /// Re-setting the current primary writes nothing.
    ///
    /// # Errors
    ///
    /// - `NotFound` if either record is missing
    /// - `Validation` if the contact belongs to another client
    pub fn set_primary(&self, client_id: RecordId, contact_id: RecordId) -> Result<Contact> {
        self.db.retrying(|txn| {
            txn.require::<Client>(client_id)?;
            let mut contact: Contact = txn.require(contact_id)?;
            if contact.client != client_id {
                return Err(TimekeepError::validation(
                    EntityKind::Contact,
                    "client",
                    "contact belongs to another client",
                ));
            }
            demote_other_primaries(txn, client_id, contact_id)?;
            if !contact.is_primary {
                contact.is_primary = true;
                contact.updated_at = Utc::now();
                txn.store(contact.clone())?;
            }
            Ok(contact)
        })
    }
}
