//! ClientStore: client companies

use std::sync::Arc;

use timekeep_core::{Client, ClientDraft, Contact, Entity, Project, RecordId, Result};

use super::{create_entity, delete_entity, update_entity, CascadeSummary};
use crate::database::Database;
use crate::query::Query;
use crate::transaction::RecordOps;

/// Client records
///
/// # Example
///
/// ```ignore
/// let clients = ClientStore::new(db.clone());
/// let acme = clients.create(&ClientDraft::new("Acme"))?;
/// let summary = clients.delete(acme.id)?;
/// ```
#[derive(Clone)]
pub struct ClientStore {
    db: Arc<Database>,
}

impl ClientStore {
    /// Create new ClientStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Validate and insert a new client
    pub fn create(&self, draft: &ClientDraft) -> Result<Client> {
        let limits = self.db.limits();
        self.db.retrying(|txn| create_entity(txn, draft, &limits))
    }

    /// Client by id
    pub fn get(&self, id: RecordId) -> Result<Client> {
        self.db.transaction(|txn| txn.require(id))
    }

    /// Every client, ordered by company name
    pub fn list(&self) -> Result<Vec<Client>> {
        self.query(&Query::new())
    }

    /// Clients matching `query`
    pub fn query(&self, query: &Query) -> Result<Vec<Client>> {
        query.run(&self.db.snapshot())
    }

    /// Replace every field of a client with the draft's values
    pub fn update(&self, id: RecordId, draft: &ClientDraft) -> Result<Client> {
        let limits = self.db.limits();
        self.db.retrying(|txn| update_entity(txn, id, draft, &limits))
    }

    /// Delete a client with its contacts, projects and their time entries
    pub fn delete(&self, id: RecordId) -> Result<CascadeSummary> {
        self.db.retrying(|txn| delete_entity::<Client>(txn, id))
    }

    /// Contacts of a client, in contact default order
    pub fn contacts(&self, id: RecordId) -> Result<Vec<Contact>> {
        self.get(id)?;
        Query::new().exact("client", id).run(&self.db.snapshot())
    }

    /// Projects of a client, in project default order
    pub fn projects(&self, id: RecordId) -> Result<Vec<Project>> {
        self.get(id)?;
        Query::new().exact("client", id).run(&self.db.snapshot())
    }

    /// The client's primary contact, if any
    pub fn primary_contact(&self, id: RecordId) -> Result<Option<Contact>> {
        self.db.transaction(|txn| {
            let client: Client = txn.require(id)?;
            let contacts: Vec<Contact> = txn.children(client.key())?;
            Ok(contacts.into_iter().find(|c| c.is_primary))
        })
    }
}
