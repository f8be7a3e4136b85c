//! ProjectStore: projects of a client

use std::sync::Arc;

use chrono::Utc;
use timekeep_core::{Project, ProjectDraft, RecordId, Result, TimeEntry};

use super::{create_entity, delete_entity, update_entity, CascadeSummary};
use crate::database::Database;
use crate::query::Query;
use crate::transaction::RecordOps;

/// Project records
#[derive(Clone)]
pub struct ProjectStore {
    db: Arc<Database>,
}

impl ProjectStore {
    /// Create new ProjectStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Validate and insert a new project
    pub fn create(&self, draft: &ProjectDraft) -> Result<Project> {
        let limits = self.db.limits();
        self.db.retrying(|txn| create_entity(txn, draft, &limits))
    }

    /// Project by id
    pub fn get(&self, id: RecordId) -> Result<Project> {
        self.db.transaction(|txn| txn.require(id))
    }

    /// Every project, ordered by name
    pub fn list(&self) -> Result<Vec<Project>> {
        self.query(&Query::new())
    }

    /// Projects matching `query`
    pub fn query(&self, query: &Query) -> Result<Vec<Project>> {
        query.run(&self.db.snapshot())
    }

    /// Replace every field of a project with the draft's values
    pub fn update(&self, id: RecordId, draft: &ProjectDraft) -> Result<Project> {
        let limits = self.db.limits();
        self.db.retrying(|txn| update_entity(txn, id, draft, &limits))
    }

    /// Delete a project with its time entries
    pub fn delete(&self, id: RecordId) -> Result<CascadeSummary> {
        self.db.retrying(|txn| delete_entity::<Project>(txn, id))
    }

    /// Mark a project completed or reopen it
    ///
    /// Setting the current value writes nothing.
    pub fn set_completed(&self, id: RecordId, completed: bool) -> Result<Project> {
        self.db.retrying(|txn| {
            let mut project: Project = txn.require(id)?;
            if project.completed != completed {
                project.completed = completed;
                project.updated_at = Utc::now();
                txn.store(project.clone())?;
            }
            Ok(project)
        })
    }

    /// Time entries of a project, newest first
    pub fn time_entries(&self, id: RecordId) -> Result<Vec<TimeEntry>> {
        self.get(id)?;
        Query::new().exact("project", id).run(&self.db.snapshot())
    }
}
