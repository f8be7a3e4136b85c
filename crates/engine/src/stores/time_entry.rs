//! TimeEntryStore: logged time against projects
//!
//! `duration` is computed on read from the stored interval.

use std::sync::Arc;

use chrono::Duration;
use timekeep_core::{Entity, Project, RecordId, Result, TimeEntry, TimeEntryDraft};

use super::{create_entity, delete_entity, update_entity, CascadeSummary};
use crate::database::Database;
use crate::query::Query;
use crate::transaction::RecordOps;

/// Time entry records
#[derive(Clone)]
pub struct TimeEntryStore {
    db: Arc<Database>,
}

impl TimeEntryStore {
    /// Create new TimeEntryStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Validate and insert a new time entry
    pub fn create(&self, draft: &TimeEntryDraft) -> Result<TimeEntry> {
        let limits = self.db.limits();
        self.db.retrying(|txn| create_entity(txn, draft, &limits))
    }

    /// Time entry by id
    pub fn get(&self, id: RecordId) -> Result<TimeEntry> {
        self.db.transaction(|txn| txn.require(id))
    }

    /// Every time entry, newest start first
    pub fn list(&self) -> Result<Vec<TimeEntry>> {
        self.query(&Query::new())
    }

    /// Time entries matching `query`
    pub fn query(&self, query: &Query) -> Result<Vec<TimeEntry>> {
        query.run(&self.db.snapshot())
    }

    /// Replace every field of a time entry with the draft's values
    pub fn update(&self, id: RecordId, draft: &TimeEntryDraft) -> Result<TimeEntry> {
        let limits = self.db.limits();
        self.db.retrying(|txn| update_entity(txn, id, draft, &limits))
    }

    /// Delete a time entry
    pub fn delete(&self, id: RecordId) -> Result<CascadeSummary> {
        self.db.retrying(|txn| delete_entity::<TimeEntry>(txn, id))
    }

    /// Sum of the durations of a project's entries
    ///
    /// Negative entries reduce the total.
    pub fn total_duration(&self, project_id: RecordId) -> Result<Duration> {
        self.db.transaction(|txn| {
            let project: Project = txn.require(project_id)?;
            let entries: Vec<TimeEntry> = txn.children(project.key())?;
            Ok(entries
                .iter()
                .fold(Duration::zero(), |total, e| total + e.duration()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{ClientStore, ProjectStore};
    use chrono::{TimeZone, Utc};
    use timekeep_core::{ClientDraft, ProjectDraft, Timestamp};

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn setup() -> (TimeEntryStore, RecordId) {
        let db = Database::ephemeral().unwrap();
        let client = ClientStore::new(db.clone())
            .create(&ClientDraft::new("Acme"))
            .unwrap();
        let project = ProjectStore::new(db.clone())
            .create(&ProjectDraft::new(client.id, "Website"))
            .unwrap();
        (TimeEntryStore::new(db), project.id)
    }

    #[test]
    fn test_duration_computed_from_interval() {
        let (entries, project) = setup();
        let e = entries
            .create(&TimeEntryDraft::new(project, at(9, 0), at(17, 30)))
            .unwrap();
        assert_eq!(entries.get(e.id).unwrap().duration(), Duration::minutes(510));
    }

    #[test]
    fn test_update_recomputes_duration() {
        let (entries, project) = setup();
        let e = entries
            .create(&TimeEntryDraft::new(project, at(9, 0), at(10, 0)))
            .unwrap();
        let updated = entries
            .update(e.id, &TimeEntryDraft::new(project, at(9, 0), at(12, 0)))
            .unwrap();
        assert_eq!(updated.duration(), Duration::hours(3));
    }

    #[test]
    fn test_total_duration_includes_negative_entries() {
        let (entries, project) = setup();
        entries
            .create(&TimeEntryDraft::new(project, at(9, 0), at(11, 0)))
            .unwrap();
        entries
            .create(&TimeEntryDraft::new(project, at(14, 0), at(13, 30)))
            .unwrap();
        assert_eq!(
            entries.total_duration(project).unwrap(),
            Duration::minutes(90)
        );
        assert!(entries.total_duration(RecordId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_interval_is_validation_error() {
        let (entries, project) = setup();
        let draft = TimeEntryDraft {
            project: Some(project),
            start_time: Some(at(9, 0)),
            ..Default::default()
        };
        assert!(entries.create(&draft).unwrap_err().is_validation());
    }

    #[test]
    fn test_list_newest_first() {
        let (entries, project) = setup();
        let early = entries
            .create(&TimeEntryDraft::new(project, at(8, 0), at(9, 0)))
            .unwrap();
        let late = entries
            .create(&TimeEntryDraft::new(project, at(15, 0), at(16, 0)))
            .unwrap();
        assert_eq!(entries.list().unwrap(), vec![late, early]);
    }
}
