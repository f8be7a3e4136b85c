//! Logged interval of work against a project
//!
//! `duration` is derived: it is never stored and is recomputed from
//! `end_time - start_time` on every read, so it cannot drift from the
//! interval. A negative duration (end before start) is returned as is.

use super::{Entity, OrderField, Record};
use crate::error::{Result, TimekeepError};
use crate::limits::Limits;
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::validate::optional_text;
use crate::value::{FieldSpec, FieldType, FieldValue};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// A time entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Record id
    pub id: RecordId,
    /// Start of the interval
    pub start_time: Timestamp,
    /// End of the interval
    pub end_time: Timestamp,
    /// Free-text notes
    pub notes: Option<String>,
    /// Project the time was spent on
    pub project: RecordId,
    /// First persistence time
    pub created_at: Timestamp,
    /// Last persisted mutation time
    pub updated_at: Timestamp,
}

impl TimeEntry {
    /// Elapsed time, `end_time - start_time`
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// Field values for creating or updating a time entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeEntryDraft {
    /// Start of the interval
    pub start_time: Option<Timestamp>,
    /// End of the interval
    pub end_time: Option<Timestamp>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Project the time was spent on
    pub project: Option<RecordId>,
}

impl TimeEntryDraft {
    /// Draft with project and interval set
    pub fn new(project: RecordId, start_time: Timestamp, end_time: Timestamp) -> Self {
        TimeEntryDraft {
            start_time: Some(start_time),
            end_time: Some(end_time),
            notes: None,
            project: Some(project),
        }
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldType::Id),
    FieldSpec::new("project", FieldType::Relation(EntityKind::Project)),
    FieldSpec::new("start_time", FieldType::Timestamp),
    FieldSpec::new("end_time", FieldType::Timestamp),
    FieldSpec::new("duration", FieldType::Duration),
    FieldSpec::new("notes", FieldType::Text),
    FieldSpec::new("created_at", FieldType::Timestamp),
    FieldSpec::new("updated_at", FieldType::Timestamp),
];

fn required<T: Copy>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        TimekeepError::validation(EntityKind::TimeEntry, field, "this field is required")
    })
}

impl Entity for TimeEntry {
    const KIND: EntityKind = EntityKind::TimeEntry;
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDERING: &'static [OrderField] = &[OrderField::desc("start_time")];
    type Draft = TimeEntryDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn parent(&self) -> Option<RecordKey> {
        Some(RecordKey::new(EntityKind::Project, self.project))
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => FieldValue::Id(self.id),
            "project" => FieldValue::Id(self.project),
            "start_time" => FieldValue::Timestamp(self.start_time),
            "end_time" => FieldValue::Timestamp(self.end_time),
            "duration" => FieldValue::Duration(self.duration()),
            "notes" => self.notes.clone().into(),
            "created_at" => FieldValue::Timestamp(self.created_at),
            "updated_at" => FieldValue::Timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    fn label(&self) -> String {
        format!(
            "{} – {}",
            self.start_time.format("%Y-%m-%d %H:%M"),
            self.end_time.format("%Y-%m-%d %H:%M")
        )
    }

    fn from_draft(
        id: RecordId,
        draft: &TimeEntryDraft,
        limits: &Limits,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self> {
        Ok(TimeEntry {
            id,
            start_time: required(draft.start_time, "start_time")?,
            end_time: required(draft.end_time, "end_time")?,
            notes: optional_text(EntityKind::TimeEntry, "notes", draft.notes.as_deref(), limits)?,
            project: required(draft.project, "project")?,
            created_at,
            updated_at,
        })
    }

    fn to_draft(&self) -> TimeEntryDraft {
        TimeEntryDraft {
            start_time: Some(self.start_time),
            end_time: Some(self.end_time),
            notes: self.notes.clone(),
            project: Some(self.project),
        }
    }

    fn into_record(self) -> Record {
        Record::TimeEntry(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::TimeEntry(t) => Some(t),
            _ => None,
        }
    }
}
