//! Project of a client

use super::{Entity, OrderField, Record};
use crate::error::{Result, TimekeepError};
use crate::limits::Limits;
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::validate::{optional_text, required_char};
use crate::value::{FieldSpec, FieldType, FieldValue};
use serde::{Deserialize, Serialize};

/// A project run for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Record id
    pub id: RecordId,
    /// Project name (required)
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Completion flag
    pub completed: bool,
    /// Owning client
    pub client: RecordId,
    /// First persistence time
    pub created_at: Timestamp,
    /// Last persisted mutation time
    pub updated_at: Timestamp,
}

/// Field values for creating or updating a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    /// Project name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Completion flag
    pub completed: bool,
    /// Owning client
    pub client: Option<RecordId>,
}

impl ProjectDraft {
    /// Draft with name and owning client set
    pub fn new(client: RecordId, name: impl Into<String>) -> Self {
        ProjectDraft {
            name: name.into(),
            client: Some(client),
            ..Default::default()
        }
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldType::Id),
    FieldSpec::new("name", FieldType::Text),
    FieldSpec::new("description", FieldType::Text),
    FieldSpec::new("completed", FieldType::Bool),
    FieldSpec::new("client", FieldType::Relation(EntityKind::Client)),
    FieldSpec::new("created_at", FieldType::Timestamp),
    FieldSpec::new("updated_at", FieldType::Timestamp),
];

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDERING: &'static [OrderField] = &[OrderField::asc("name")];
    type Draft = ProjectDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn parent(&self) -> Option<RecordKey> {
        Some(RecordKey::new(EntityKind::Client, self.client))
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
            "name" => FieldValue::from(self.name.as_str()),
            "description" => self.description.clone().into(),
            "completed" => FieldValue::Bool(self.completed),
            "client" => FieldValue::Id(self.client),
            "created_at" => FieldValue::Timestamp(self.created_at),
            "updated_at" => FieldValue::Timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn from_draft(
        id: RecordId,
        draft: &ProjectDraft,
        limits: &Limits,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self> {
        let kind = EntityKind::Project;
        let name = required_char(kind, "name", &draft.name, limits)?;
        let client = draft
            .client
            .ok_or_else(|| TimekeepError::validation(kind, "client", "this field is required"))?;
        Ok(Project {
            id,
            name,
            description: optional_text(kind, "description", draft.description.as_deref(), limits)?,
            completed: draft.completed,
            client,
            created_at,
            updated_at,
        })
    }

    fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            completed: self.completed,
            client: Some(self.client),
        }
    }

    fn into_record(self) -> Record {
        Record::Project(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Project(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::build;

    #[test]
    fn test_completed_defaults_false() {
        let project: Project = build(&ProjectDraft::new(RecordId::new(), "Website")).unwrap();
        assert!(!project.completed);
        assert!(project.description.is_none());
    }

    #[test]
    fn test_long_description_allowed() {
        let mut draft = ProjectDraft::new(RecordId::new(), "Website");
        draft.description = Some("d".repeat(5_000));
        assert!(build::<Project>(&draft).is_ok());
    }

    #[test]
    fn test_name_over_char_limit_rejected() {
        let draft = ProjectDraft::new(RecordId::new(), "n".repeat(256));
        let err = build::<Project>(&draft).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_default_ordering_by_name() {
        assert_eq!(Project::DEFAULT_ORDERING, &[OrderField::asc("name")]);
    }
}
