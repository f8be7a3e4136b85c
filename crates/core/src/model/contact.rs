//! Contact person of a client

use super::{Entity, OrderField, Record};
use crate::error::{Result, TimekeepError};
use crate::limits::Limits;
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::validate::{optional_char, optional_email, required_char};
use crate::value::{FieldSpec, FieldType, FieldValue};
use serde::{Deserialize, Serialize};

/// A contact person belonging to one client
///
/// At most one contact per client has `is_primary` set. The flag is
/// maintained by the engine's contact store, never by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Record id
    pub id: RecordId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Owning client
    pub client: RecordId,
    /// Email
    pub email: Option<String>,
    /// Phone number (free-form)
    pub phone_number: Option<String>,
    /// Primary contact of the client
    pub is_primary: bool,
    /// First persistence time
    pub created_at: Timestamp,
    /// Last persisted mutation time
    pub updated_at: Timestamp,
}

/// Field values for creating or updating a contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Owning client
    pub client: Option<RecordId>,
    /// Email
    pub email: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Primary contact flag
    pub is_primary: bool,
}

impl ContactDraft {
    /// Draft with names and owning client set
    pub fn new(
        client: RecordId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        ContactDraft {
            first_name: first_name.into(),
            last_name: last_name.into(),
            client: Some(client),
            ..Default::default()
        }
    }

    /// Set the primary flag
    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldType::Id),
    FieldSpec::new("first_name", FieldType::Text),
    FieldSpec::new("last_name", FieldType::Text),
    FieldSpec::new("client", FieldType::Relation(EntityKind::Client)),
    FieldSpec::new("email", FieldType::Text),
    FieldSpec::new("phone_number", FieldType::Text),
    FieldSpec::new("is_primary", FieldType::Bool),
    FieldSpec::new("created_at", FieldType::Timestamp),
    FieldSpec::new("updated_at", FieldType::Timestamp),
];

impl Entity for Contact {
    const KIND: EntityKind = EntityKind::Contact;
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDERING: &'static [OrderField] =
        &[OrderField::asc("last_name"), OrderField::asc("first_name")];
    type Draft = ContactDraft;

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
            "first_name" => FieldValue::from(self.first_name.as_str()),
            "last_name" => FieldValue::from(self.last_name.as_str()),
            "client" => FieldValue::Id(self.client),
            "email" => self.email.clone().into(),
            "phone_number" => self.phone_number.clone().into(),
            "is_primary" => FieldValue::Bool(self.is_primary),
            "created_at" => FieldValue::Timestamp(self.created_at),
            "updated_at" => FieldValue::Timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn from_draft(
        id: RecordId,
        draft: &ContactDraft,
        limits: &Limits,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self> {
        let kind = EntityKind::Contact;
        let first_name = required_char(kind, "first_name", &draft.first_name, limits)?;
        let last_name = required_char(kind, "last_name", &draft.last_name, limits)?;
        let client = draft
            .client
            .ok_or_else(|| TimekeepError::validation(kind, "client", "this field is required"))?;
        Ok(Contact {
            id,
            first_name,
            last_name,
            client,
            email: optional_email(kind, "email", draft.email.as_deref(), limits)?,
            phone_number: optional_char(kind, "phone_number", draft.phone_number.as_deref(), limits)?,
            is_primary: draft.is_primary,
            created_at,
            updated_at,
        })
    }

    fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            client: Some(self.client),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            is_primary: self.is_primary,
        }
    }

    fn into_record(self) -> Record {
        Record::Contact(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Contact(c) => Some(c),
            _ => None,
        }
    }
}
