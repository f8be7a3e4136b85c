//! Client company record

use super::{Entity, OrderField, Record};
use crate::country::CountryCode;
use crate::error::Result;
use crate::limits::Limits;
use crate::types::{EntityKind, RecordId, RecordKey, Timestamp};
use crate::validate::{optional_char, optional_country, optional_email, required_char};
use crate::value::{FieldSpec, FieldType, FieldValue};
use serde::{Deserialize, Serialize};

/// A client company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Record id
    pub id: RecordId,
    /// Company name (required)
    pub company_name: String,
    /// First address line
    pub address_line_1: Option<String>,
    /// Second address line
    pub address_line_2: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2 country
    pub country: Option<CountryCode>,
    /// Phone number (free-form)
    pub phone_number: Option<String>,
    /// General email
    pub email: Option<String>,
    /// Billing email
    pub billing_email: Option<String>,
    /// First persistence time
    pub created_at: Timestamp,
    /// Last persisted mutation time
    pub updated_at: Timestamp,
}

/// Field values for creating or updating a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDraft {
    /// Company name
    pub company_name: String,
    /// First address line
    pub address_line_1: Option<String>,
    /// Second address line
    pub address_line_2: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Country code, any case
    pub country: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// General email
    pub email: Option<String>,
    /// Billing email
    pub billing_email: Option<String>,
}

impl ClientDraft {
    /// Draft with only the company name set
    pub fn new(company_name: impl Into<String>) -> Self {
        ClientDraft {
            company_name: company_name.into(),
            ..Default::default()
        }
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", FieldType::Id),
    FieldSpec::new("company_name", FieldType::Text),
    FieldSpec::new("address_line_1", FieldType::Text),
    FieldSpec::new("address_line_2", FieldType::Text),
    FieldSpec::new("city", FieldType::Text),
    FieldSpec::new("state", FieldType::Text),
    FieldSpec::new("postal_code", FieldType::Text),
    FieldSpec::new("country", FieldType::Country),
    FieldSpec::new("phone_number", FieldType::Text),
    FieldSpec::new("email", FieldType::Text),
    FieldSpec::new("billing_email", FieldType::Text),
    FieldSpec::new("created_at", FieldType::Timestamp),
    FieldSpec::new("updated_at", FieldType::Timestamp),
];

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDERING: &'static [OrderField] = &[OrderField::asc("company_name")];
    type Draft = ClientDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn parent(&self) -> Option<RecordKey> {
        None
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
            "company_name" => FieldValue::from(self.company_name.as_str()),
            "address_line_1" => self.address_line_1.clone().into(),
            "address_line_2" => self.address_line_2.clone().into(),
            "city" => self.city.clone().into(),
            "state" => self.state.clone().into(),
            "postal_code" => self.postal_code.clone().into(),
            "country" => self
                .country
                .as_ref()
                .map(|c| c.as_str().to_string())
                .into(),
            "phone_number" => self.phone_number.clone().into(),
            "email" => self.email.clone().into(),
            "billing_email" => self.billing_email.clone().into(),
            "created_at" => FieldValue::Timestamp(self.created_at),
            "updated_at" => FieldValue::Timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    fn display_field(&self, name: &str) -> Option<String> {
        match name {
            "country" => Some(
                self.country
                    .as_ref()
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| FieldValue::Null.to_string()),
            ),
            _ => self.field(name).map(|v| v.to_string()),
        }
    }

    fn label(&self) -> String {
        self.company_name.clone()
    }

    fn from_draft(
        id: RecordId,
        draft: &ClientDraft,
        limits: &Limits,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self> {
        let kind = EntityKind::Client;
        Ok(Client {
            id,
            company_name: required_char(kind, "company_name", &draft.company_name, limits)?,
            address_line_1: optional_char(kind, "address_line_1", draft.address_line_1.as_deref(), limits)?,
            address_line_2: optional_char(kind, "address_line_2", draft.address_line_2.as_deref(), limits)?,
            city: optional_char(kind, "city", draft.city.as_deref(), limits)?,
            state: optional_char(kind, "state", draft.state.as_deref(), limits)?,
            postal_code: optional_char(kind, "postal_code", draft.postal_code.as_deref(), limits)?,
            country: optional_country(kind, "country", draft.country.as_deref())?,
            phone_number: optional_char(kind, "phone_number", draft.phone_number.as_deref(), limits)?,
            email: optional_email(kind, "email", draft.email.as_deref(), limits)?,
            billing_email: optional_email(kind, "billing_email", draft.billing_email.as_deref(), limits)?,
            created_at,
            updated_at,
        })
    }

    fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            company_name: self.company_name.clone(),
            address_line_1: self.address_line_1.clone(),
            address_line_2: self.address_line_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.as_ref().map(|c| c.as_str().to_string()),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            billing_email: self.billing_email.clone(),
        }
    }

    fn into_record(self) -> Record {
        Record::Client(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Client(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::build;

    #[test]
    fn test_only_company_name_is_required() {
        let client: Client = build(&ClientDraft::new("Acme")).unwrap();
        assert_eq!(client.company_name, "Acme");
        assert!(client.address_line_1.is_none());
        assert!(client.country.is_none());
        assert!(client.email.is_none());
        assert!(client.billing_email.is_none());
    }

    #[test]
    fn test_missing_company_name_rejected() {
        let err = build::<Client>(&ClientDraft::default()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("company_name"));
    }

    #[test]
    fn test_field_map_without_company_name_rejected() {
        let draft: ClientDraft = serde_json::from_str(r#"{"city": "Berlin"}"#).unwrap();
        assert_eq!(draft.city.as_deref(), Some("Berlin"));
        assert!(build::<Client>(&draft).is_err());
    }

    #[test]
    fn test_country_normalized_and_displayed_by_name() {
        let mut draft = ClientDraft::new("Acme");
        draft.country = Some("nl".into());
        let client: Client = build(&draft).unwrap();
        assert_eq!(client.field("country"), Some(FieldValue::from("NL")));
        assert_eq!(client.display_field("country").as_deref(), Some("Netherlands"));
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let mut draft = ClientDraft::new("Acme");
        draft.city = Some("   ".into());
        draft.email = Some("".into());
        let client: Client = build(&draft).unwrap();
        assert!(client.city.is_none());
        assert!(client.email.is_none());
        assert_eq!(client.field("city"), Some(FieldValue::Null));
    }

    #[test]
    fn test_bad_billing_email_rejected() {
        let mut draft = ClientDraft::new("Acme");
        draft.billing_email = Some("billing at acme".into());
        let err = build::<Client>(&draft).unwrap_err();
        assert!(err.to_string().contains("billing_email"));
    }

    #[test]
    fn test_draft_roundtrip() {
        let mut draft = ClientDraft::new("Acme");
        draft.country = Some("DE".into());
        draft.phone_number = Some("+49 30 123".into());
        let client: Client = build(&draft).unwrap();
        assert_eq!(client.to_draft(), draft);
    }

    #[test]
    fn test_unknown_field() {
        let client: Client = build(&ClientDraft::new("Acme")).unwrap();
        assert!(client.field("primary_contact").is_none());
        assert!(Client::field_spec("company_name").is_some());
        assert!(Client::field_spec("nope").is_none());
    }
}
