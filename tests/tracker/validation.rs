//! Field validation through the stores

use crate::common::*;

#[test]
fn client_without_company_name_is_rejected() {
    let t = TestDb::new_in_memory();
    let err = t.clients.create(&ClientDraft::default()).unwrap_err();
    match err {
        TimekeepError::Validation { entity, field, .. } => {
            assert_eq!(entity, EntityKind::Client);
            assert_eq!(field, "company_name");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(t.clients.list().unwrap().is_empty());
}

#[test]
fn client_with_only_company_name_is_accepted() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    assert!(acme.address_line_1.is_none());
    assert!(acme.address_line_2.is_none());
    assert!(acme.city.is_none());
    assert!(acme.state.is_none());
    assert!(acme.postal_code.is_none());
    assert!(acme.country.is_none());
    assert!(acme.phone_number.is_none());
    assert!(acme.email.is_none());
    assert!(acme.billing_email.is_none());
}

#[test]
fn draft_from_field_map_missing_name_is_rejected() {
    let t = TestDb::new_in_memory();
    let draft: ClientDraft = serde_json::from_str(r#"{"email": "ops@acme.com"}"#).unwrap();
    assert!(t.clients.create(&draft).unwrap_err().is_validation());
}

#[test]
fn bad_email_and_country_are_rejected() {
    let t = TestDb::new_in_memory();
    let mut draft = ClientDraft::new("Acme");
    draft.email = Some("not an email".into());
    assert!(t.clients.create(&draft).unwrap_err().is_validation());

    let mut draft = ClientDraft::new("Acme");
    draft.country = Some("XX".into());
    assert!(t.clients.create(&draft).unwrap_err().is_validation());

    let mut draft = ClientDraft::new("Acme");
    draft.country = Some("de".into());
    let acme = t.clients.create(&draft).unwrap();
    assert_eq!(acme.country.map(|c| c.as_str().to_string()).as_deref(), Some("DE"));
}

#[test]
fn over_long_character_field_is_rejected() {
    let t = TestDb::new_in_memory();
    let err = t
        .clients
        .create(&ClientDraft::new("x".repeat(256)))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(t.clients.create(&ClientDraft::new("x".repeat(255))).is_ok());
}

#[test]
fn blank_optional_fields_normalize_to_none() {
    let t = TestDb::new_in_memory();
    let mut draft = ClientDraft::new("Acme");
    draft.city = Some("   ".into());
    let acme = t.clients.create(&draft).unwrap();
    assert!(acme.city.is_none());
}

#[test]
fn contact_requires_names_and_client() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let err = t
        .contacts
        .create(&ContactDraft::new(acme.id, "", "Lovelace"))
        .unwrap_err();
    assert!(err.is_validation());

    let draft = ContactDraft {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        ..Default::default()
    };
    assert!(t.contacts.create(&draft).unwrap_err().is_validation());
}

#[test]
fn names_are_not_unique() {
    let t = TestDb::new_in_memory();
    t.client("Acme");
    t.client("Acme");
    assert_eq!(t.clients.list().unwrap().len(), 2);
}

#[test]
fn failed_write_leaves_no_partial_effects() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let version = t.db.current_version();
    let mut draft = ContactDraft::new(acme.id, "Ada", "Lovelace").primary(true);
    draft.email = Some("broken".into());
    assert!(t.contacts.create(&draft).is_err());
    assert_eq!(t.db.current_version(), version);
    assert!(t.contacts.list().unwrap().is_empty());
}
