//! Ownership cascades on delete

use crate::common::*;

#[test]
fn deleting_client_removes_everything_it_owns() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let bolt = t.client("Bolt");
    t.primary(&acme, "Ada", "Lovelace");
    t.contact(&acme, "Bob", "Builder");
    let kept_contact = t.contact(&bolt, "Cy", "Clark");
    let website = t.project(&acme, "Website");
    let shop = t.project(&acme, "Shop");
    let kept_project = t.project(&bolt, "Launch");
    t.entry(&website, at(9, 0), at(10, 0));
    t.entry(&shop, at(11, 0), at(12, 0));
    let kept_entry = t.entry(&kept_project, at(13, 0), at(14, 0));

    let summary = t.clients.delete(acme.id).unwrap();
    assert_eq!(summary.clients, 1);
    assert_eq!(summary.contacts, 2);
    assert_eq!(summary.projects, 2);
    assert_eq!(summary.time_entries, 2);
    assert_eq!(summary.total(), 7);

    assert!(t.clients.get(acme.id).unwrap_err().is_not_found());
    assert_eq!(t.contacts.list().unwrap(), vec![kept_contact]);
    assert_eq!(t.projects.list().unwrap(), vec![kept_project]);
    assert_eq!(t.entries.list().unwrap(), vec![kept_entry]);
}

#[test]
fn deleting_project_removes_only_its_entries() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let shop = t.project(&acme, "Shop");
    t.entry(&website, at(9, 0), at(10, 0));
    let kept = t.entry(&shop, at(9, 0), at(10, 0));

    let summary = t.projects.delete(website.id).unwrap();
    assert_eq!(summary.projects, 1);
    assert_eq!(summary.time_entries, 1);
    assert_eq!(summary.clients, 0);
    assert_eq!(t.entries.list().unwrap(), vec![kept]);
    assert!(t.clients.get(acme.id).is_ok());
}

#[test]
fn deleting_missing_record_is_not_found() {
    let t = TestDb::new_in_memory();
    assert!(t.clients.delete(RecordId::new()).unwrap_err().is_not_found());
    assert!(t.entries.delete(RecordId::new()).unwrap_err().is_not_found());
}

#[test]
fn deleting_contact_does_not_cascade() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let ada = t.primary(&acme, "Ada", "Lovelace");
    let summary = t.contacts.delete(ada.id).unwrap();
    assert_eq!(summary.total(), 1);
    assert!(t.clients.get(acme.id).is_ok());
    assert!(t.clients.primary_contact(acme.id).unwrap().is_none());
}

#[test]
fn cascade_survives_reopen() {
    let t = TestDb::new();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    t.entry(&website, at(9, 0), at(10, 0));
    t.clients.delete(acme.id).unwrap();

    let t = t.reopen();
    assert!(t.clients.list().unwrap().is_empty());
    assert!(t.projects.list().unwrap().is_empty());
    assert!(t.entries.list().unwrap().is_empty());
}
