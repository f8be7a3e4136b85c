//! Listing, search and filtering through queries

use crate::common::*;

fn company_names(clients: Vec<Client>) -> Vec<String> {
    clients.into_iter().map(|c| c.company_name).collect()
}

#[test]
fn clients_list_by_company_name_regardless_of_insertion() {
    let t = TestDb::new_in_memory();
    for name in ["Mango", "acme", "Zeta", "Bolt"] {
        t.client(name);
    }
    assert_eq!(
        company_names(t.clients.list().unwrap()),
        vec!["acme", "Bolt", "Mango", "Zeta"]
    );
}

#[test]
fn contacts_list_by_last_then_first_name() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    t.contact(&acme, "Zed", "Adams");
    t.contact(&acme, "Amy", "Brown");
    t.contact(&acme, "Amy", "Adams");
    let names: Vec<String> = t
        .contacts
        .list()
        .unwrap()
        .iter()
        .map(|c| c.label())
        .collect();
    assert_eq!(names, vec!["Amy Adams", "Zed Adams", "Amy Brown"]);
}

#[test]
fn time_entries_list_newest_first() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let first = t.entry(&website, on(1, 9), on(1, 10));
    let third = t.entry(&website, on(3, 9), on(3, 10));
    let second = t.entry(&website, on(2, 9), on(2, 10));
    assert_eq!(t.entries.list().unwrap(), vec![third, second, first]);
}

#[test]
fn search_across_relation() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme Widgets");
    let bolt = t.client("Bolt");
    let website = t.project(&acme, "Website");
    let launch = t.project(&bolt, "Website relaunch");
    t.entry(&website, on(1, 9), on(1, 10));
    t.entry(&launch, on(2, 9), on(2, 10));

    let found = t
        .entries
        .query(&Query::new().search("website acme", ["project__name", "project__client__company_name"]))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].project, website.id);
}

#[test]
fn completed_filter_and_toggle() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    t.project(&acme, "Shop");
    t.projects.set_completed(website.id, true).unwrap();

    let done = t
        .projects
        .query(&Query::new().exact("completed", true))
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, website.id);

    t.projects.set_completed(website.id, false).unwrap();
    assert!(t
        .projects
        .query(&Query::new().exact("completed", true))
        .unwrap()
        .is_empty());
}

#[test]
fn client_children_listings() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    t.project(&acme, "Zebra");
    t.project(&acme, "Apple");
    t.contact(&acme, "Ada", "Lovelace");
    let names: Vec<String> = t
        .clients
        .projects(acme.id)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Apple", "Zebra"]);
    assert_eq!(t.clients.contacts(acme.id).unwrap().len(), 1);
}

#[test]
fn unknown_query_field_is_config_error() {
    let t = TestDb::new_in_memory();
    let err = t
        .clients
        .query(&Query::new().order_by(vec![SortKey::asc("revenue")]))
        .unwrap_err();
    assert!(matches!(err, TimekeepError::Config(_)));
}
