//! Default admin site over a populated database

use crate::common::*;

fn populated() -> (TestDb, AdminSite) {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let bolt = t.client("Bolt");
    t.primary(&acme, "Ada", "Lovelace");
    t.contact(&bolt, "Bob", "Builder");
    let website = t.project(&acme, "Website");
    let launch = t.project(&bolt, "Launch");
    t.entry(&website, on(1, 9), on(1, 17));
    t.entry(&launch, on(2, 9), on(2, 11));
    (t, AdminSite::with_defaults().unwrap())
}

#[test]
fn project_changelist_orders_by_client_then_name() {
    let (t, site) = populated();
    let acme = t.clients.list().unwrap().remove(0);
    t.project(&acme, "Apps");

    let page = site
        .projects()
        .changelist(ChangeListParams::new())
        .run(&t.db.snapshot())
        .unwrap();
    let cells: Vec<(String, String)> = page
        .rows
        .iter()
        .map(|r| (r.cells[0].clone(), r.cells[1].clone()))
        .collect();
    assert_eq!(
        cells,
        vec![
            ("Apps".to_string(), "Acme".to_string()),
            ("Website".to_string(), "Acme".to_string()),
            ("Launch".to_string(), "Bolt".to_string()),
        ]
    );
    assert_eq!(page.rows[0].cells[2], "no");
}

#[test]
fn time_entry_changelist_filters_by_project_name() {
    let (t, site) = populated();
    let page = site
        .time_entries()
        .changelist(ChangeListParams::new().filter("project__name", "Launch"))
        .run(&t.db.snapshot())
        .unwrap();
    assert_eq!(page.result_count, 1);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.rows[0].cells[0], "Launch");
    assert_eq!(page.rows[0].cells[3], format_duration(chrono::Duration::hours(2)));
}

#[test]
fn contact_changelist_filters_primary() {
    let (t, site) = populated();
    let page = site
        .contacts()
        .changelist(ChangeListParams::new().filter("is_primary", "yes"))
        .run(&t.db.snapshot())
        .unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].label, "Ada Lovelace");
}

#[test]
fn contact_search_covers_every_search_field() {
    let (t, site) = populated();
    let acme = t.clients.list().unwrap().remove(0);
    let mut draft = ContactDraft::new(acme.id, "Cy", "Clark");
    draft.phone_number = Some("+31 20 555 0100".into());
    t.contacts.create(&draft).unwrap();

    let page = site
        .contacts()
        .changelist(ChangeListParams::new().search("555"))
        .run(&t.db.snapshot())
        .unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].label, "Cy Clark");
}

#[test]
fn project_filter_specs() {
    let (t, site) = populated();
    let specs = site
        .projects()
        .changelist(ChangeListParams::new())
        .filter_specs(&t.db.snapshot())
        .unwrap();
    let kinds: Vec<FilterKind> = specs.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![FilterKind::Values, FilterKind::Date, FilterKind::Boolean]);
    let clients: Vec<&str> = specs[0].choices.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(clients, vec!["Acme", "Bolt"]);
}

#[test]
fn time_entry_autocomplete_uses_project_search() {
    let (t, site) = populated();
    let choices = site
        .autocomplete(&t.db.snapshot(), EntityKind::TimeEntry, "project", "lau")
        .unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].label, "Launch");
}

#[test]
fn client_change_view_lists_contacts_inline() {
    let (t, site) = populated();
    let acme = t.clients.list().unwrap().remove(0);
    let view = site.change_view(&t.db.snapshot(), acme.key()).unwrap();
    assert_eq!(view.inlines.len(), 1);
    assert_eq!(view.inlines[0].rows.len(), 1);
    assert_eq!(view.inlines[0].rows[0].label, "Ada Lovelace");
}
