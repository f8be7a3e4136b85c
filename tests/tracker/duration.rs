//! Computed time-entry duration

use chrono::Duration;

use crate::common::*;

#[test]
fn working_day_is_eight_and_a_half_hours() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let e = t.entry(&website, at(9, 0), at(17, 30));
    assert_eq!(e.duration(), Duration::hours(8) + Duration::minutes(30));
    assert_eq!(
        e.field("duration"),
        Some(FieldValue::Duration(Duration::minutes(510)))
    );
}

#[test]
fn end_before_start_gives_negative_duration() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let e = t.entry(&website, at(12, 0), at(11, 15));
    assert_eq!(e.duration(), Duration::minutes(-45));
}

#[test]
fn duration_follows_updates() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let e = t.entry(&website, at(9, 0), at(10, 0));
    let mut draft = e.to_draft();
    draft.end_time = Some(at(13, 0));
    t.entries.update(e.id, &draft).unwrap();
    assert_eq!(t.entries.get(e.id).unwrap().duration(), Duration::hours(4));
}

#[test]
fn project_total_sums_entries() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let other = t.project(&acme, "Other");
    t.entry(&website, on(1, 9), on(1, 17));
    t.entry(&website, on(2, 9), on(2, 10));
    t.entry(&other, on(3, 9), on(3, 12));
    assert_eq!(
        t.entries.total_duration(website.id).unwrap(),
        Duration::hours(9)
    );
    assert_eq!(t.entries.total_duration(other.id).unwrap(), Duration::hours(3));
}

#[test]
fn duration_is_never_stored() {
    let t = TestDb::new();
    let acme = t.client("Acme");
    let website = t.project(&acme, "Website");
    let e = t.entry(&website, at(9, 0), at(17, 30));
    let t = t.reopen();
    assert_eq!(t.entries.get(e.id).unwrap().duration(), Duration::minutes(510));
}
