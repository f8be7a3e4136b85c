//! At most one primary contact per client

use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;

use crate::common::*;

#[test]
fn new_primary_demotes_existing_primary() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let b = t.primary(&acme, "Bea", "Brown");
    let a = t.primary(&acme, "Al", "Adams");

    assert!(t.contacts.get(a.id).unwrap().is_primary);
    let b_now = t.contacts.get(b.id).unwrap();
    assert!(!b_now.is_primary);
    assert!(b_now.updated_at >= b.updated_at);
    assert_eq!(t.primaries_of(acme.id), vec![a.id]);
}

#[test]
fn resetting_current_primary_touches_nothing() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let a = t.primary(&acme, "Al", "Adams");
    let others: Vec<Contact> = (0..3)
        .map(|i| t.contact(&acme, "Other", &format!("Person{}", i)))
        .collect();

    let result = t.contacts.set_primary(acme.id, a.id).unwrap();
    assert_eq!(result, a);
    assert_eq!(t.primaries_of(acme.id), vec![a.id]);
    for other in others {
        assert_eq!(t.contacts.get(other.id).unwrap(), other);
    }
}

#[test]
fn updating_primary_contact_keeps_it_primary() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let a = t.primary(&acme, "Al", "Adams");
    let mut draft = a.to_draft();
    draft.email = Some("al@acme.com".into());
    let updated = t.contacts.update(a.id, &draft).unwrap();
    assert!(updated.is_primary);
    assert_eq!(t.primaries_of(acme.id), vec![a.id]);
}

#[test]
fn demotion_does_not_cross_clients() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let bolt = t.client("Bolt");
    let a = t.primary(&acme, "Al", "Adams");
    let b = t.primary(&bolt, "Bea", "Brown");
    t.primary(&acme, "Cy", "Clark");
    assert!(!t.contacts.get(a.id).unwrap().is_primary);
    assert!(t.contacts.get(b.id).unwrap().is_primary);
}

#[test]
fn client_primary_contact_lookup() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    assert!(t.clients.primary_contact(acme.id).unwrap().is_none());
    let a = t.primary(&acme, "Al", "Adams");
    assert_eq!(t.clients.primary_contact(acme.id).unwrap().map(|c| c.id), Some(a.id));
}

#[test]
fn concurrent_set_primary_never_yields_two_primaries() {
    let t = TestDb::new_in_memory_with_retry(RetryConfig::new().with_max_retries(16));
    let acme = t.client("Acme");
    let contacts: Vec<Contact> = (0..8)
        .map(|i| t.contact(&acme, "Worker", &format!("N{}", i)))
        .collect();

    let barrier = Arc::new(Barrier::new(contacts.len()));
    let handles: Vec<_> = contacts
        .iter()
        .map(|c| {
            let store = t.contacts.clone();
            let barrier = barrier.clone();
            let (client, contact) = (acme.id, c.id);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10 {
                    match store.set_primary(client, contact) {
                        Ok(_) => {}
                        Err(e) => assert!(e.is_conflict(), "unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(t.primaries_of(acme.id).len(), 1);
}

#[test]
fn concurrent_primary_creates_never_yield_two_primaries() {
    let t = TestDb::new_in_memory();
    let acme = t.client("Acme");
    let barrier = Arc::new(Barrier::new(6));
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let store = t.contacts.clone();
            let barrier = barrier.clone();
            let client = acme.id;
            thread::spawn(move || {
                barrier.wait();
                let draft = ContactDraft::new(client, "Racer", format!("R{}", i)).primary(true);
                store.create(&draft).map(|_| ())
            })
        })
        .collect();

    let mut created = 0;
    for h in handles {
        match h.join().unwrap() {
            Ok(()) => created += 1,
            Err(e) => assert!(e.is_conflict(), "unexpected error: {}", e),
        }
    }
    assert!(created >= 1);
    assert_eq!(t.contacts.list().unwrap().len(), created);
    assert_eq!(t.primaries_of(acme.id).len(), 1);
}

// ============================================================================
// Property: any sequence of writes leaves at most one primary per client
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Create { client: usize, primary: bool },
    SetPrimary { contact: usize },
    Toggle { contact: usize, primary: bool },
    Move { contact: usize, client: usize },
    Delete { contact: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..3usize, any::<bool>()).prop_map(|(client, primary)| Op::Create { client, primary }),
        2 => (0..16usize).prop_map(|contact| Op::SetPrimary { contact }),
        2 => (0..16usize, any::<bool>()).prop_map(|(contact, primary)| Op::Toggle { contact, primary }),
        1 => (0..16usize, 0..3usize).prop_map(|(contact, client)| Op::Move { contact, client }),
        1 => (0..16usize).prop_map(|contact| Op::Delete { contact }),
    ]
}

fn apply(t: &TestDb, clients: &[Client], op: Op) {
    let contacts = t.contacts.list().unwrap();
    let pick = |i: usize| (!contacts.is_empty()).then(|| contacts[i % contacts.len()].clone());
    match op {
        Op::Create { client, primary } => {
            let draft = ContactDraft::new(clients[client].id, "Prop", "Test").primary(primary);
            t.contacts.create(&draft).unwrap();
        }
        Op::SetPrimary { contact } => {
            if let Some(c) = pick(contact) {
                t.contacts.set_primary(c.client, c.id).unwrap();
            }
        }
        Op::Toggle { contact, primary } => {
            if let Some(c) = pick(contact) {
                let draft = c.to_draft().primary(primary);
                t.contacts.update(c.id, &draft).unwrap();
            }
        }
        Op::Move { contact, client } => {
            if let Some(c) = pick(contact) {
                let mut draft = c.to_draft();
                draft.client = Some(clients[client].id);
                t.contacts.update(c.id, &draft).unwrap();
            }
        }
        Op::Delete { contact } => {
            if let Some(c) = pick(contact) {
                t.contacts.delete(c.id).unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn at_most_one_primary_per_client(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let t = TestDb::new_in_memory();
        let clients: Vec<Client> = ["Acme", "Bolt", "Core"].iter().map(|n| t.client(n)).collect();
        for op in ops {
            apply(&t, &clients, op);
            for client in &clients {
                prop_assert!(t.primaries_of(client.id).len() <= 1);
            }
        }
    }
}
