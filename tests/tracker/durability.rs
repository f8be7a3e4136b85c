//! Disk-backed databases across reopen

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use crate::common::*;

#[test]
fn committed_records_survive_reopen() {
    let t = TestDb::new();
    let acme = t.client("Acme");
    let ada = t.primary(&acme, "Ada", "Lovelace");
    let website = t.project(&acme, "Website");
    let entry = t.entry(&website, at(9, 0), at(17, 30));
    let version = t.db.current_version();

    let t = t.reopen();
    assert_eq!(t.clients.get(acme.id).unwrap(), acme);
    assert_eq!(t.contacts.get(ada.id).unwrap(), ada);
    assert_eq!(t.entries.get(entry.id).unwrap(), entry);
    assert_eq!(t.db.current_version(), version);
    assert_eq!(t.clients.primary_contact(acme.id).unwrap(), Some(ada));
}

#[test]
fn strict_mode_survives_reopen() {
    let t = TestDb::new_strict();
    assert_eq!(t.db.durability_mode().as_str(), "always");
    let acme = t.client("Acme");
    let t = t.reopen();
    assert_eq!(t.db.durability_mode().as_str(), "always");
    assert_eq!(t.clients.list().unwrap(), vec![acme]);
}

#[test]
fn torn_log_tail_is_discarded() {
    let t = TestDb::new();
    let acme = t.client("Acme");
    let bolt = t.client("Bolt");

    let t = t.reopen_after(|dir| {
        let mut log = OpenOptions::new()
            .append(true)
            .open(dir.join("commit.log"))
            .unwrap();
        // Length prefix promising more bytes than follow
        log.write_all(&[0x40, 0x00, 0x00, 0x00, 0x01, 0xde, 0xad]).unwrap();
    });

    assert_eq!(t.clients.list().unwrap(), vec![acme, bolt]);
    let core = t.client("Core");
    let t = t.reopen();
    assert_eq!(t.clients.list().unwrap().len(), 3);
    assert_eq!(t.clients.get(core.id).unwrap(), core);
}

#[test]
fn opening_same_path_twice_shares_instance() {
    let t = TestDb::new();
    let again = Database::open(t.path()).unwrap();
    assert!(Arc::ptr_eq(&t.db, &again));
}

#[test]
fn first_open_writes_config_and_lock_files() {
    let t = TestDb::new();
    assert!(t.path().join("timekeep.toml").exists());
    assert!(t.path().join(".lock").exists());
    let cfg = t.db.config();
    assert_eq!(cfg.retry, RetryConfig::default());
}

#[test]
fn ephemeral_database_writes_nothing() {
    let t = TestDb::new_in_memory();
    t.client("Acme");
    assert!(t.db.is_ephemeral());
    assert!(t.db.data_dir().as_os_str().is_empty());
}

#[test]
fn shutdown_flushes_and_rejects_new_work() {
    let t = TestDb::new();
    let acme = t.client("Acme");
    t.db.shutdown().unwrap();
    assert!(!t.db.is_open());
    assert!(t.clients.create(&ClientDraft::new("Late")).is_err());

    let t = t.reopen();
    assert_eq!(t.clients.list().unwrap(), vec![acme]);
}
