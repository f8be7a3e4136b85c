//! RecordStore: in-memory record storage with version management
//!
//! This module implements the Storage trait using:
//! - `BTreeMap<RecordKey, Versioned<Record>>` for ordered storage (kind → id)
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for the monotonically increasing commit version
//! - A parent → children index for ownership queries
//!
//! # Design Notes
//!
//! - **No version history**: each key holds only its latest record
//! - **Versions come from the transaction manager**: the store never
//!   allocates versions itself, it only records the highest one applied
//! - **Index updated under the same lock acquisition as the data**, so a
//!   snapshot never sees a child index out of step with the records

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use timekeep_core::{EntityKind, Record, RecordKey, Result, Storage, Versioned};

use crate::index::ChildIndex;
use crate::snapshot::RecordSnapshot;

/// Record storage backend
#[derive(Debug)]
pub struct RecordStore {
    /// Ordered map from key to latest record
    data: RwLock<BTreeMap<RecordKey, Versioned<Record>>>,
    /// Secondary index: parent → children
    children: RwLock<ChildIndex>,
    /// Highest applied commit version
    version: AtomicU64,
}

impl RecordStore {
    /// Create a new empty store at version 0
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            children: RwLock::new(ChildIndex::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Create a point-in-time snapshot
    ///
    /// Clones the data and the child index. O(n) in the number of records.
    pub fn create_snapshot(&self) -> RecordSnapshot {
        // Read lock before reading the version so the snapshot version
        // never lags the cloned data.
        let data = self.data.read();
        let children = self.children.read();
        let version = self.current_version();
        RecordSnapshot::new(version, data.clone(), children.clone())
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Number of records of one kind
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.data
            .read()
            .range(RecordKey::kind_start(kind)..=RecordKey::kind_end(kind))
            .count()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for RecordStore {
    fn get(&self, key: &RecordKey) -> Result<Option<Versioned<Record>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn scan_kind(&self, kind: EntityKind) -> Result<Vec<Versioned<Record>>> {
        let data = self.data.read();
        Ok(data
            .range(RecordKey::kind_start(kind)..=RecordKey::kind_end(kind))
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn children_of(&self, parent: &RecordKey) -> Result<Vec<RecordKey>> {
        Ok(self.children.read().children(parent))
    }

    /// Apply a batch of writes and deletes atomically
    ///
    /// Holds both write locks for the whole batch; no snapshot can observe
    /// a partial transaction. A write that changes a record's owner moves
    /// its index entry.
    fn apply_batch(
        &self,
        writes: Vec<Record>,
        deletes: Vec<RecordKey>,
        version: u64,
    ) -> Result<()> {
        let mut data = self.data.write();
        let mut children = self.children.write();

        let write_count = writes.len();
        let delete_count = deletes.len();

        for record in writes {
            let key = record.key();
            let new_parent = record.parent();
            if let Some(old) = data.get(&key) {
                if let Some(old_parent) = old.value.parent() {
                    if Some(old_parent) != new_parent {
                        children.remove(&old_parent, &key);
                    }
                }
            }
            if let Some(parent) = new_parent {
                children.insert(parent, key);
            }
            data.insert(key, Versioned::new(record, version));
        }

        for key in deletes {
            if let Some(removed) = data.remove(&key) {
                if let Some(parent) = removed.value.parent() {
                    children.remove(&parent, &key);
                }
            }
        }

        self.version.fetch_max(version, Ordering::SeqCst);

        trace!(
            target: "timekeep::store",
            version,
            writes = write_count,
            deletes = delete_count,
            "Applied batch"
        );
        Ok(())
    }

    fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use timekeep_core::{
        Client, ClientDraft, Contact, ContactDraft, Entity, Limits, Project, ProjectDraft,
        RecordId,
    };

    fn client(name: &str) -> Client {
        let now = Utc::now();
        Client::from_draft(RecordId::new(), &ClientDraft::new(name), &Limits::default(), now, now)
            .unwrap()
    }

    fn contact(client: RecordId, last: &str) -> Contact {
        let now = Utc::now();
        Contact::from_draft(
            RecordId::new(),
            &ContactDraft::new(client, "Ada", last),
            &Limits::default(),
            now,
            now,
        )
        .unwrap()
    }

    fn project(client: RecordId, name: &str) -> Project {
        let now = Utc::now();
        Project::from_draft(
            RecordId::new(),
            &ProjectDraft::new(client, name),
            &Limits::default(),
            now,
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.current_version(), 0);
    }

    #[test]
    fn test_apply_batch_sets_version() {
        let store = RecordStore::new();
        let c = client("Acme");
        store
            .apply_batch(vec![c.clone().into_record()], vec![], 5)
            .unwrap();

        let got = store.get(&c.key()).unwrap().unwrap();
        assert_eq!(got.version, 5);
        assert_eq!(got.value, c.into_record());
        assert_eq!(store.current_version(), 5);
    }

    #[test]
    fn test_version_never_decreases() {
        let store = RecordStore::new();
        store.apply_batch(vec![], vec![], 7).unwrap();
        store.apply_batch(vec![], vec![], 3).unwrap();
        assert_eq!(store.current_version(), 7);
    }

    #[test]
    fn test_scan_kind_only_returns_that_kind() {
        let store = RecordStore::new();
        let c = client("Acme");
        let p = project(c.id, "Website");
        let k = contact(c.id, "Lovelace");
        store
            .apply_batch(
                vec![c.clone().into_record(), p.into_record(), k.into_record()],
                vec![],
                1,
            )
            .unwrap();

        assert_eq!(store.scan_kind(EntityKind::Client).unwrap().len(), 1);
        assert_eq!(store.scan_kind(EntityKind::Project).unwrap().len(), 1);
        assert_eq!(store.count_kind(EntityKind::Contact), 1);
        assert_eq!(store.count_kind(EntityKind::TimeEntry), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_children_index_tracks_writes_and_deletes() {
        let store = RecordStore::new();
        let c = client("Acme");
        let p = project(c.id, "Website");
        let k = contact(c.id, "Lovelace");
        store
            .apply_batch(
                vec![c.clone().into_record(), p.clone().into_record(), k.clone().into_record()],
                vec![],
                1,
            )
            .unwrap();

        assert_eq!(store.children_of(&c.key()).unwrap(), vec![k.key(), p.key()]);

        store.apply_batch(vec![], vec![k.key()], 2).unwrap();
        assert_eq!(store.children_of(&c.key()).unwrap(), vec![p.key()]);
    }

    #[test]
    fn test_moving_child_updates_index() {
        let store = RecordStore::new();
        let a = client("Acme");
        let b = client("Globex");
        let mut k = contact(a.id, "Lovelace");
        store
            .apply_batch(
                vec![a.clone().into_record(), b.clone().into_record(), k.clone().into_record()],
                vec![],
                1,
            )
            .unwrap();

        k.client = b.id;
        store.apply_batch(vec![k.clone().into_record()], vec![], 2).unwrap();

        assert!(store.children_of(&a.key()).unwrap().is_empty());
        assert_eq!(store.children_of(&b.key()).unwrap(), vec![k.key()]);
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let store = RecordStore::new();
        let c = client("Acme");
        store.apply_batch(vec![], vec![c.key()], 1).unwrap();
        assert!(store.get(&c.key()).unwrap().is_none());
    }
}
