//! RecordSnapshot: point-in-time view via deep clone
//!
//! Provides the version-bounded view transactions read from.
//!
//! # Design Notes
//!
//! - **Deep clone**: the record map and child index are copied at creation
//! - **Immutable**: once created, the snapshot never changes
//! - **Thread-safe**: the cloned data is `Arc`-wrapped and cheap to share

use std::collections::BTreeMap;
use std::sync::Arc;

use timekeep_core::{EntityKind, Record, RecordKey, Result, SnapshotView, Versioned};

use crate::index::ChildIndex;

/// Immutable snapshot of the record store
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    version: u64,
    data: Arc<BTreeMap<RecordKey, Versioned<Record>>>,
    children: Arc<ChildIndex>,
}

impl RecordSnapshot {
    /// Create a snapshot from cloned store state
    ///
    /// Normally called by `RecordStore::create_snapshot()`.
    pub fn new(
        version: u64,
        data: BTreeMap<RecordKey, Versioned<Record>>,
        children: ChildIndex,
    ) -> Self {
        Self {
            version,
            data: Arc::new(data),
            children: Arc::new(children),
        }
    }

    /// Number of records in the snapshot
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SnapshotView for RecordSnapshot {
    fn get(&self, key: &RecordKey) -> Result<Option<Versioned<Record>>> {
        Ok(self.data.get(key).cloned())
    }

    fn scan_kind(&self, kind: EntityKind) -> Result<Vec<Versioned<Record>>> {
        Ok(self
            .data
            .range(RecordKey::kind_start(kind)..=RecordKey::kind_end(kind))
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn children_of(&self, parent: &RecordKey) -> Result<Vec<RecordKey>> {
        Ok(self.children.children(parent))
    }

    fn version(&self) -> u64 {
        self.version
    }
}
