//! Secondary index: owner → owned records
//!
//! Maps each parent key (client, project) to the keys of the records it
//! owns. Used for cascade deletes, for the primary-contact check and for
//! the commit-time orphan check, so none of them scans a whole kind.

use std::collections::{BTreeSet, HashMap};

use timekeep_core::RecordKey;

/// Parent → children index
#[derive(Debug, Default, Clone)]
pub struct ChildIndex {
    index: HashMap<RecordKey, BTreeSet<RecordKey>>,
}

impl ChildIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    /// Link `child` under `parent`
    pub fn insert(&mut self, parent: RecordKey, child: RecordKey) {
        self.index.entry(parent).or_default().insert(child);
    }

    /// Unlink `child` from `parent`
    ///
    /// Drops the parent entry once it has no children left.
    pub fn remove(&mut self, parent: &RecordKey, child: &RecordKey) {
        if let Some(children) = self.index.get_mut(parent) {
            children.remove(child);
            if children.is_empty() {
                self.index.remove(parent);
            }
        }
    }

    /// Children of `parent`, in key order
    pub fn children(&self, parent: &RecordKey) -> Vec<RecordKey> {
        self.index
            .get(parent)
            .map(|children| children.iter().copied().collect())
            .unwrap_or_default()
    }

    /// True if `parent` has at least one child
    pub fn has_children(&self, parent: &RecordKey) -> bool {
        self.index.contains_key(parent)
    }

    /// Number of parents with children
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if no parent has children
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
