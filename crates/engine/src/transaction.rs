//! Typed record operations on a transaction
//!
//! `RecordOps` is an extension trait over `TransactionContext`: it turns the
//! untyped `Record` get/put/delete surface into entity-typed calls so the
//! stores never match on `Record` variants themselves.
//!
//! ## Usage
//!
//! ```text
//! db.transaction(|txn| {
//!     let mut project: Project = txn.require(project_id)?;
//!     project.completed = true;
//!     txn.store(project)
//! })?;
//! ```

use timekeep_concurrency::TransactionContext;
use timekeep_core::{Entity, RecordId, RecordKey, Result, TimekeepError};

/// Entity-typed operations available within a transaction
pub trait RecordOps {
    /// Load a record; `None` if absent (or of another kind)
    fn load<E: Entity>(&mut self, id: RecordId) -> Result<Option<E>>;

    /// Load a record or fail with `NotFound`
    fn require<E: Entity>(&mut self, id: RecordId) -> Result<E>;

    /// Buffer a full-record write
    fn store<E: Entity>(&mut self, entity: E) -> Result<()>;

    /// Buffer a delete
    fn remove(&mut self, key: RecordKey) -> Result<()>;

    /// Every record of one kind, unordered
    fn scan<E: Entity>(&mut self) -> Result<Vec<E>>;

    /// Records of kind `E` owned by `parent`
    fn children<E: Entity>(&mut self, parent: RecordKey) -> Result<Vec<E>>;
}

impl RecordOps for TransactionContext {
    fn load<E: Entity>(&mut self, id: RecordId) -> Result<Option<E>> {
        let key = RecordKey::new(E::KIND, id);
        Ok(self.get(&key)?.and_then(E::from_record))
    }

    fn require<E: Entity>(&mut self, id: RecordId) -> Result<E> {
        self.load(id)?
            .ok_or_else(|| TimekeepError::not_found(E::KIND, id))
    }

    fn store<E: Entity>(&mut self, entity: E) -> Result<()> {
        self.put(entity.into_record())
    }

    fn remove(&mut self, key: RecordKey) -> Result<()> {
        self.delete(key)
    }

    fn scan<E: Entity>(&mut self) -> Result<Vec<E>> {
        Ok(self
            .scan_kind(E::KIND)?
            .into_iter()
            .filter_map(E::from_record)
            .collect())
    }

    fn children<E: Entity>(&mut self, parent: RecordKey) -> Result<Vec<E>> {
        let mut out = Vec::new();
        for key in self.children_of(&parent)? {
            if key.kind != E::KIND {
                continue;
            }
            if let Some(entity) = self.load(key.id)? {
                out.push(entity);
            }
        }
        Ok(out)
    }
}
