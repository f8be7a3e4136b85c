//! Transaction validation for OCC
//!
//! Runs under the commit lock against the live store.
//!
//! Key rules:
//! - First-committer-wins based on the READ-SET, not the write-set
//! - Blind writes (write without read) do not conflict
//! - Constraints are re-checked against committed state, so two
//!   transactions that each looked valid in their snapshots cannot both
//!   commit a broken store
//!
//! ## Outcomes
//!
//! | Finding | Kind | Surfaces as |
//! |---------|------|-------------|
//! | read-set version changed | `ConflictType::ReadWriteConflict` | `Conflict` (retried) |
//! | second primary contact for a client | `ConflictType::DuplicatePrimary` | `Conflict` (retried) |
//! | write references a missing owner | `IntegrityViolation::MissingParent` | `Integrity` |
//! | owned record committed after the deleting txn's snapshot | `ConflictType::ChildAdded` | `Conflict` (retried) |
//! | delete leaves an owned record behind | `IntegrityViolation::OrphanedChild` | `Integrity` |
//!
//! Conflicts win over violations: a violation found alongside a stale read
//! may be an artifact of the stale read, and a retry re-evaluates it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use timekeep_core::{EntityKind, Record, RecordId, RecordKey, Result, Storage};

use crate::transaction::TransactionContext;

/// Transient conflicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// A record read by the transaction changed before it committed
    ReadWriteConflict {
        /// Key that changed
        key: RecordKey,
        /// Version recorded in the read-set
        read_version: u64,
        /// Version in the store at validation time
        current_version: u64,
    },

    /// Committing would leave a client with two primary contacts
    DuplicatePrimary {
        /// Client id
        client: RecordId,
        /// Contact this transaction makes primary
        contact: RecordId,
        /// Other contact that is primary after the commit
        other: RecordId,
    },

    /// A deleted owner gained a child after the deleting transaction began
    ChildAdded {
        /// Deleted owner
        parent: RecordKey,
        /// Child committed concurrently
        child: RecordKey,
        /// Commit version of the child
        version: u64,
    },
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::ReadWriteConflict {
                key,
                read_version,
                current_version,
            } => write!(
                f,
                "{} changed (read at version {}, now {})",
                key, read_version, current_version
            ),
            ConflictType::DuplicatePrimary {
                client,
                contact,
                other,
            } => write!(
                f,
                "client {} would have two primary contacts ({} and {})",
                client, contact, other
            ),
            ConflictType::ChildAdded {
                parent,
                child,
                version,
            } => write!(
                f,
                "{} gained {} at version {} while being deleted",
                parent, child, version
            ),
        }
    }
}

/// Referential integrity violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A written record's owner does not exist
    MissingParent {
        /// Written record
        child: RecordKey,
        /// Owner it references
        parent: RecordKey,
    },

    /// A deleted record still owns a record that is not deleted
    OrphanedChild {
        /// Deleted owner
        parent: RecordKey,
        /// Surviving owned record
        child: RecordKey,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::MissingParent { child, parent } => {
                write!(f, "{} references missing {}", child, parent)
            }
            IntegrityViolation::OrphanedChild { parent, child } => {
                write!(f, "deleting {} would orphan {}", parent, child)
            }
        }
    }
}

/// Result of transaction validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Transient conflicts
    pub conflicts: Vec<ConflictType>,
    /// Integrity violations
    pub violations: Vec<IntegrityViolation>,
}

impl ValidationResult {
    /// Successful validation
    pub fn ok() -> Self {
        Self::default()
    }

    /// True if nothing was found
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty() && self.violations.is_empty()
    }

    /// True if at least one transient conflict was found
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// Number of integrity violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
        self.violations.extend(other.violations);
    }

    /// One-line description led by the first finding
    pub fn summary(&self) -> String {
        let first = self
            .conflicts
            .first()
            .map(|c| c.to_string())
            .or_else(|| self.violations.first().map(|v| v.to_string()))
            .unwrap_or_else(|| "no findings".to_string());
        let total = self.conflict_count() + self.violation_count();
        if total > 1 {
            format!("{} (+{} more)", first, total - 1)
        } else {
            first
        }
    }
}

/// Validate the read-set against the live store
pub fn validate_read_set<S: Storage>(
    read_set: &HashMap<RecordKey, u64>,
    store: &S,
) -> Result<ValidationResult> {
    let mut result = ValidationResult::ok();
    for (key, read_version) in read_set {
        let current_version = store.get(key)?.map(|v| v.version).unwrap_or(0);
        if current_version != *read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: *key,
                read_version: *read_version,
                current_version,
            });
        }
    }
    Ok(result)
}

/// Record as it would be after the commit: own write, own delete, or store
fn effective<S: Storage>(
    txn: &TransactionContext,
    store: &S,
    key: &RecordKey,
) -> Result<Option<Record>> {
    if let Some(record) = txn.written(key) {
        return Ok(Some(record.clone()));
    }
    if txn.is_deleted(key) {
        return Ok(None);
    }
    Ok(store.get(key)?.map(|v| v.value))
}

/// Check ownership and primary-contact constraints against the live store
pub fn validate_constraints<S: Storage>(
    txn: &TransactionContext,
    store: &S,
) -> Result<ValidationResult> {
    let mut result = ValidationResult::ok();

    // Every written record's owner must exist after the commit
    for record in txn.writes() {
        if let Some(parent) = record.parent() {
            if effective(txn, store, &parent)?.is_none() {
                result.violations.push(IntegrityViolation::MissingParent {
                    child: record.key(),
                    parent,
                });
            }
        }
    }

    // A deleted owner must take all of its committed children with it.
    // Children the snapshot never saw make a retry cascade over them.
    for parent in txn.deletes() {
        for child in store.children_of(parent)? {
            if txn.is_deleted(&child) || txn.written(&child).is_some() {
                continue;
            }
            match store.get(&child)? {
                Some(v) if v.version > txn.start_version => {
                    result.conflicts.push(ConflictType::ChildAdded {
                        parent: *parent,
                        child,
                        version: v.version,
                    });
                }
                _ => result.violations.push(IntegrityViolation::OrphanedChild {
                    parent: *parent,
                    child,
                }),
            }
        }
    }

    // At most one primary contact per client
    for record in txn.writes() {
        let contact = match record.as_contact() {
            Some(c) if c.is_primary => c,
            _ => continue,
        };
        let client_key = RecordKey::new(EntityKind::Client, contact.client);
        let mut candidates: BTreeSet<RecordKey> =
            store.children_of(&client_key)?.into_iter().collect();
        candidates.extend(
            txn.writes()
                .filter(|r| r.parent() == Some(client_key))
                .map(|r| r.key()),
        );

        for key in candidates {
            if key.kind != EntityKind::Contact || key.id == contact.id {
                continue;
            }
            if let Some(Record::Contact(other)) = effective(txn, store, &key)? {
                if other.is_primary && other.client == contact.client {
                    result.conflicts.push(ConflictType::DuplicatePrimary {
                        client: contact.client,
                        contact: contact.id,
                        other: other.id,
                    });
                }
            }
        }
    }

    Ok(result)
}

/// Full commit-time validation: read-set, then constraints
pub fn validate_transaction<S: Storage>(
    txn: &TransactionContext,
    store: &S,
) -> Result<ValidationResult> {
    let mut result = validate_read_set(&txn.read_set, store)?;
    result.merge(validate_constraints(txn, store)?);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, contact, project, store_with};
    use timekeep_core::Entity;

    fn begin(store: &timekeep_storage::RecordStore) -> TransactionContext {
        TransactionContext::with_snapshot(1, Box::new(store.create_snapshot()))
    }

    #[test]
    fn test_unchanged_read_set_is_valid() {
        let c = client("Acme");
        let store = store_with(vec![c.clone().into_record()]);
        let mut txn = begin(&store);
        txn.get(&c.key()).unwrap();
        assert!(validate_transaction(&txn, &store).unwrap().is_valid());
    }

    #[test]
    fn test_concurrent_change_is_conflict() {
        let c = client("Acme");
        let store = store_with(vec![c.clone().into_record()]);
        let mut txn = begin(&store);
        txn.get(&c.key()).unwrap();

        store.apply_batch(vec![c.clone().into_record()], vec![], 2).unwrap();

        let result = validate_transaction(&txn, &store).unwrap();
        assert_eq!(
            result.conflicts,
            vec![ConflictType::ReadWriteConflict {
                key: c.key(),
                read_version: 1,
                current_version: 2
            }]
        );
    }

    #[test]
    fn test_blind_write_does_not_conflict() {
        let c = client("Acme");
        let store = store_with(vec![c.clone().into_record()]);
        let mut txn = begin(&store);
        txn.put(c.clone().into_record()).unwrap();
        store.apply_batch(vec![c.clone().into_record()], vec![], 2).unwrap();
        assert!(validate_transaction(&txn, &store).unwrap().is_valid());
    }

    #[test]
    fn test_write_with_missing_parent_is_violation() {
        let store = store_with(vec![]);
        let mut txn = begin(&store);
        let k = contact(RecordId::new(), "Orphan", false);
        txn.put(k.clone().into_record()).unwrap();

        let result = validate_constraints(&txn, &store).unwrap();
        assert!(!result.has_conflicts());
        assert!(matches!(
            result.violations.as_slice(),
            [IntegrityViolation::MissingParent { child, .. }] if *child == k.key()
        ));
    }

    #[test]
    fn test_parent_written_in_same_txn_satisfies() {
        let store = store_with(vec![]);
        let mut txn = begin(&store);
        let c = client("Acme");
        txn.put(c.clone().into_record()).unwrap();
        txn.put(project(c.id, "Website").into_record()).unwrap();
        assert!(validate_constraints(&txn, &store).unwrap().is_valid());
    }

    #[test]
    fn test_delete_without_children_is_orphaning() {
        let c = client("Acme");
        let p = project(c.id, "Website");
        let store = store_with(vec![c.clone().into_record(), p.clone().into_record()]);
        let mut txn = begin(&store);
        txn.delete(c.key()).unwrap();

        let result = validate_constraints(&txn, &store).unwrap();
        assert_eq!(
            result.violations,
            vec![IntegrityViolation::OrphanedChild {
                parent: c.key(),
                child: p.key()
            }]
        );

        txn.delete(p.key()).unwrap();
        assert!(validate_constraints(&txn, &store).unwrap().is_valid());
    }

    #[test]
    fn test_child_committed_after_snapshot_is_conflict() {
        let c = client("Acme");
        let store = store_with(vec![c.clone().into_record()]);
        let mut txn = begin(&store);
        txn.delete(c.key()).unwrap();

        // Another transaction adds a project the deleting txn never saw
        let late = project(c.id, "Late");
        store.apply_batch(vec![late.clone().into_record()], vec![], 2).unwrap();

        let result = validate_constraints(&txn, &store).unwrap();
        assert_eq!(result.violation_count(), 0);
        assert_eq!(
            result.conflicts,
            vec![ConflictType::ChildAdded {
                parent: c.key(),
                child: late.key(),
                version: 2
            }]
        );
    }

    #[test]
    fn test_second_primary_is_conflict() {
        let c = client("Acme");
        let existing = contact(c.id, "Existing", true);
        let store = store_with(vec![c.clone().into_record(), existing.clone().into_record()]);
        let mut txn = begin(&store);
        let new = contact(c.id, "New", true);
        txn.put(new.clone().into_record()).unwrap();

        let result = validate_constraints(&txn, &store).unwrap();
        assert_eq!(
            result.conflicts,
            vec![ConflictType::DuplicatePrimary {
                client: c.id,
                contact: new.id,
                other: existing.id
            }]
        );
    }

    #[test]
    fn test_demotion_in_same_txn_allows_new_primary() {
        let c = client("Acme");
        let mut existing = contact(c.id, "Existing", true);
        let store = store_with(vec![c.clone().into_record(), existing.clone().into_record()]);
        let mut txn = begin(&store);
        existing.is_primary = false;
        txn.put(existing.into_record()).unwrap();
        txn.put(contact(c.id, "New", true).into_record()).unwrap();
        assert!(validate_constraints(&txn, &store).unwrap().is_valid());
    }

    #[test]
    fn test_summary_mentions_first_finding() {
        let mut result = ValidationResult::ok();
        assert_eq!(result.summary(), "no findings");
        let key = client("Acme").key();
        result.violations.push(IntegrityViolation::MissingParent {
            child: key,
            parent: key,
        });
        result.violations.push(IntegrityViolation::MissingParent {
            child: key,
            parent: key,
        });
        assert!(result.summary().contains("references missing"));
        assert!(result.summary().ends_with("(+1 more)"));
    }

    proptest::proptest! {
        #[test]
        fn prop_at_most_one_primary_commits(flags in proptest::collection::vec(proptest::bool::ANY, 1..6)) {
            let c = client("Acme");
            let store = store_with(vec![c.clone().into_record()]);
            let mut txn = begin(&store);
            for (i, primary) in flags.iter().enumerate() {
                txn.put(contact(c.id, &format!("C{i}"), *primary).into_record()).unwrap();
            }
            let result = validate_constraints(&txn, &store).unwrap();
            let primaries = flags.iter().filter(|p| **p).count();
            proptest::prop_assert_eq!(result.is_valid(), primaries <= 1);
        }
    }
}
