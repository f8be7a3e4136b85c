//! Field paths
//!
//! A path names a field of an entity, optionally through its owners:
//! `name`, `client__company_name`, `project__client__company_name`. Every
//! segment but the last must be a relation field.

use std::collections::HashMap;

use timekeep_core::{
    field_spec_of, EntityKind, FieldType, FieldValue, Record, RecordKey, Result, SnapshotView,
    TimekeepError,
};

/// Separator between path segments
pub const PATH_SEPARATOR: &str = "__";

/// Type of the field a path ends at
///
/// # Errors
///
/// `Config` when a segment is unknown or a non-final segment is not a
/// relation.
pub fn field_type_of(kind: EntityKind, path: &str) -> Result<FieldType> {
    let mut current = kind;
    let mut segments = path.split(PATH_SEPARATOR).peekable();
    while let Some(segment) = segments.next() {
        let spec = field_spec_of(current, segment).ok_or_else(|| {
            TimekeepError::config(format!(
                "unknown field '{}' in '{}' for {}",
                segment, path, current
            ))
        })?;
        if segments.peek().is_none() {
            return Ok(spec.ty);
        }
        match spec.ty {
            FieldType::Relation(target) => current = target,
            _ => {
                return Err(TimekeepError::config(format!(
                    "'{}' in '{}' is not a relation",
                    segment, path
                )))
            }
        }
    }
    Err(TimekeepError::config("empty field path"))
}

/// Resolves paths against records of one snapshot
///
/// Related records are cached per key, so resolving the same relation for
/// many rows loads it once.
pub struct FieldResolver<'a> {
    view: &'a dyn SnapshotView,
    cache: HashMap<RecordKey, Option<Record>>,
}

impl<'a> FieldResolver<'a> {
    /// Resolver over `view`
    pub fn new(view: &'a dyn SnapshotView) -> Self {
        FieldResolver {
            view,
            cache: HashMap::new(),
        }
    }

    /// Snapshot being resolved against
    pub fn view(&self) -> &'a dyn SnapshotView {
        self.view
    }

    /// Load a record through the cache
    pub fn load(&mut self, key: RecordKey) -> Result<Option<Record>> {
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let record = self.view.get(&key)?.map(|v| v.value);
        self.cache.insert(key, record.clone());
        Ok(record)
    }

    /// Follow every relation segment but the last
    ///
    /// Returns the record owning the final field and the final segment, or
    /// `None` when a relation points at a missing record.
    fn owner_of<'p>(&mut self, record: &Record, path: &'p str) -> Result<Option<(Record, &'p str)>> {
        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let last = segments.pop().unwrap_or(path);
        let mut current = record.clone();
        for segment in segments {
            let target = match field_spec_of(current.kind(), segment).map(|s| s.ty) {
                Some(FieldType::Relation(kind)) => kind,
                _ => return Err(TimekeepError::config(format!("'{}' is not a relation", segment))),
            };
            let id = match current.field(segment) {
                Some(FieldValue::Id(id)) => id,
                _ => return Ok(None),
            };
            match self.load(RecordKey::new(target, id))? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some((current, last)))
    }

    /// Value at the end of `path`; `Null` through a dangling relation
    pub fn resolve(&mut self, record: &Record, path: &str) -> Result<FieldValue> {
        match self.owner_of(record, path)? {
            Some((owner, field)) => owner.field(field).ok_or_else(|| {
                TimekeepError::config(format!("unknown field '{}' for {}", field, owner.kind()))
            }),
            None => Ok(FieldValue::Null),
        }
    }

    /// Record a relation path points at
    pub fn related(&mut self, record: &Record, path: &str) -> Result<Option<Record>> {
        let (owner, field) = match self.owner_of(record, path)? {
            Some(found) => found,
            None => return Ok(None),
        };
        let target = match field_spec_of(owner.kind(), field).map(|s| s.ty) {
            Some(FieldType::Relation(kind)) => kind,
            _ => return Ok(None),
        };
        match owner.field(field) {
            Some(FieldValue::Id(id)) => self.load(RecordKey::new(target, id)),
            _ => Ok(None),
        }
    }

    /// Human-readable value at the end of `path`
    ///
    /// Relations display as the related record's label, missing values
    /// as `-`.
    pub fn display(&mut self, record: &Record, path: &str) -> Result<String> {
        let (owner, field) = match self.owner_of(record, path)? {
            Some(found) => found,
            None => return Ok(FieldValue::Null.to_string()),
        };
        if let Some(FieldType::Relation(_)) = field_spec_of(owner.kind(), field).map(|s| s.ty) {
            return Ok(self
                .related(&owner, field)?
                .map(|r| r.label())
                .unwrap_or_else(|| FieldValue::Null.to_string()));
        }
        Ok(owner
            .display_field(field)
            .unwrap_or_else(|| FieldValue::Null.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use timekeep_core::{
        Client, ClientDraft, Entity, Limits, Project, ProjectDraft, RecordId, Storage,
    };
    use timekeep_storage::RecordStore;

    fn build<E: Entity>(draft: &E::Draft) -> E {
        let now = Utc::now();
        E::from_draft(RecordId::new(), draft, &Limits::default(), now, now).unwrap()
    }

    #[test]
    fn test_field_type_of_follows_relations() {
        assert_eq!(
            field_type_of(EntityKind::TimeEntry, "project__client__company_name").unwrap(),
            FieldType::Text
        );
        assert_eq!(
            field_type_of(EntityKind::Project, "client").unwrap(),
            FieldType::Relation(EntityKind::Client)
        );
        assert!(field_type_of(EntityKind::Project, "nope").is_err());
        assert!(field_type_of(EntityKind::Project, "name__x").is_err());
    }

    #[test]
    fn test_resolve_and_display_through_owner() {
        let mut draft = ClientDraft::new("Acme");
        draft.country = Some("nl".into());
        let client: Client = build(&draft);
        let project: Project = build(&ProjectDraft::new(client.id, "Website"));
        let store = RecordStore::new();
        store
            .apply_batch(
                vec![client.clone().into_record(), project.clone().into_record()],
                vec![],
                1,
            )
            .unwrap();
        let snapshot = store.create_snapshot();
        let mut resolver = FieldResolver::new(&snapshot);
        let record = project.into_record();

        assert_eq!(
            resolver.resolve(&record, "client__company_name").unwrap(),
            FieldValue::Text("Acme".into())
        );
        assert_eq!(resolver.display(&record, "client").unwrap(), "Acme");
        assert_eq!(resolver.display(&record, "client__country").unwrap(), "Netherlands");
        assert_eq!(resolver.display(&record, "completed").unwrap(), "no");
    }

    #[test]
    fn test_dangling_relation_resolves_null() {
        let project: Project = build(&ProjectDraft::new(RecordId::new(), "Orphan"));
        let store = RecordStore::new();
        let snapshot = store.create_snapshot();
        let mut resolver = FieldResolver::new(&snapshot);
        let record = project.into_record();
        assert!(resolver.resolve(&record, "client__company_name").unwrap().is_null());
        assert_eq!(resolver.display(&record, "client").unwrap(), "-");
    }
}
