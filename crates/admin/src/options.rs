//! ModelAdmin: per-entity presentation configuration
//!
//! Configuration is checked against the entity's declared fields when it is
//! built, so a `ModelAdmin` that exists is always usable:
//!
//! - `list_display`, `ordering`: any field path
//! - `search_fields`: text paths
//! - `list_filter`: text, boolean, timestamp or relation paths
//! - `autocomplete_fields`: relation fields of the entity itself
//! - `inlines`: kinds owned by the entity

use std::fmt;
use std::marker::PhantomData;

use timekeep_core::{fields_of, Entity, EntityKind, FieldType, Result, TimekeepError};
use timekeep_engine::{field_type_of, SortKey, PATH_SEPARATOR};
use tracing::debug;

use crate::changelist::{ChangeList, ChangeListParams};

/// Rows per change-list page unless configured
pub const DEFAULT_LIST_PER_PAGE: usize = 100;

/// Owned records edited on the owner's change view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    /// Kind of the owned records
    pub kind: EntityKind,
    /// Relation field pointing at the owner
    pub fk_field: &'static str,
    /// Columns shown per owned record
    pub fields: Vec<String>,
    /// Blank rows offered for new records
    pub extra: usize,
}

impl Inline {
    /// Inline for `kind` owned by `owner`, showing every editable field
    ///
    /// # Errors
    ///
    /// `Config` if `kind` has no relation to `owner`.
    pub fn new(owner: EntityKind, kind: EntityKind, extra: usize) -> Result<Self> {
        let fk = fields_of(kind)
            .iter()
            .find(|f| f.ty == FieldType::Relation(owner))
            .ok_or_else(|| {
                TimekeepError::config(format!("{} has no relation to {}", kind, owner))
            })?;
        let fields = fields_of(kind)
            .iter()
            .filter(|f| f.name != fk.name && is_editable(f.name, f.ty))
            .map(|f| f.name.to_string())
            .collect();
        Ok(Inline {
            kind,
            fk_field: fk.name,
            fields,
            extra,
        })
    }
}

fn is_editable(name: &str, ty: FieldType) -> bool {
    !matches!(ty, FieldType::Id | FieldType::Duration)
        && name != "created_at"
        && name != "updated_at"
}

/// Presentation configuration for one entity
pub struct ModelAdmin<E: Entity> {
    list_display: Vec<String>,
    search_fields: Vec<String>,
    list_filter: Vec<String>,
    ordering: Vec<SortKey>,
    autocomplete_fields: Vec<String>,
    inlines: Vec<Inline>,
    list_per_page: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ModelAdmin<E> {
    /// Start configuring
    pub fn builder() -> ModelAdminBuilder<E> {
        ModelAdminBuilder::new()
    }

    /// Entity kind configured
    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    /// Change-list columns
    pub fn list_display(&self) -> &[String] {
        &self.list_display
    }

    /// Fields searched by the change-list search box
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Sidebar filter paths
    pub fn list_filter(&self) -> &[String] {
        &self.list_filter
    }

    /// Change-list ordering; empty means the entity's default
    pub fn ordering(&self) -> &[SortKey] {
        &self.ordering
    }

    /// Relations picked through autocomplete
    pub fn autocomplete_fields(&self) -> &[String] {
        &self.autocomplete_fields
    }

    /// Owned kinds shown on the change view
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Rows per page
    pub fn list_per_page(&self) -> usize {
        self.list_per_page
    }

    /// Change list for the given request parameters
    pub fn changelist(&self, params: ChangeListParams) -> ChangeList<'_, E> {
        ChangeList::new(self, params)
    }
}

impl<E: Entity> Clone for ModelAdmin<E> {
    fn clone(&self) -> Self {
        ModelAdmin {
            list_display: self.list_display.clone(),
            search_fields: self.search_fields.clone(),
            list_filter: self.list_filter.clone(),
            ordering: self.ordering.clone(),
            autocomplete_fields: self.autocomplete_fields.clone(),
            inlines: self.inlines.clone(),
            list_per_page: self.list_per_page,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for ModelAdmin<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdmin")
            .field("kind", &E::KIND)
            .field("list_display", &self.list_display)
            .field("search_fields", &self.search_fields)
            .field("list_filter", &self.list_filter)
            .field("ordering", &self.ordering)
            .field("autocomplete_fields", &self.autocomplete_fields)
            .field("inlines", &self.inlines)
            .field("list_per_page", &self.list_per_page)
            .finish()
    }
}

/// Builder for `ModelAdmin`
///
/// # Example
///
/// ```ignore
/// let admin = ModelAdmin::<Project>::builder()
///     .list_display(["name", "client", "completed"])
///     .search_fields(["name"])
///     .ordering(["client", "-created_at"])
///     .build()?;
/// ```
pub struct ModelAdminBuilder<E: Entity> {
    list_display: Vec<String>,
    search_fields: Vec<String>,
    list_filter: Vec<String>,
    ordering: Vec<String>,
    autocomplete_fields: Vec<String>,
    inlines: Vec<(EntityKind, usize)>,
    list_per_page: usize,
    _entity: PhantomData<fn() -> E>,
}

fn owned<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl<E: Entity> Default for ModelAdminBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ModelAdminBuilder<E> {
    /// Empty configuration
    pub fn new() -> Self {
        ModelAdminBuilder {
            list_display: Vec::new(),
            search_fields: Vec::new(),
            list_filter: Vec::new(),
            ordering: Vec::new(),
            autocomplete_fields: Vec::new(),
            inlines: Vec::new(),
            list_per_page: DEFAULT_LIST_PER_PAGE,
            _entity: PhantomData,
        }
    }

    /// Set change-list columns
    pub fn list_display<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_display = owned(fields);
        self
    }

    /// Set searched fields
    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = owned(fields);
        self
    }

    /// Set sidebar filters
    pub fn list_filter<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_filter = owned(fields);
        self
    }

    /// Set ordering; prefix a field with `-` for descending
    pub fn ordering<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordering = owned(fields);
        self
    }

    /// Set autocomplete relations
    pub fn autocomplete_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.autocomplete_fields = owned(fields);
        self
    }

    /// Add an inline for an owned kind
    pub fn inline(mut self, kind: EntityKind, extra: usize) -> Self {
        self.inlines.push((kind, extra));
        self
    }

    /// Set rows per page
    pub fn list_per_page(mut self, n: usize) -> Self {
        self.list_per_page = n;
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// `Config` naming the first invalid entry.
    pub fn build(self) -> Result<ModelAdmin<E>> {
        let kind = E::KIND;
        let invalid = |what: &str, field: &str, reason: &str| {
            TimekeepError::config(format!("{} admin: {} '{}' {}", kind, what, field, reason))
        };

        for field in &self.list_display {
            field_type_of(kind, field)?;
        }
        for field in &self.search_fields {
            if field_type_of(kind, field)? != FieldType::Text {
                return Err(invalid("search field", field, "is not a text field"));
            }
        }
        for field in &self.list_filter {
            match field_type_of(kind, field)? {
                FieldType::Text
                | FieldType::Country
                | FieldType::Bool
                | FieldType::Timestamp
                | FieldType::Relation(_) => {}
                _ => return Err(invalid("list filter", field, "cannot be filtered")),
            }
        }
        let ordering: Vec<SortKey> = self.ordering.iter().map(|f| SortKey::parse(f)).collect();
        for key in &ordering {
            field_type_of(kind, &key.field)?;
        }
        for field in &self.autocomplete_fields {
            let is_relation = matches!(field_type_of(kind, field)?, FieldType::Relation(_));
            if field.contains(PATH_SEPARATOR) || !is_relation {
                return Err(invalid("autocomplete field", field, "is not a relation"));
            }
        }
        let inlines = self
            .inlines
            .iter()
            .map(|(child, extra)| Inline::new(kind, *child, *extra))
            .collect::<Result<Vec<_>>>()?;
        if self.list_per_page == 0 {
            return Err(invalid("list_per_page", "0", "must be positive"));
        }

        debug!(target: "timekeep::admin", kind = %kind, columns = self.list_display.len(), "ModelAdmin configured");
        Ok(ModelAdmin {
            list_display: self.list_display,
            search_fields: self.search_fields,
            list_filter: self.list_filter,
            ordering,
            autocomplete_fields: self.autocomplete_fields,
            inlines,
            list_per_page: self.list_per_page,
            _entity: PhantomData,
        })
    }
}
