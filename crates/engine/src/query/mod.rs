//! Read-only queries over one snapshot
//!
//! A `Query` combines a free-text `Search`, `Filter`s and an ordering.
//! Evaluation order: filter, then search, then order.
//!
//! ## Semantics
//!
//! - Search splits the term on whitespace; every word must appear
//!   (case-insensitive substring) in at least one search field.
//! - `Filter::Exact` matches equal values; `Filter::Range` is inclusive
//!   at `from`, exclusive at `to`, and never matches a null.
//! - Ordering on a relation field orders by the related entity's default
//!   ordering. Nulls sort last ascending and first descending.
//! - Without an explicit ordering the entity's default ordering applies.

mod path;

pub use path::{field_type_of, FieldResolver, PATH_SEPARATOR};

use std::cmp::Ordering;

use timekeep_core::{
    default_ordering_of, Entity, EntityKind, FieldType, FieldValue, OrderField, Record, Result,
    SnapshotView,
};

/// Relation hops followed when expanding a relation sort key
const MAX_SORT_DEPTH: usize = 4;

/// One ordering component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field path
    pub field: String,
    /// Sort descending
    pub descending: bool,
}

impl SortKey {
    /// Ascending on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            descending: true,
        }
    }

    /// Parse `field` or `-field` (descending)
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => SortKey::desc(field),
            None => SortKey::asc(raw),
        }
    }
}

impl From<&OrderField> for SortKey {
    fn from(order: &OrderField) -> Self {
        SortKey {
            field: order.field.to_string(),
            descending: order.descending,
        }
    }
}

/// Free-text search over a set of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    /// Raw search term
    pub term: String,
    /// Field paths searched
    pub fields: Vec<String>,
}

impl Search {
    /// Lower-cased words of the term
    fn words(&self) -> Vec<String> {
        self.term
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect()
    }
}

/// Field filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Exact {
        /// Field path
        field: String,
        /// Expected value
        value: FieldValue,
    },
    /// `from <= field < to`; either bound may be open
    Range {
        /// Field path
        field: String,
        /// Inclusive lower bound
        from: Option<FieldValue>,
        /// Exclusive upper bound
        to: Option<FieldValue>,
    },
}

impl Filter {
    /// Field path the filter applies to
    pub fn field(&self) -> &str {
        match self {
            Filter::Exact { field, .. } | Filter::Range { field, .. } => field,
        }
    }

    fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Filter::Exact { value: expected, .. } => value == expected,
            Filter::Range { from, to, .. } => {
                if value.is_null() {
                    return false;
                }
                let above = from
                    .as_ref()
                    .map_or(true, |from| value.compare(from) != Ordering::Less);
                let below = to
                    .as_ref()
                    .map_or(true, |to| value.compare(to) == Ordering::Less);
                above && below
            }
        }
    }
}

/// A read-only query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Free-text search
    pub search: Option<Search>,
    /// Filters, all of which must match
    pub filters: Vec<Filter>,
    /// Explicit ordering; `None` uses the entity's default
    pub ordering: Option<Vec<SortKey>>,
}

impl Query {
    /// Match everything, default ordering
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `term` over `fields`; a blank term is ignored
    pub fn search<I, S>(mut self, term: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(Search {
                term,
                fields: fields.into_iter().map(Into::into).collect(),
            })
        };
        self
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an exact-match filter
    pub fn exact(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter(Filter::Exact {
            field: field.into(),
            value: value.into(),
        })
    }

    /// Add a range filter
    pub fn range(
        self,
        field: impl Into<String>,
        from: Option<FieldValue>,
        to: Option<FieldValue>,
    ) -> Self {
        self.filter(Filter::Range {
            field: field.into(),
            from,
            to,
        })
    }

    /// Replace the ordering
    pub fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        self.ordering = Some(keys);
        self
    }

    /// Check every field path against `E`'s schema
    pub fn validate<E: Entity>(&self) -> Result<()> {
        self.validate_kind(E::KIND)
    }

    /// Check every field path against the schema of `kind`
    pub fn validate_kind(&self, kind: EntityKind) -> Result<()> {
        for filter in &self.filters {
            field_type_of(kind, filter.field())?;
        }
        if let Some(search) = &self.search {
            for field in &search.fields {
                field_type_of(kind, field)?;
            }
        }
        for key in self.ordering.iter().flatten() {
            field_type_of(kind, &key.field)?;
        }
        Ok(())
    }

    /// Evaluate against a snapshot
    pub fn run<E: Entity>(&self, view: &dyn SnapshotView) -> Result<Vec<E>> {
        Ok(self
            .run_kind(E::KIND, view)?
            .into_iter()
            .filter_map(E::from_record)
            .collect())
    }

    /// Evaluate over the records of `kind`, untyped
    pub fn run_kind(&self, kind: EntityKind, view: &dyn SnapshotView) -> Result<Vec<Record>> {
        self.validate_kind(kind)?;
        let mut resolver = FieldResolver::new(view);
        let records: Vec<Record> = view
            .scan_kind(kind)?
            .into_iter()
            .map(|v| v.value)
            .collect();

        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if self.matches(&mut resolver, &record)? {
                kept.push(record);
            }
        }

        let components = self.sort_components(kind)?;
        let mut keyed = Vec::with_capacity(kept.len());
        for record in kept {
            let mut values = Vec::with_capacity(components.len());
            for (path, _) in &components {
                values.push(resolver.resolve(&record, path)?);
            }
            keyed.push((values, record));
        }
        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &components));

        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }

    fn matches(&self, resolver: &mut FieldResolver<'_>, record: &Record) -> Result<bool> {
        for filter in &self.filters {
            if !filter.matches(&resolver.resolve(record, filter.field())?) {
                return Ok(false);
            }
        }
        if let Some(search) = &self.search {
            let mut values = Vec::with_capacity(search.fields.len());
            for field in &search.fields {
                values.push(resolver.resolve(record, field)?);
            }
            for word in search.words() {
                if !values.iter().any(|v| v.contains_lowercase(&word)) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Ordering flattened to scalar paths with their direction
    fn sort_components(&self, kind: EntityKind) -> Result<Vec<(String, bool)>> {
        let keys: Vec<SortKey> = match &self.ordering {
            Some(keys) => keys.clone(),
            None => default_ordering_of(kind).iter().map(SortKey::from).collect(),
        };
        let mut out = Vec::new();
        for key in keys {
            expand(kind, &key.field, key.descending, 0, &mut out)?;
        }
        Ok(out)
    }
}

fn expand(
    kind: EntityKind,
    path: &str,
    descending: bool,
    depth: usize,
    out: &mut Vec<(String, bool)>,
) -> Result<()> {
    match field_type_of(kind, path)? {
        FieldType::Relation(target) if depth < MAX_SORT_DEPTH => {
            for order in default_ordering_of(target) {
                let nested = format!("{}{}{}", path, PATH_SEPARATOR, order.field);
                expand(kind, &nested, descending ^ order.descending, depth + 1, out)?;
            }
        }
        _ => out.push((path.to_string(), descending)),
    }
    Ok(())
}

/// Compare one component; nulls last ascending, first descending
fn compare_component(a: &FieldValue, b: &FieldValue, descending: bool) -> Ordering {
    let ordering = match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b),
    };
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

fn compare_keys(a: &[FieldValue], b: &[FieldValue], components: &[(String, bool)]) -> Ordering {
    for ((x, y), (_, descending)) in a.iter().zip(b).zip(components) {
        match compare_component(x, y, *descending) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
