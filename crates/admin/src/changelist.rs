//! ChangeList: one page of display rows for a list request
//!
//! Request parameters are untrusted: filters on paths outside
//! `list_filter`, orderings on paths outside `list_display` and unparsable
//! values are rejected as `Validation` errors against the pseudo-fields
//! `filter`, `ordering` and `page`.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use timekeep_core::{
    Entity, FieldType, FieldValue, Record, RecordId, Result, SnapshotView,
    TimekeepError, Timestamp,
};
use timekeep_engine::{field_type_of, FieldResolver, Query, SortKey};
use tracing::debug;

use crate::filters::{DatePreset, FilterChoice, FilterKind, FilterSpec};
use crate::options::ModelAdmin;

/// List request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChangeListParams {
    /// Search box contents
    pub search: Option<String>,
    /// Exact-match filters, by path
    pub filters: BTreeMap<String, String>,
    /// Date-preset filters, by timestamp path
    pub dates: BTreeMap<String, DatePreset>,
    /// Ordering override; `-field` for descending
    pub ordering: Option<Vec<String>>,
    /// Zero-based page number
    pub page: Option<usize>,
    /// Rows per page; the admin's `list_per_page` when absent
    pub page_size: Option<usize>,
}

impl ChangeListParams {
    /// No search, filters or ordering; first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Add an exact-match filter
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Add a date-preset filter
    pub fn date(mut self, field: impl Into<String>, preset: DatePreset) -> Self {
        self.dates.insert(field.into(), preset);
        self
    }

    /// Override the ordering
    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordering = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Select a page
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Set rows per page
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// One displayed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Record id
    pub id: RecordId,
    /// Display label
    pub label: String,
    /// One cell per column
    pub cells: Vec<String>,
}

/// Display strings for `columns` of `record`
pub(crate) fn project_row(
    resolver: &mut FieldResolver<'_>,
    record: &Record,
    columns: &[String],
) -> Result<Row> {
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        cells.push(resolver.display(record, column)?);
    }
    Ok(Row {
        id: record.id(),
        label: record.label(),
        cells,
    })
}

/// One evaluated page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListPage {
    /// Column paths
    pub columns: Vec<String>,
    /// Rows of this page
    pub rows: Vec<Row>,
    /// Records matching search and filters
    pub result_count: usize,
    /// Records of the kind before search and filters
    pub total_count: usize,
    /// Zero-based page number
    pub page: usize,
    /// Pages available, at least one
    pub num_pages: usize,
}

/// A list request against one `ModelAdmin`
pub struct ChangeList<'a, E: Entity> {
    admin: &'a ModelAdmin<E>,
    params: ChangeListParams,
}

impl<'a, E: Entity> ChangeList<'a, E> {
    /// Change list over `admin` for `params`
    pub fn new(admin: &'a ModelAdmin<E>, params: ChangeListParams) -> Self {
        ChangeList { admin, params }
    }

    /// Parameters in effect
    pub fn params(&self) -> &ChangeListParams {
        &self.params
    }

    fn rejected(field: &str, reason: impl Into<String>) -> TimekeepError {
        TimekeepError::validation(E::KIND, field, reason)
    }

    /// Translate the parameters into a query, resolving date presets at `now`
    pub fn query(&self, now: Timestamp) -> Result<Query> {
        let kind = E::KIND;
        let allowed = |field: &str| self.admin.list_filter().iter().any(|f| f == field);
        let mut query = Query::new();

        if let Some(term) = &self.params.search {
            query = query.search(term.clone(), self.admin.search_fields().iter().cloned());
        }

        for (field, raw) in &self.params.filters {
            if !allowed(field) {
                return Err(Self::rejected("filter", format!("'{}' is not filterable", field)));
            }
            let value = FieldValue::parse(field_type_of(kind, field)?, raw).ok_or_else(|| {
                Self::rejected("filter", format!("invalid value '{}' for '{}'", raw, field))
            })?;
            query = query.exact(field.clone(), value);
        }

        for (field, preset) in &self.params.dates {
            if !allowed(field) || field_type_of(kind, field)? != FieldType::Timestamp {
                return Err(Self::rejected(
                    "filter",
                    format!("'{}' has no date filter", field),
                ));
            }
            let (from, to) = preset.bounds(now).ok_or_else(|| {
                Self::rejected("filter", format!("'{}' is out of range", preset.as_str()))
            })?;
            query = query.range(field.clone(), Some(from.into()), Some(to.into()));
        }

        let mut ordering: Vec<SortKey> = match &self.params.ordering {
            Some(fields) => {
                let mut keys = Vec::with_capacity(fields.len());
                for raw in fields {
                    let key = SortKey::parse(raw);
                    if !self.admin.list_display().contains(&key.field) {
                        return Err(Self::rejected(
                            "ordering",
                            format!("'{}' is not a column", key.field),
                        ));
                    }
                    keys.push(key);
                }
                keys
            }
            None if self.admin.ordering().is_empty() => {
                E::DEFAULT_ORDERING.iter().map(SortKey::from).collect()
            }
            None => self.admin.ordering().to_vec(),
        };
        // Stable pagination over equal keys
        ordering.push(SortKey::desc("id"));
        Ok(query.order_by(ordering))
    }

    /// Matching records, unpaginated
    pub fn results(&self, view: &dyn SnapshotView) -> Result<Vec<E>> {
        self.query(Utc::now())?.run(view)
    }

    /// Evaluate one page now
    pub fn run(&self, view: &dyn SnapshotView) -> Result<ChangeListPage> {
        self.run_at(view, Utc::now())
    }

    /// Evaluate one page with date presets relative to `now`
    pub fn run_at(&self, view: &dyn SnapshotView, now: Timestamp) -> Result<ChangeListPage> {
        let records = self.query(now)?.run_kind(E::KIND, view)?;
        let total_count = view.scan_kind(E::KIND)?.len();
        let result_count = records.len();

        let page_size = self.params.page_size.unwrap_or(self.admin.list_per_page());
        if page_size == 0 {
            return Err(Self::rejected("page", "page size must be positive"));
        }
        let partial = usize::from(result_count % page_size != 0);
        let num_pages = (result_count / page_size + partial).max(1);
        let page = self.params.page.unwrap_or(0);
        if page >= num_pages {
            return Err(Self::rejected(
                "page",
                format!("page {} of {} does not exist", page, num_pages),
            ));
        }

        let skip = page.checked_mul(page_size).unwrap_or(result_count);

        let columns = self.admin.list_display().to_vec();
        let mut resolver = FieldResolver::new(view);
        let rows = records
            .iter()
            .skip(skip)
            .take(page_size)
            .map(|record| project_row(&mut resolver, record, &columns))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            target: "timekeep::admin",
            kind = %E::KIND,
            result_count,
            total_count,
            page,
            "Change list evaluated"
        );
        Ok(ChangeListPage {
            columns,
            rows,
            result_count,
            total_count,
            page,
            num_pages,
        })
    }

    /// Sidebar filters with their current choices
    pub fn filter_specs(&self, view: &dyn SnapshotView) -> Result<Vec<FilterSpec>> {
        let records: Vec<Record> = view
            .scan_kind(E::KIND)?
            .into_iter()
            .map(|v| v.value)
            .collect();
        let mut resolver = FieldResolver::new(view);
        let mut specs = Vec::with_capacity(self.admin.list_filter().len());
        for field in self.admin.list_filter() {
            let spec = match field_type_of(E::KIND, field)? {
                FieldType::Bool => FilterSpec {
                    field: field.clone(),
                    kind: FilterKind::Boolean,
                    choices: vec![
                        FilterChoice::new("true", "Yes"),
                        FilterChoice::new("false", "No"),
                    ],
                },
                FieldType::Timestamp => FilterSpec {
                    field: field.clone(),
                    kind: FilterKind::Date,
                    choices: DatePreset::ALL
                        .iter()
                        .map(|p| FilterChoice::new(p.as_str(), p.title()))
                        .collect(),
                },
                _ => FilterSpec {
                    field: field.clone(),
                    kind: FilterKind::Values,
                    choices: distinct_values(&mut resolver, &records, field)?,
                },
            };
            specs.push(spec);
        }
        Ok(specs)
    }
}

/// Distinct non-null values of `path`, ordered by label
fn distinct_values(
    resolver: &mut FieldResolver<'_>,
    records: &[Record],
    path: &str,
) -> Result<Vec<FilterChoice>> {
    let mut seen = BTreeMap::new();
    for record in records {
        let value = resolver.resolve(record, path)?;
        if value.is_null() {
            continue;
        }
        let key = value.to_string();
        if !seen.contains_key(&key) {
            let label = resolver.display(record, path)?;
            seen.insert(key, label);
        }
    }
    let mut choices: Vec<FilterChoice> = seen
        .into_iter()
        .map(|(value, label)| FilterChoice::new(value, label))
        .collect();
    choices.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(choices)
}
