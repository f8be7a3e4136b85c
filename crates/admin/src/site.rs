//! AdminSite: the four entity admins as one explicit value
//!
//! There is no global registry; callers build a site (usually
//! `AdminSite::with_defaults()`) and pass it where it is needed.

use timekeep_core::{
    fields_of, Client, Contact, EntityKind, FieldType, Project, RecordId, RecordKey, Result,
    SnapshotView, TimeEntry, TimekeepError,
};
use timekeep_engine::{field_type_of, FieldResolver, Query, SortKey};
use tracing::debug;

use crate::changelist::{project_row, Row};
use crate::options::{Inline, ModelAdmin};

/// Suggestions returned by one autocomplete request
pub const AUTOCOMPLETE_LIMIT: usize = 20;

/// Default client admin: inline contacts
pub fn client_admin() -> Result<ModelAdmin<Client>> {
    ModelAdmin::builder()
        .list_display([
            "company_name",
            "country",
            "phone_number",
            "email",
            "billing_email",
            "created_at",
        ])
        .search_fields(["company_name", "email", "billing_email"])
        .list_filter(["country", "created_at"])
        .ordering(["company_name"])
        .inline(EntityKind::Contact, 1)
        .build()
}

/// Default project admin
pub fn project_admin() -> Result<ModelAdmin<Project>> {
    ModelAdmin::builder()
        .list_display(["name", "client", "completed", "created_at"])
        .search_fields(["name"])
        .list_filter(["client__company_name", "created_at", "completed"])
        .ordering(["client", "name", "created_at"])
        .autocomplete_fields(["client"])
        .build()
}

/// Default time entry admin
pub fn time_entry_admin() -> Result<ModelAdmin<TimeEntry>> {
    ModelAdmin::builder()
        .list_display(["project", "start_time", "end_time", "duration", "created_at"])
        .search_fields(["project__name"])
        .list_filter(["project__name", "created_at"])
        .ordering(["project", "start_time", "end_time"])
        .autocomplete_fields(["project"])
        .build()
}

/// Default contact admin
pub fn contact_admin() -> Result<ModelAdmin<Contact>> {
    ModelAdmin::builder()
        .list_display([
            "first_name",
            "last_name",
            "client",
            "email",
            "phone_number",
            "is_primary",
        ])
        .search_fields(["first_name", "last_name", "email", "phone_number"])
        .list_filter(["is_primary", "client__company_name"])
        .ordering(["last_name", "first_name", "email", "phone_number"])
        .autocomplete_fields(["client"])
        .build()
}

/// A related record offered by autocomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Related record id
    pub id: RecordId,
    /// Display label
    pub label: String,
}

/// Owned records shown on a change view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRows {
    /// Kind of the owned records
    pub kind: EntityKind,
    /// Column paths
    pub columns: Vec<String>,
    /// Existing records, in their default order
    pub rows: Vec<Row>,
    /// Blank rows offered for new records
    pub extra: usize,
}

/// One record with every field displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeView {
    /// Record key
    pub key: RecordKey,
    /// Display label
    pub label: String,
    /// `(field, display value)` for every declared field but the id
    pub fields: Vec<(String, String)>,
    /// Inline owned records
    pub inlines: Vec<InlineRows>,
}

/// The configured admins
#[derive(Debug, Clone)]
pub struct AdminSite {
    clients: ModelAdmin<Client>,
    contacts: ModelAdmin<Contact>,
    projects: ModelAdmin<Project>,
    time_entries: ModelAdmin<TimeEntry>,
}

impl AdminSite {
    /// Site over explicit admins
    ///
    /// # Errors
    ///
    /// `Config` if an autocomplete field points at an admin without
    /// search fields.
    pub fn new(
        clients: ModelAdmin<Client>,
        contacts: ModelAdmin<Contact>,
        projects: ModelAdmin<Project>,
        time_entries: ModelAdmin<TimeEntry>,
    ) -> Result<Self> {
        let site = AdminSite {
            clients,
            contacts,
            projects,
            time_entries,
        };
        for kind in EntityKind::ALL {
            for field in site.autocomplete_fields(kind) {
                let target = relation_target(kind, field)?;
                if site.search_fields(target).is_empty() {
                    return Err(TimekeepError::config(format!(
                        "{} admin: autocomplete '{}' needs search fields on the {} admin",
                        kind, field, target
                    )));
                }
            }
        }
        debug!(target: "timekeep::admin", "Admin site ready");
        Ok(site)
    }

    /// Site with the default admin of every entity
    pub fn with_defaults() -> Result<Self> {
        Self::new(client_admin()?, contact_admin()?, project_admin()?, time_entry_admin()?)
    }

    /// Client admin
    pub fn clients(&self) -> &ModelAdmin<Client> {
        &self.clients
    }

    /// Contact admin
    pub fn contacts(&self) -> &ModelAdmin<Contact> {
        &self.contacts
    }

    /// Project admin
    pub fn projects(&self) -> &ModelAdmin<Project> {
        &self.projects
    }

    /// Time entry admin
    pub fn time_entries(&self) -> &ModelAdmin<TimeEntry> {
        &self.time_entries
    }

    fn search_fields(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Client => self.clients.search_fields(),
            EntityKind::Contact => self.contacts.search_fields(),
            EntityKind::Project => self.projects.search_fields(),
            EntityKind::TimeEntry => self.time_entries.search_fields(),
        }
    }

    fn ordering(&self, kind: EntityKind) -> &[SortKey] {
        match kind {
            EntityKind::Client => self.clients.ordering(),
            EntityKind::Contact => self.contacts.ordering(),
            EntityKind::Project => self.projects.ordering(),
            EntityKind::TimeEntry => self.time_entries.ordering(),
        }
    }

    fn autocomplete_fields(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Client => self.clients.autocomplete_fields(),
            EntityKind::Contact => self.contacts.autocomplete_fields(),
            EntityKind::Project => self.projects.autocomplete_fields(),
            EntityKind::TimeEntry => self.time_entries.autocomplete_fields(),
        }
    }

    fn inlines(&self, kind: EntityKind) -> &[Inline] {
        match kind {
            EntityKind::Client => self.clients.inlines(),
            EntityKind::Contact => self.contacts.inlines(),
            EntityKind::Project => self.projects.inlines(),
            EntityKind::TimeEntry => self.time_entries.inlines(),
        }
    }

    /// Related records for an autocomplete field of `kind`
    ///
    /// Matches `term` against the related admin's search fields and orders
    /// by its ordering. At most `AUTOCOMPLETE_LIMIT` choices are returned.
    ///
    /// # Errors
    ///
    /// `Config` if `field` is not an autocomplete field of `kind`.
    pub fn autocomplete(
        &self,
        view: &dyn SnapshotView,
        kind: EntityKind,
        field: &str,
        term: &str,
    ) -> Result<Vec<Choice>> {
        if !self.autocomplete_fields(kind).iter().any(|f| f == field) {
            return Err(TimekeepError::config(format!(
                "{} admin: '{}' is not an autocomplete field",
                kind, field
            )));
        }
        let target = relation_target(kind, field)?;
        let mut query = Query::new().search(term, self.search_fields(target).iter().cloned());
        if !self.ordering(target).is_empty() {
            query = query.order_by(self.ordering(target).to_vec());
        }
        let choices: Vec<Choice> = query
            .run_kind(target, view)?
            .into_iter()
            .take(AUTOCOMPLETE_LIMIT)
            .map(|r| Choice {
                id: r.id(),
                label: r.label(),
            })
            .collect();
        debug!(target: "timekeep::admin", kind = %kind, field, matches = choices.len(), "Autocomplete");
        Ok(choices)
    }

    /// Every field of one record, with its inlines
    ///
    /// # Errors
    ///
    /// `NotFound` if the record does not exist.
    pub fn change_view(&self, view: &dyn SnapshotView, key: RecordKey) -> Result<ChangeView> {
        let record = view
            .get(&key)?
            .map(|v| v.value)
            .ok_or_else(|| TimekeepError::not_found(key.kind, key.id))?;
        let mut resolver = FieldResolver::new(view);

        let mut fields = Vec::new();
        for spec in fields_of(key.kind) {
            if spec.ty == FieldType::Id {
                continue;
            }
            fields.push((spec.name.to_string(), resolver.display(&record, spec.name)?));
        }

        let mut inlines = Vec::new();
        for inline in self.inlines(key.kind) {
            let owned = Query::new()
                .exact(inline.fk_field, key.id)
                .run_kind(inline.kind, view)?;
            let rows = owned
                .iter()
                .map(|r| project_row(&mut resolver, r, &inline.fields))
                .collect::<Result<Vec<_>>>()?;
            inlines.push(InlineRows {
                kind: inline.kind,
                columns: inline.fields.clone(),
                rows,
                extra: inline.extra,
            });
        }

        Ok(ChangeView {
            key,
            label: record.label(),
            fields,
            inlines,
        })
    }
}

fn relation_target(kind: EntityKind, field: &str) -> Result<EntityKind> {
    match field_type_of(kind, field)? {
        FieldType::Relation(target) => Ok(target),
        _ => Err(TimekeepError::config(format!(
            "'{}' of {} is not a relation",
            field, kind
        ))),
    }
}
