//! Field values for querying and presentation
//!
//! Records are strongly typed; `FieldValue` is the dynamic view of a single
//! field used by filters, search, ordering and list display.
//!
//! ## Ordering
//!
//! `FieldValue::compare` is a total order used for sorting:
//! - Text compares case-insensitively, then case-sensitively as a tiebreak
//! - Values of different variants order by variant rank
//! - `Null` handling (first/last) is decided by the caller per direction

use crate::country::CountryCode;
use crate::types::{EntityKind, RecordId, Timestamp};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Static type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Identifier of the record itself
    Id,
    /// Character or free-text field
    Text,
    /// ISO 3166-1 alpha-2 code, stored as upper-case text
    Country,
    /// Boolean flag
    Bool,
    /// UTC timestamp
    Timestamp,
    /// Signed time span (derived)
    Duration,
    /// Reference to an owning record of the given kind
    Relation(EntityKind),
}

/// Declared field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as used in queries and admin configuration
    pub name: &'static str,
    /// Field type
    pub ty: FieldType,
}

impl FieldSpec {
    /// Declare a field
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Dynamic value of a single record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent optional value
    Null,
    /// Text value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(Timestamp),
    /// Signed time span
    Duration(Duration),
    /// Record identifier (own id or a relation)
    Id(RecordId),
}

impl FieldValue {
    /// True for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp content, if this is a timestamp value
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Case-insensitive substring match against an already-lowercased needle
    ///
    /// Only text values can match; everything else returns false.
    pub fn contains_lowercase(&self, needle_lower: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.to_lowercase().contains(needle_lower),
            _ => false,
        }
    }

    /// Total order for sorting (see module docs)
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Duration(a), FieldValue::Duration(b)) => a.cmp(b),
            (FieldValue::Id(a), FieldValue::Id(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Timestamp(_) => 3,
            FieldValue::Duration(_) => 4,
            FieldValue::Id(_) => 5,
        }
    }

    /// Parse a raw string (e.g. from a filter query parameter) as a value of `ty`
    ///
    /// - Bool accepts `true/false`, `1/0`, `yes/no` (case-insensitive)
    /// - Timestamp accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC)
    /// - Relation and Id accept UUID strings
    /// - Duration is derived and cannot be parsed
    pub fn parse(ty: FieldType, raw: &str) -> Option<FieldValue> {
        let raw = raw.trim();
        match ty {
            FieldType::Text => Some(FieldValue::Text(raw.to_string())),
            FieldType::Country => {
                CountryCode::parse(raw).map(|code| FieldValue::Text(code.as_str().to_string()))
            }
            FieldType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(FieldValue::Bool(true)),
                "false" | "0" | "no" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            FieldType::Timestamp => parse_timestamp(raw).map(FieldValue::Timestamp),
            FieldType::Id | FieldType::Relation(_) => RecordId::from_string(raw).map(FieldValue::Id),
            FieldType::Duration => None,
        }
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Render a duration as `H:MM:SS`, prefixed with `-` when negative
pub fn format_duration(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let total = duration.num_seconds().unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!(
        "{}{}:{:02}:{:02}",
        if negative { "-" } else { "" },
        hours,
        minutes,
        seconds
    )
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("-"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(true) => f.write_str("yes"),
            FieldValue::Bool(false) => f.write_str("no"),
            FieldValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M")),
            FieldValue::Duration(d) => f.write_str(&format_duration(*d)),
            FieldValue::Id(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(t: Timestamp) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<RecordId> for FieldValue {
    fn from(id: RecordId) -> Self {
        FieldValue::Id(id)
    }
}
