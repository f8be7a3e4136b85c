//! Sidebar filters
//!
//! Every `list_filter` path becomes a `FilterSpec` whose kind follows the
//! field type:
//!
//! | Field type | Kind | Choices |
//! |------------|------|---------|
//! | Bool | `Boolean` | Yes / No |
//! | Timestamp | `Date` | the four `DatePreset`s |
//! | Text, Relation | `Values` | distinct values present in the store |

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use timekeep_core::Timestamp;

/// Date ranges offered for timestamp filters
///
/// Every range is half-open and aligned to UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePreset {
    /// From midnight today until midnight tomorrow
    #[serde(rename = "today")]
    Today,
    /// The last seven days plus today
    #[serde(rename = "past_7_days")]
    Past7Days,
    /// From the first of this month until the first of the next
    #[serde(rename = "this_month")]
    ThisMonth,
    /// From January 1st until next January 1st
    #[serde(rename = "this_year")]
    ThisYear,
}

impl DatePreset {
    /// Every preset, in sidebar order
    pub const ALL: [DatePreset; 4] = [
        DatePreset::Today,
        DatePreset::Past7Days,
        DatePreset::ThisMonth,
        DatePreset::ThisYear,
    ];

    /// Parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::Past7Days => "past_7_days",
            DatePreset::ThisMonth => "this_month",
            DatePreset::ThisYear => "this_year",
        }
    }

    /// Sidebar title
    pub fn title(&self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Past7Days => "Past 7 days",
            DatePreset::ThisMonth => "This month",
            DatePreset::ThisYear => "This year",
        }
    }

    /// Parse a parameter value
    pub fn parse(raw: &str) -> Option<Self> {
        DatePreset::ALL.into_iter().find(|p| p.as_str() == raw)
    }

    /// `[from, to)` relative to `now`
    ///
    /// `None` only when the range would leave chrono's date range.
    pub fn bounds(&self, now: Timestamp) -> Option<(Timestamp, Timestamp)> {
        let today = now.date_naive();
        let tomorrow = today.succ_opt()?;
        let (from, to) = match self {
            DatePreset::Today => (today, tomorrow),
            DatePreset::Past7Days => (today.checked_sub_signed(Duration::days(7))?, tomorrow),
            DatePreset::ThisMonth => {
                let first = today.with_day(1)?;
                let next = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                (first, next)
            }
            DatePreset::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            ),
        };
        Some((midnight(from)?, midnight(to)?))
    }
}

fn midnight(date: NaiveDate) -> Option<Timestamp> {
    date.and_hms_opt(0, 0, 0).map(|t| Utc.from_utc_datetime(&t))
}

/// How a filter is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Yes / No
    Boolean,
    /// Date presets
    Date,
    /// Distinct stored values
    Values,
}

/// One selectable filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoice {
    /// Parameter value to submit
    pub value: String,
    /// Human-readable label
    pub label: String,
}

impl FilterChoice {
    pub(crate) fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        FilterChoice {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A filter with its current choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Field path
    pub field: String,
    /// Presentation kind
    pub kind: FilterKind,
    /// Available choices
    pub choices: Vec<FilterChoice>,
}
