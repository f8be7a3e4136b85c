//! Field-level validation
//!
//! Every draft passes through these helpers before it becomes a record.
//! Each helper either returns the normalized value or a
//! `TimekeepError::Validation` naming the entity and field.
//!
//! Normalization rules:
//! - required character fields are trimmed and must be non-blank
//! - optional character/text fields are trimmed; blank becomes `None`
//! - emails keep their case but must look like `local@domain.tld`
//! - country codes are upper-cased and checked against the ISO table

use once_cell::sync::Lazy;
use regex::Regex;

use crate::country::CountryCode;
use crate::error::{Result, TimekeepError};
use crate::limits::Limits;
use crate::types::EntityKind;

/// Validate a required character field
pub fn required_char(
    entity: EntityKind,
    field: &str,
    value: &str,
    limits: &Limits,
) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TimekeepError::validation(entity, field, "this field is required"));
    }
    limits
        .validate_char(trimmed)
        .map_err(|e| TimekeepError::validation(entity, field, e.to_string()))?;
    Ok(trimmed.to_string())
}

/// Validate an optional character field
pub fn optional_char(
    entity: EntityKind,
    field: &str,
    value: Option<&str>,
    limits: &Limits,
) -> Result<Option<String>> {
    match normalize_blank(value) {
        None => Ok(None),
        Some(v) => {
            limits
                .validate_char(v)
                .map_err(|e| TimekeepError::validation(entity, field, e.to_string()))?;
            Ok(Some(v.to_string()))
        }
    }
}

/// Validate an optional free-text field
pub fn optional_text(
    entity: EntityKind,
    field: &str,
    value: Option<&str>,
    limits: &Limits,
) -> Result<Option<String>> {
    match normalize_blank(value) {
        None => Ok(None),
        Some(v) => {
            limits
                .validate_text(v)
                .map_err(|e| TimekeepError::validation(entity, field, e.to_string()))?;
            Ok(Some(v.to_string()))
        }
    }
}

/// Validate an optional email field
pub fn optional_email(
    entity: EntityKind,
    field: &str,
    value: Option<&str>,
    limits: &Limits,
) -> Result<Option<String>> {
    let value = optional_char(entity, field, value, limits)?;
    if let Some(email) = &value {
        if !is_valid_email(email) {
            return Err(TimekeepError::validation(
                entity,
                field,
                "enter a valid email address",
            ));
        }
    }
    Ok(value)
}

/// Validate an optional country code
pub fn optional_country(
    entity: EntityKind,
    field: &str,
    value: Option<&str>,
) -> Result<Option<CountryCode>> {
    match normalize_blank(value) {
        None => Ok(None),
        Some(code) => CountryCode::parse(code).map(Some).ok_or_else(|| {
            TimekeepError::validation(
                entity,
                field,
                format!("'{}' is not a valid ISO 3166-1 country code", code),
            )
        }),
    }
}

/// Email pattern: dot-atom local part, hostname labels, a TLD of two or
/// more characters starting with a letter
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])$",
    )
    .expect("email pattern compiles")
});

/// Basic email format check
///
/// Deliverability is not checked.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn normalize_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
