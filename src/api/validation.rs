//! Input validation for API requests.
//!
//! Each function checks one field and returns a human-readable message on
//! failure. Collect them into an `ApiError` with `ValidationErrorBuilder`.

use chrono::Months;
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::parse_timestamp;

lazy_static! {
    /// Regex for validating email addresses (pragmatic, not RFC 5322)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$"
    ).unwrap();

    /// Regex for validating ISO 4217 style currency codes
    static ref CURRENCY_REGEX: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
}

/// Validate a required text field
pub fn validate_required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if value.len() > 255 {
        return Err(format!("{} is too long (max 255 characters)", field_name));
    }

    Ok(())
}

/// Validate a free-text field that must not be blank, with no length cap
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    Ok(())
}

/// Validate a money amount that must be strictly positive
pub fn validate_positive_amount(amount: f64, field_name: &str) -> Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("{} must be a finite number", field_name));
    }

    if amount <= 0.0 {
        return Err(format!("{} must be greater than 0", field_name));
    }

    Ok(())
}

/// Validate a money amount that may be zero
pub fn validate_non_negative_amount(amount: f64, field_name: &str) -> Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("{} must be a finite number", field_name));
    }

    if amount < 0.0 {
        return Err(format!("{} cannot be negative", field_name));
    }

    Ok(())
}

/// Validate an RFC 3339 timestamp (e.g. 2025-01-01T00:00:00Z)
pub fn validate_datetime(value: &str, field_name: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if parse_timestamp(value).is_none() {
        return Err(format!(
            "Invalid {} format. Use an RFC 3339 timestamp like 2025-01-01T00:00:00Z",
            field_name
        ));
    }

    Ok(())
}

/// Validate an optional RFC 3339 timestamp
pub fn validate_optional_datetime(value: &Option<String>, field_name: &str) -> Result<(), String> {
    match value {
        Some(v) => validate_datetime(v, field_name),
        None => Ok(()),
    }
}

/// Validate that `end` does not come before `start`. Unparseable input is
/// reported by `validate_datetime` instead.
pub fn validate_date_order(start: &str, end: &str) -> Result<(), String> {
    if let (Some(s), Some(e)) = (parse_timestamp(start), parse_timestamp(end)) {
        if e < s {
            return Err("End date must not be before start date".to_string());
        }
    }
    Ok(())
}

/// Validate that `end` falls within `max_years` of `start`. Unparseable
/// input is reported by `validate_datetime` instead.
pub fn validate_date_span(start: &str, end: &str, max_years: u32) -> Result<(), String> {
    if let (Some(s), Some(e)) = (parse_timestamp(start), parse_timestamp(end)) {
        let limit = s.checked_add_months(Months::new(max_years.saturating_mul(12)));
        if limit.map_or(true, |limit| e > limit) {
            return Err(format!(
                "Date range must not span more than {} years",
                max_years
            ));
        }
    }
    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Validate an optional UUID string
pub fn validate_optional_uuid(id: &Option<String>, field_name: &str) -> Result<(), String> {
    match id {
        Some(v) => validate_uuid(v, field_name),
        None => Ok(()),
    }
}

/// Validate an email address (optional field)
pub fn validate_email(email: &Option<String>) -> Result<(), String> {
    if let Some(e) = email {
        if e.len() > 254 {
            return Err("Email is too long (max 254 characters)".to_string());
        }

        if !EMAIL_REGEX.is_match(e) {
            return Err("Invalid email format".to_string());
        }
    }

    Ok(())
}

/// Validate a three-letter currency code (optional field)
pub fn validate_currency(currency: &Option<String>) -> Result<(), String> {
    if let Some(c) = currency {
        if !CURRENCY_REGEX.is_match(c) {
            return Err("Currency must be a three-letter uppercase code like USD".to_string());
        }
    }

    Ok(())
}
