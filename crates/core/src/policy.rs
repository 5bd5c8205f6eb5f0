//! Policy field rules shared by the DB and API layers.
//!
//! [`PolicyRecord`] is the seam between storage rows and the pure
//! aggregation functions in [`crate::summary`] and [`crate::trends`].

use crate::error::CoreError;
use crate::types::CalendarDate;

/// Maximum length of a vehicle plate after normalization.
pub const MAX_PLATE_LENGTH: usize = 16;

/// Maximum length of free-text policy fields (owner, contact, company).
pub const MAX_TEXT_LENGTH: usize = 200;

/// Read access to the fields the lifecycle aggregations need.
pub trait PolicyRecord {
    fn expiry_date(&self) -> CalendarDate;
    fn renewed_date(&self) -> Option<CalendarDate>;
    fn company(&self) -> &str;
}

/// Upper-case a plate and collapse internal whitespace.
///
/// `" kcb 123a "` and `"KCB  123A"` both normalize to `"KCB 123A"`.
pub fn normalize_plate(plate: &str) -> Result<String, CoreError> {
    let normalized = plate
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    if normalized.is_empty() {
        return Err(CoreError::Validation("plate is required".into()));
    }
    if normalized.len() > MAX_PLATE_LENGTH {
        return Err(CoreError::Validation(format!(
            "plate must be at most {MAX_PLATE_LENGTH} characters"
        )));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    {
        return Err(CoreError::Validation(format!(
            "plate '{normalized}' may only contain letters, digits, spaces and dashes"
        )));
    }
    Ok(normalized)
}

/// Trim a required text field and enforce the length limit.
pub fn require_text(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A policy cannot expire before it starts.
pub fn validate_term(start_date: CalendarDate, expiry_date: CalendarDate) -> Result<(), CoreError> {
    if expiry_date < start_date {
        return Err(CoreError::Validation(format!(
            "expiry_date ({expiry_date}) must not be before start_date ({start_date})"
        )));
    }
    Ok(())
}
