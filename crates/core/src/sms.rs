//! SMS log validation.
//!
//! Messages are sent by an external gateway; this service only records
//! what the gateway reported. Logs are append-only apart from `is_read`.

use crate::error::CoreError;

/// Longest message body accepted (ten concatenated SMS segments).
pub const MAX_MESSAGE_LENGTH: usize = 1600;

/// Normalize a phone number to `+` followed by digits.
///
/// Spaces and dashes are stripped. Local numbers are kept as given (the
/// gateway decides how to route them); the digit count must be 7..=15.
pub fn normalize_phone(phone: &str) -> Result<String, CoreError> {
    let compact: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let (prefix, digits) = match compact.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", compact.as_str()),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "phone_number '{phone}' must contain only digits"
        )));
    }
    if !(7..=15).contains(&digits.len()) {
        return Err(CoreError::Validation(format!(
            "phone_number '{phone}' must have between 7 and 15 digits"
        )));
    }
    Ok(format!("{prefix}{digits}"))
}

/// Validate the message body and gateway-reported cost.
pub fn validate_message(message: &str, cost: f64) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::Validation("message is required".into()));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(CoreError::Validation(format!(
            "cost must be a non-negative number, got {cost}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_compacted() {
        assert_eq!(normalize_phone("+254 712-345 678").unwrap(), "+254712345678");
        assert_eq!(normalize_phone("0712345678").unwrap(), "0712345678");
    }

    #[test]
    fn phone_with_letters_rejected() {
        assert!(normalize_phone("+2547ABC").is_err());
        assert!(normalize_phone("+").is_err());
        assert!(normalize_phone("").is_err());
    }

    #[test]
    fn phone_length_bounds() {
        assert!(normalize_phone("123456").is_err());
        assert!(normalize_phone("1234567").is_ok());
        assert!(normalize_phone("+1234567890123456").is_err());
    }

    #[test]
    fn message_rules() {
        assert!(validate_message("Your cover expires tomorrow", 0.8).is_ok());
        assert!(validate_message("   ", 0.8).is_err());
        assert!(validate_message("hi", -1.0).is_err());
        assert!(validate_message("hi", f64::NAN).is_err());
        assert!(validate_message(&"a".repeat(MAX_MESSAGE_LENGTH + 1), 0.0).is_err());
    }
}
