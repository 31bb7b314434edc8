//! Form field rules
//!
//! Custom validators plugged into `#[derive(Validate)]` on the request DTOs,
//! plus the conversion from `validator` errors into per-field messages.

use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::PortalError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "This field is required"));
    }
    Ok(())
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    if value.chars().count() < 8 {
        return Err(invalid("too_short", "Password must be at least 8 characters"));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("no_uppercase", "Password must contain an uppercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(invalid("no_lowercase", "Password must contain a lowercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("no_digit", "Password must contain a digit"));
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Phone number is required"));
    }
    if !is_digits(value) || !(10..=12).contains(&value.len()) {
        return Err(invalid("phone", "Phone number must be 10-12 digits"));
    }
    Ok(())
}

/// National identity number (NIK): exactly 16 digits
pub fn validate_nik(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "NIK is required"));
    }
    if !is_digits(value) || value.len() != 16 {
        return Err(invalid("nik", "NIK must be 16 digits"));
    }
    Ok(())
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Username is required"));
    }
    let allowed = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !allowed || !(3..=20).contains(&value.len()) {
        return Err(invalid(
            "username",
            "Username must be 3-20 characters (letters, digits, underscore)",
        ));
    }
    Ok(())
}

pub fn validate_account_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 5 {
        return Err(invalid(
            "account_number",
            "Account number must be at least 5 digits",
        ));
    }
    Ok(())
}

/// First message per field, keyed by field name.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            list.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Runs the derived rules of a form, mapping failures to a validation error.
pub fn check<T: Validate>(form: &T) -> Result<(), PortalError> {
    form.validate().map_err(PortalError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert!(validate_password_strength("Rahasia123").is_ok());
        assert!(validate_password_strength("").is_err());
        assert!(validate_password_strength("Ab1").is_err());
        assert!(validate_password_strength("rahasia123").is_err());
        assert!(validate_password_strength("RAHASIA123").is_err());
        assert!(validate_password_strength("RahasiaSekali").is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("081234567890").is_ok());
        assert!(validate_phone("081234567").is_err());
        assert!(validate_phone("0812345678901").is_err());
        assert!(validate_phone("08123-45678").is_err());
    }

    #[test]
    fn test_nik_rules() {
        assert!(validate_nik("3201010101010001").is_ok());
        assert!(validate_nik("320101010101000").is_err());
        assert!(validate_nik("32010101010100AB").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("budi_01").is_ok());
        assert!(validate_username("bu").is_err());
        assert!(validate_username("budi santoso").is_err());
        assert!(validate_username("a_very_long_username_over").is_err());
    }

    #[test]
    fn test_required_ignores_whitespace() {
        assert!(validate_required("  ").is_err());
        assert!(validate_required("x").is_ok());
    }

    #[test]
    fn test_field_messages_uses_first_error() {
        let mut errors = ValidationErrors::new();
        errors.add("nominal", invalid("required", "Amount is required"));
        errors.add("nominal", invalid("positive", "Amount must be positive"));
        let messages = field_messages(&errors);
        assert_eq!(messages.get("nominal").map(String::as_str), Some("Amount is required"));
    }
}
