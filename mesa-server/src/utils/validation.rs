//! Input validation helpers
//!
//! Rules that `validator` derives cannot express on their own.

use crate::money::MAX_PRICE;
use crate::utils::{AppError, ErrorCode};

/// Notes, descriptions, special requests
pub const MAX_NOTE_LEN: usize = 500;

/// Search terms
pub const MAX_SEARCH_LEN: usize = 100;

/// Validate that a required string is not blank once trimmed.
pub fn validate_not_blank(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail(field, "blank"));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Validate that a money amount is finite and within `[0, max]`.
pub fn validate_amount(value: f64, field: &str, max: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Menu prices: `[0, MAX_PRICE]`, rejected as `MenuItemInvalidPrice`
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
        return Err(AppError::with_message(
            ErrorCode::MenuItemInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}, got {price}"),
        ));
    }
    Ok(())
}

/// Normalize a Portuguese mobile number for MB WAY.
///
/// Accepts `9XXXXXXXX`, `+3519XXXXXXXX`, `3519XXXXXXXX` and `351#9XXXXXXXX`,
/// ignoring spaces. Returns the gateway alias form `351#9XXXXXXXX`.
pub fn normalize_mbway_phone(phone: &str) -> Result<String, AppError> {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let national = compact
        .strip_prefix("+351")
        .or_else(|| compact.strip_prefix("351#"))
        .or_else(|| compact.strip_prefix("351"))
        .unwrap_or(&compact);

    let valid = national.len() == 9
        && national.starts_with('9')
        && national.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(
            AppError::validation("phone must be a Portuguese mobile number (9XXXXXXXX)")
                .with_detail("phone", phone),
        );
    }
    Ok(format!("351#{national}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mbway_phone_forms() {
        assert_eq!(normalize_mbway_phone("912345678").unwrap(), "351#912345678");
        assert_eq!(
            normalize_mbway_phone("+351 912 345 678").unwrap(),
            "351#912345678"
        );
        assert_eq!(
            normalize_mbway_phone("351#912345678").unwrap(),
            "351#912345678"
        );
        assert_eq!(normalize_mbway_phone("351912345678").unwrap(), "351#912345678");

        assert!(normalize_mbway_phone("212345678").is_err());
        assert!(normalize_mbway_phone("91234567").is_err());
        assert!(normalize_mbway_phone("9123456789").is_err());
        assert!(normalize_mbway_phone("91234567a").is_err());
    }

    #[test]
    fn amounts() {
        assert!(validate_amount(0.0, "amount", 100.0).is_ok());
        assert!(validate_amount(100.0, "amount", 100.0).is_ok());
        assert!(validate_amount(-0.5, "amount", 100.0).is_err());
        assert!(validate_amount(f64::NAN, "amount", 100.0).is_err());
        assert!(validate_amount(f64::INFINITY, "amount", 100.0).is_err());
    }

    #[test]
    fn menu_prices() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(MAX_PRICE).is_ok());
        let err = validate_price(-0.01).unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemInvalidPrice);
        assert!(validate_price(MAX_PRICE + 0.01).is_err());
    }

    #[test]
    fn text_helpers() {
        assert!(validate_not_blank("  ", "name").is_err());
        assert!(validate_not_blank("Sala", "name").is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "notes", MAX_NOTE_LEN).is_err());
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
    }
}
