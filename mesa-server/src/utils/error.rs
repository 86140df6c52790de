//! Error handling
//!
//! Re-exports the unified error system from `shared::error` and bridges
//! `validator` failures into [`AppError`].

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Run `validator` rules on a request payload
///
/// Failures become `ValidationFailed` (400) with one `details` entry per
/// field: `{ "email": ["email"], "items[0].quantity": ["range"] }`.
pub fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(validation_error)
}

/// Convert `ValidationErrors` into an [`AppError`] with field details
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields = Vec::new();
    collect_field_errors(&errors, "", &mut fields);

    let summary = fields
        .iter()
        .map(|(field, _)| field.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut err = AppError::validation(format!("Invalid fields: {summary}"));
    for (field, messages) in fields {
        err = err.with_detail(field, Value::from(messages));
    }
    err
}

fn collect_field_errors(
    errors: &ValidationErrors,
    prefix: &str,
    out: &mut Vec<(String, Vec<String>)>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = list
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                out.push((path, messages));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ReservationCreate, ReservationItemInput};

    #[test]
    fn nested_errors_are_flattened_with_paths() {
        let req = ReservationCreate {
            table_id: 1,
            date: "2030-01-01".into(),
            time: "20:00".into(),
            party_size: 0,
            duration_minutes: None,
            special_requests: None,
            items: vec![ReservationItemInput {
                menu_item_id: 1,
                quantity: 500,
            }],
            user_id: None,
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert!(details.contains_key("party_size"));
        assert!(details.contains_key("items[0].quantity"));
    }
}
