//! Repository Module
//!
//! Free functions over a `SqlitePool` (or a transaction connection), one
//! module per table family.

pub mod dining_table;
pub mod finance;
pub mod menu;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod setting;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation carrying its own error code
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database("Database operation failed")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Map a UNIQUE violation to a specific business code, pass everything else
/// through unchanged
pub(crate) fn on_duplicate(
    code: ErrorCode,
    message: impl Into<String>,
) -> impl FnOnce(RepoError) -> RepoError {
    let message = message.into();
    move |err| match err {
        RepoError::Duplicate(_) => RepoError::Business(code, message),
        other => other,
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn business_errors_keep_their_code() {
        let err: AppError =
            RepoError::Business(ErrorCode::TableAlreadyBooked, "Table 4 is booked".into()).into();
        assert_eq!(err.code, ErrorCode::TableAlreadyBooked);
        assert_eq!(err.message, "Table 4 is booked");

        let err: AppError = RepoError::Duplicate("x".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        let err: AppError = RepoError::Database("disk I/O".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn duplicate_mapping() {
        let mapped = on_duplicate(ErrorCode::UsernameExists, "taken")(RepoError::Duplicate(
            "UNIQUE constraint failed: users.username".into(),
        ));
        assert!(matches!(mapped, RepoError::Business(ErrorCode::UsernameExists, _)));
        let passthrough = on_duplicate(ErrorCode::UsernameExists, "taken")(RepoError::NotFound(
            "x".into(),
        ));
        assert!(matches!(passthrough, RepoError::NotFound(_)));
    }
}
