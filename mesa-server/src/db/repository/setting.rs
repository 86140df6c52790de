//! Setting Repository
//!
//! Key/value rows with typed validation of the known keys.

use std::collections::BTreeMap;

use super::{RepoError, RepoResult};
use serde_json::Value;
use shared::error::ErrorCode;
use shared::models::{RestaurantSettings, Setting};
use sqlx::SqlitePool;

/// Value type of a known setting key
#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Email,
    Time,
    Integer { min: i64, max: i64 },
    Decimal { min: f64, max: f64 },
    Currency,
    Bool,
}

const KNOWN_KEYS: &[(&str, Kind)] = &[
    ("restaurant_name", Kind::Text),
    ("restaurant_email", Kind::Email),
    ("restaurant_phone", Kind::Text),
    ("restaurant_address", Kind::Text),
    ("opening_time", Kind::Time),
    ("closing_time", Kind::Time),
    ("reservation_duration_minutes", Kind::Integer { min: 15, max: 480 }),
    ("max_party_size", Kind::Integer { min: 1, max: 100 }),
    ("tax_rate", Kind::Decimal { min: 0.0, max: 100.0 }),
    ("currency", Kind::Currency),
    ("online_payments_enabled", Kind::Bool),
];

const MAX_TEXT_LEN: usize = 200;

fn invalid(key: &str, expected: &str) -> RepoError {
    RepoError::Business(
        ErrorCode::InvalidSettingValue,
        format!("Invalid value for '{key}': expected {expected}"),
    )
}

/// JSON scalar as the raw text it would be stored as
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Validate one key/value and return the normalized stored text
pub fn normalize(key: &str, value: &Value) -> RepoResult<String> {
    let kind = KNOWN_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            RepoError::Business(ErrorCode::UnknownSetting, format!("Unknown setting '{key}'"))
        })?;
    let text = scalar_text(value).ok_or_else(|| invalid(key, "a string, number or boolean"))?;

    match kind {
        Kind::Text => {
            if text.chars().count() > MAX_TEXT_LEN {
                return Err(invalid(key, "at most 200 characters"));
            }
            Ok(text)
        }
        Kind::Email => {
            if !text.is_empty() && !validator::ValidateEmail::validate_email(&text) {
                return Err(invalid(key, "an email address"));
            }
            Ok(text)
        }
        Kind::Time => chrono::NaiveTime::parse_from_str(&text, "%H:%M")
            .map(|t| t.format("%H:%M").to_string())
            .map_err(|_| invalid(key, "HH:MM")),
        Kind::Integer { min, max } => match text.parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => Ok(n.to_string()),
            _ => Err(invalid(key, &format!("an integer between {min} and {max}"))),
        },
        Kind::Decimal { min, max } => match text.parse::<f64>() {
            Ok(n) if n.is_finite() && (min..=max).contains(&n) => {
                Ok(crate::money::round(n).to_string())
            }
            _ => Err(invalid(key, &format!("a number between {min} and {max}"))),
        },
        Kind::Currency => {
            if text.len() == 3 && text.chars().all(|c| c.is_ascii_uppercase()) {
                Ok(text)
            } else {
                Err(invalid(key, "a 3-letter uppercase currency code"))
            }
        }
        Kind::Bool => match text.as_str() {
            "true" | "false" => Ok(text),
            _ => Err(invalid(key, "true or false")),
        },
    }
}

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<Setting>> {
    let settings =
        sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM setting ORDER BY key")
            .fetch_all(pool)
            .await?;
    Ok(settings)
}

/// Typed view of the settings table; missing or malformed rows fall back to
/// defaults
pub async fn load(pool: &SqlitePool) -> RepoResult<RestaurantSettings> {
    let rows = list(pool).await?;
    Ok(from_rows(&rows))
}

fn from_rows(rows: &[Setting]) -> RestaurantSettings {
    let mut s = RestaurantSettings::default();
    for row in rows {
        let v = row.value.as_str();
        match row.key.as_str() {
            "restaurant_name" => s.restaurant_name = v.to_string(),
            "restaurant_email" => s.restaurant_email = v.to_string(),
            "restaurant_phone" => s.restaurant_phone = v.to_string(),
            "restaurant_address" => s.restaurant_address = v.to_string(),
            "opening_time" => s.opening_time = v.to_string(),
            "closing_time" => s.closing_time = v.to_string(),
            "reservation_duration_minutes" => {
                s.reservation_duration_minutes = v.parse().unwrap_or(s.reservation_duration_minutes)
            }
            "max_party_size" => s.max_party_size = v.parse().unwrap_or(s.max_party_size),
            "tax_rate" => s.tax_rate = v.parse().unwrap_or(s.tax_rate),
            "currency" => s.currency = v.to_string(),
            "online_payments_enabled" => s.online_payments_enabled = v == "true",
            other => tracing::debug!(key = other, "Ignoring unknown setting row"),
        }
    }
    s
}

/// Upsert several keys, all-or-nothing
///
/// Every pair is validated before the transaction starts.
pub async fn update(
    pool: &SqlitePool,
    values: &BTreeMap<String, Value>,
) -> RepoResult<RestaurantSettings> {
    if values.is_empty() {
        return Err(RepoError::Validation("No settings given".into()));
    }
    let normalized = values
        .iter()
        .map(|(key, value)| normalize(key, value).map(|v| (key.as_str(), v)))
        .collect::<RepoResult<Vec<_>>>()?;

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for (key, value) in &normalized {
        sqlx::query(
            "INSERT INTO setting (key, value, updated_at) VALUES (?1, ?2, ?3) ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let keys: Vec<&str> = normalized.iter().map(|(k, _)| *k).collect();
    tracing::info!(?keys, "Settings updated");
    load(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code(err: RepoError) -> ErrorCode {
        match err {
            RepoError::Business(code, _) => code,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn normalizes_known_keys() {
        assert_eq!(normalize("opening_time", &json!(" 21:30 ")).unwrap(), "21:30");
        assert_eq!(normalize("max_party_size", &json!(8)).unwrap(), "8");
        assert_eq!(normalize("max_party_size", &json!("12")).unwrap(), "12");
        assert_eq!(normalize("tax_rate", &json!(23)).unwrap(), "23");
        assert_eq!(normalize("tax_rate", &json!("6.5")).unwrap(), "6.5");
        assert_eq!(normalize("online_payments_enabled", &json!(false)).unwrap(), "false");
        assert_eq!(normalize("currency", &json!("EUR")).unwrap(), "EUR");
        assert_eq!(normalize("restaurant_email", &json!("")).unwrap(), "");
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert_eq!(
            code(normalize("wifi_password", &json!("x")).unwrap_err()),
            ErrorCode::UnknownSetting
        );
        for (key, value) in [
            ("opening_time", json!("25:00")),
            ("reservation_duration_minutes", json!(5)),
            ("max_party_size", json!("many")),
            ("tax_rate", json!(120)),
            ("currency", json!("eur")),
            ("online_payments_enabled", json!("yes")),
            ("restaurant_email", json!("not-an-email")),
            ("restaurant_name", json!({"nested": true})),
        ] {
            assert_eq!(
                code(normalize(key, &value).unwrap_err()),
                ErrorCode::InvalidSettingValue,
                "{key}"
            );
        }
    }

    #[test]
    fn typed_view_falls_back_on_bad_rows() {
        let rows = vec![
            Setting { key: "max_party_size".into(), value: "oops".into(), updated_at: 0 },
            Setting { key: "tax_rate".into(), value: "23".into(), updated_at: 0 },
            Setting { key: "online_payments_enabled".into(), value: "false".into(), updated_at: 0 },
        ];
        let s = from_rows(&rows);
        assert_eq!(s.max_party_size, RestaurantSettings::default().max_party_size);
        assert_eq!(s.tax_rate, 23.0);
        assert!(!s.online_payments_enabled);
    }
}
