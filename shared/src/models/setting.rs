//! Restaurant Settings Model

use serde::{Deserialize, Serialize};

/// Raw key/value row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Typed view over all known settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    pub restaurant_name: String,
    pub restaurant_email: String,
    pub restaurant_phone: String,
    pub restaurant_address: String,
    /// `HH:MM`
    pub opening_time: String,
    /// `HH:MM`
    pub closing_time: String,
    pub reservation_duration_minutes: i32,
    pub max_party_size: i32,
    /// Percent, tax included in prices
    pub tax_rate: f64,
    pub currency: String,
    pub online_payments_enabled: bool,
}

impl Default for RestaurantSettings {
    fn default() -> Self {
        Self {
            restaurant_name: "Mesa".to_string(),
            restaurant_email: String::new(),
            restaurant_phone: String::new(),
            restaurant_address: String::new(),
            opening_time: "12:00".to_string(),
            closing_time: "23:00".to_string(),
            reservation_duration_minutes: 120,
            max_party_size: 20,
            tax_rate: 13.0,
            currency: "EUR".to_string(),
            online_payments_enabled: true,
        }
    }
}

/// Settings visible without login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicSettings {
    pub restaurant_name: String,
    pub restaurant_email: String,
    pub restaurant_phone: String,
    pub restaurant_address: String,
    pub opening_time: String,
    pub closing_time: String,
    pub reservation_duration_minutes: i32,
    pub max_party_size: i32,
    pub currency: String,
    pub online_payments_enabled: bool,
}

impl From<RestaurantSettings> for PublicSettings {
    fn from(s: RestaurantSettings) -> Self {
        Self {
            restaurant_name: s.restaurant_name,
            restaurant_email: s.restaurant_email,
            restaurant_phone: s.restaurant_phone,
            restaurant_address: s.restaurant_address,
            opening_time: s.opening_time,
            closing_time: s.closing_time,
            reservation_duration_minutes: s.reservation_duration_minutes,
            max_party_size: s.max_party_size,
            currency: s.currency,
            online_payments_enabled: s.online_payments_enabled,
        }
    }
}
