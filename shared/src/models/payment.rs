//! Payment Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payment rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Multibanco,
    Mbway,
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Multibanco => "multibanco",
            PaymentMethod::Mbway => "mbway",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }

    /// Online rails go through the payment gateway
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMethod::Multibanco | PaymentMethod::Mbway)
    }
}

/// Payment record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

/// Who settled the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentProvider {
    Eupago,
    Manual,
}

/// Payment row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub reservation_id: Option<i64>,
    pub order_id: Option<i64>,
    pub user_id: Option<i64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub provider: PaymentProvider,
    /// Multibanco reference or MB WAY request reference
    pub provider_reference: Option<String>,
    /// Multibanco entity
    pub entity: Option<String>,
    /// Gateway transaction id (from the callback)
    pub transaction_id: Option<String>,
    pub phone: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
}

/// Start a Multibanco payment for a reservation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MultibancoPaymentRequest {
    pub reservation_id: i64,
}

/// Start an MB WAY payment for a reservation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MbwayPaymentRequest {
    pub reservation_id: i64,
    #[validate(length(min = 9, max = 20))]
    pub phone: String,
}

/// Payment list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub reservation_id: Option<i64>,
}
