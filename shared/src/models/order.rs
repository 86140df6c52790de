//! POS Order Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::payment::{Payment, PaymentMethod};

/// POS order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Open,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// POS order row
///
/// Prices include tax: `total` is what the customer pays, `subtotal` is
/// `total - tax_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PosOrder {
    pub id: i64,
    pub table_id: Option<i64>,
    pub reservation_id: Option<i64>,
    pub created_by: i64,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub closed_at: Option<i64>,
}

/// POS order line (price snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PosOrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
    pub notes: Option<String>,
}

/// Order with lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: PosOrder,
    pub table_number: Option<i32>,
    pub items: Vec<PosOrderItem>,
}

/// Requested order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Open a POS order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub table_id: Option<i64>,
    pub reservation_id: Option<i64>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100), nested)]
    pub items: Vec<OrderItemInput>,
}

/// Add lines to an open order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemsAdd {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemInput>,
}

/// Settle an order at the counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderPayRequest {
    pub method: PaymentMethod,
    pub amount_tendered: Option<f64>,
}

/// Settlement result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayResponse {
    pub order: PosOrder,
    pub payment: Payment,
    pub change: f64,
}

/// Order list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}
