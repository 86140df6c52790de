//! Finance reporting Model

use serde::{Deserialize, Serialize};

/// Date range filter, both ends inclusive (`YYYY-MM-DD`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinanceQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Ledger filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<super::PaymentStatus>,
    pub method: Option<super::PaymentMethod>,
}

/// Paid revenue per method
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MethodBreakdown {
    pub method: String,
    pub count: i64,
    pub total: f64,
}

/// Row count per status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Paid revenue per business day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: String,
    pub count: i64,
    pub total: f64,
}

/// Finance dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub from: String,
    pub to: String,
    pub revenue_total: f64,
    pub payment_count: i64,
    pub average_payment: f64,
    pub pending_amount: f64,
    pub by_method: Vec<MethodBreakdown>,
    pub reservations_by_status: Vec<StatusCount>,
    pub orders_by_status: Vec<StatusCount>,
    pub daily: Vec<DailyRevenue>,
}
