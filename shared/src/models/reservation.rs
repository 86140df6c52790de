//! Reservation Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reservation lifecycle
///
/// `pending -> confirmed -> completed`, and `pending | confirmed -> cancelled`.
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Cancelled
        )
    }

    /// Whether a reservation in this status holds its table
    pub fn holds_table(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        )
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

/// Payment progress of a reservation
///
/// `unpaid -> pending -> paid | failed`, `failed -> pending` on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ReservationPaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Failed,
}

impl ReservationPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationPaymentStatus::Unpaid => "unpaid",
            ReservationPaymentStatus::Pending => "pending",
            ReservationPaymentStatus::Paid => "paid",
            ReservationPaymentStatus::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: ReservationPaymentStatus) -> bool {
        use ReservationPaymentStatus::*;
        matches!(
            (self, next),
            (Unpaid, Pending)
                | (Pending, Pending)
                | (Pending, Paid)
                | (Pending, Failed)
                | (Failed, Pending)
                // A late callback can settle a reference after a failed retry
                | (Failed, Paid)
                | (Unpaid, Paid)
        )
    }
}

/// Reservation row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub table_id: i64,
    /// `YYYY-MM-DD` in the business timezone
    pub reservation_date: String,
    /// `HH:MM`
    pub reservation_time: String,
    pub duration_minutes: i32,
    pub starts_at: i64,
    pub ends_at: i64,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub payment_status: ReservationPaymentStatus,
    pub special_requests: Option<String>,
    pub total_amount: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Reservation joined with table and customer (list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub reservation: Reservation,
    pub table_number: i32,
    pub customer_name: String,
    pub customer_email: String,
}

/// Menu item pre-ordered with a reservation (price snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationItem {
    pub id: i64,
    pub reservation_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
}

/// Reservation with items (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub summary: ReservationSummary,
    pub items: Vec<ReservationItem>,
}

/// Requested menu item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationItemInput {
    pub menu_item_id: i64,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    pub table_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[validate(range(min = 1, max = 100))]
    pub party_size: i32,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50), nested)]
    pub items: Vec<ReservationItemInput>,
    /// Book on behalf of a customer (admin only)
    pub user_id: Option<i64>,
}

/// Update reservation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReservationUpdate {
    pub table_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub party_size: Option<i32>,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}

/// Reservation list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<ReservationStatus>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// Admin only
    pub user_id: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationStatus::*;

    #[test]
    fn reservation_transitions() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
        for next in ReservationStatus::ALL {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn only_open_reservations_hold_tables() {
        assert!(Pending.holds_table());
        assert!(Confirmed.holds_table());
        assert!(!Completed.holds_table());
        assert!(!Cancelled.holds_table());
    }

    #[test]
    fn payment_status_transitions() {
        use ReservationPaymentStatus as P;
        assert!(P::Unpaid.can_transition_to(P::Pending));
        assert!(P::Pending.can_transition_to(P::Paid));
        assert!(P::Pending.can_transition_to(P::Failed));
        assert!(P::Failed.can_transition_to(P::Pending));
        assert!(!P::Paid.can_transition_to(P::Pending));
        assert!(!P::Paid.can_transition_to(P::Failed));
    }

    #[test]
    fn nested_item_quantity_is_validated() {
        let req = ReservationCreate {
            table_id: 1,
            date: "2030-01-01".into(),
            time: "20:00".into(),
            party_size: 2,
            duration_minutes: None,
            special_requests: None,
            items: vec![ReservationItemInput {
                menu_item_id: 1,
                quantity: 0,
            }],
            user_id: None,
        };
        assert!(req.validate().is_err());
    }
}
