//! Payment Repository

use super::{RepoError, RepoResult, reservation};
use shared::error::ErrorCode;
use shared::models::{Payment, PaymentMethod, PaymentProvider, PaymentStatus};
use sqlx::{SqliteConnection, SqlitePool};

pub(crate) const PAYMENT_COLUMNS: &str = "id, reservation_id, order_id, user_id, amount, method, status, provider, provider_reference, entity, transaction_id, phone, failure_reason, created_at, updated_at, paid_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::PaymentNotFound, format!("Payment {id} not found"))
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub reservation_id: Option<i64>,
    pub order_id: Option<i64>,
    pub user_id: Option<i64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub phone: Option<String>,
}

/// List filter; `user_id` restricts to one customer
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub reservation_id: Option<i64>,
    pub user_id: Option<i64>,
}

pub async fn create(conn: &mut SqliteConnection, data: NewPayment) -> RepoResult<Payment> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let paid_at = (data.status == PaymentStatus::Paid).then_some(now);

    sqlx::query(
        "INSERT INTO payment (id, reservation_id, order_id, user_id, amount, method, status, provider, phone, created_at, updated_at, paid_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11)",
    )
    .bind(id)
    .bind(data.reservation_id)
    .bind(data.order_id)
    .bind(data.user_id)
    .bind(crate::money::round(data.amount))
    .bind(data.method)
    .bind(data.status)
    .bind(data.provider)
    .bind(data.phone)
    .bind(now)
    .bind(paid_at)
    .execute(&mut *conn)
    .await?;

    find_by_id(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payment".into()))
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Payment> {
    let mut conn = pool.acquire().await?;
    find_by_id(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Most recent gateway payment carrying this reference
pub async fn find_by_reference(
    pool: &SqlitePool,
    reference: &str,
    entity: Option<&str>,
) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment WHERE provider_reference = ?1 AND (?2 IS NULL OR entity IS NULL OR entity = ?2) ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(reference)
    .bind(entity)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

pub async fn list(pool: &SqlitePool, filter: &PaymentFilter) -> RepoResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment \
         WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR method = ?2) AND (?3 IS NULL OR reservation_id = ?3) AND (?4 IS NULL OR user_id = ?4) \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(filter.status)
    .bind(filter.method)
    .bind(filter.reservation_id)
    .bind(filter.user_id)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}

/// Store what the gateway handed back for a pending payment
pub async fn set_gateway_reference(
    pool: &SqlitePool,
    id: i64,
    reference: &str,
    entity: Option<&str>,
) -> RepoResult<Payment> {
    sqlx::query(
        "UPDATE payment SET provider_reference = ?1, entity = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(reference)
    .bind(entity)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    get(pool, id).await
}

/// Gateway rejected the request: payment `failed`, reservation payment
/// status `failed`
pub async fn mark_failed(pool: &SqlitePool, id: i64, reason: &str) -> RepoResult<Payment> {
    let mut tx = pool.begin().await?;
    let payment = find_by_id(&mut tx, id).await?.ok_or_else(|| not_found(id))?;

    sqlx::query(
        "UPDATE payment SET status = 'failed', failure_reason = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'pending'",
    )
    .bind(reason)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(reservation_id) = payment.reservation_id {
        // a reservation settled by another payment stays paid
        sqlx::query(
            "UPDATE reservation SET payment_status = 'failed', updated_at = ?1 WHERE id = ?2 AND payment_status = 'pending'",
        )
        .bind(shared::util::now_millis())
        .bind(reservation_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    get(pool, id).await
}

/// Settle a payment: mark it `paid` and propagate to its reservation
/// (`paid`, `pending -> confirmed`) and POS order (`open -> paid`)
///
/// Returns the payment and whether anything changed; settling an already
/// paid payment is a no-op.
pub async fn settle(
    pool: &SqlitePool,
    id: i64,
    transaction_id: Option<&str>,
) -> RepoResult<(Payment, bool)> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();
    // write first so concurrent callbacks serialize on the lock
    let rows = sqlx::query(
        "UPDATE payment SET status = 'paid', transaction_id = COALESCE(?1, transaction_id), failure_reason = NULL, paid_at = ?2, updated_at = ?2 \
         WHERE id = ?3 AND status IN ('pending', 'failed')",
    )
    .bind(transaction_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let payment = find_by_id(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    if rows.rows_affected() == 0 {
        return match payment.status {
            PaymentStatus::Paid => Ok((payment, false)),
            _ => Err(RepoError::Business(
                ErrorCode::PaymentFailed,
                "Payment was cancelled".into(),
            )),
        };
    }

    if let Some(reservation_id) = payment.reservation_id {
        reservation::mark_paid(&mut tx, reservation_id).await?;
    }
    if let Some(order_id) = payment.order_id {
        sqlx::query(
            "UPDATE pos_order SET status = 'paid', closed_at = ?1, updated_at = ?1 WHERE id = ?2 AND status = 'open'",
        )
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok((payment, true))
}
