//! Reservation Repository
//!
//! Booking writes run in a single transaction that first touches the table
//! row. That takes SQLite's write lock before the overlap read, so two
//! concurrent bookings for the same slot serialize and the second one sees
//! the first.

use super::{RepoError, RepoResult};
use crate::booking::Slot;
use shared::error::ErrorCode;
use shared::models::{
    MenuItem, Reservation, ReservationDetail, ReservationItem, ReservationPaymentStatus,
    ReservationStatus, ReservationSummary,
};
use sqlx::{SqliteConnection, SqlitePool};

const RESERVATION_COLUMNS: &str = "r.id, r.user_id, r.table_id, r.reservation_date, r.reservation_time, r.duration_minutes, r.starts_at, r.ends_at, r.party_size, r.status, r.payment_status, r.special_requests, r.total_amount, r.created_at, r.updated_at";

fn summary_select() -> String {
    format!(
        "SELECT {RESERVATION_COLUMNS}, t.number AS table_number, u.full_name AS customer_name, u.email AS customer_email \
         FROM reservation r \
         JOIN dining_table t ON t.id = r.table_id \
         JOIN users u ON u.id = r.user_id"
    )
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::ReservationNotFound,
        format!("Reservation {id} not found"),
    )
}

/// Validated booking ready to persist
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: i64,
    pub table_id: i64,
    pub date: String,
    pub time: String,
    pub duration_minutes: i32,
    pub slot: Slot,
    pub party_size: i32,
    pub special_requests: Option<String>,
    /// Menu items (already checked available) with quantities
    pub items: Vec<(MenuItem, i32)>,
}

/// Changed booking fields; the window is always recomputed by the caller
#[derive(Debug, Clone)]
pub struct ReservationChanges {
    pub table_id: i64,
    pub date: String,
    pub time: String,
    pub duration_minutes: i32,
    pub slot: Slot,
    pub party_size: i32,
    pub special_requests: Option<String>,
}

/// List filter
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub date: Option<String>,
    pub user_id: Option<i64>,
}

/// Lock the table row for this transaction
async fn lock_table(conn: &mut SqliteConnection, table_id: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE dining_table SET updated_at = updated_at WHERE id = ?")
        .bind(table_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::TableNotFound,
            format!("Table {table_id} not found"),
        ));
    }
    Ok(())
}

/// Fail with `TableAlreadyBooked` when a pending/confirmed reservation on the
/// table overlaps `slot` (`exclude` skips the reservation being edited)
pub async fn ensure_slot_free(
    conn: &mut SqliteConnection,
    table_id: i64,
    slot: Slot,
    exclude: Option<i64>,
) -> RepoResult<()> {
    let booked: Vec<(i64, i64, i64)> = sqlx::query_as(
        "SELECT id, starts_at, ends_at FROM reservation \
         WHERE table_id = ?1 AND status IN ('pending', 'confirmed') AND starts_at < ?2 AND ends_at > ?3",
    )
    .bind(table_id)
    .bind(slot.ends_at)
    .bind(slot.starts_at)
    .fetch_all(&mut *conn)
    .await?;

    let conflict = booked.into_iter().find(|(id, starts_at, ends_at)| {
        Some(*id) != exclude
            && slot.overlaps(&Slot {
                starts_at: *starts_at,
                ends_at: *ends_at,
            })
    });
    if let Some((id, _, _)) = conflict {
        tracing::debug!(table_id, conflicting = id, "Slot already booked");
        return Err(RepoError::Business(
            ErrorCode::TableAlreadyBooked,
            "Table is already booked for this time".into(),
        ));
    }
    Ok(())
}

/// Insert a reservation and its items after the overlap check, atomically
pub async fn create(pool: &SqlitePool, data: NewReservation) -> RepoResult<ReservationDetail> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let lines: Vec<(MenuItem, i32, f64)> = data
        .items
        .into_iter()
        .map(|(item, qty)| {
            let total = crate::money::line_total(item.price, qty);
            (item, qty, total)
        })
        .collect();
    let total_amount = crate::money::sum(lines.iter().map(|(_, _, t)| *t));

    let mut tx = pool.begin().await?;
    lock_table(&mut tx, data.table_id).await?;
    ensure_slot_free(&mut tx, data.table_id, data.slot, None).await?;

    sqlx::query(
        "INSERT INTO reservation (id, user_id, table_id, reservation_date, reservation_time, duration_minutes, starts_at, ends_at, party_size, status, payment_status, special_requests, total_amount, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', 'unpaid', ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(data.table_id)
    .bind(&data.date)
    .bind(&data.time)
    .bind(data.duration_minutes)
    .bind(data.slot.starts_at)
    .bind(data.slot.ends_at)
    .bind(data.party_size)
    .bind(data.special_requests)
    .bind(total_amount)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for (item, qty, line_total) in &lines {
        sqlx::query(
            "INSERT INTO reservation_item (id, reservation_id, menu_item_id, name, unit_price, quantity, line_total) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(id)
        .bind(item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(qty)
        .bind(line_total)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    get_detail(pool, id).await
}

/// Reschedule / edit a reservation with the same overlap guarantee as create
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    changes: ReservationChanges,
) -> RepoResult<ReservationDetail> {
    let mut tx = pool.begin().await?;
    lock_table(&mut tx, changes.table_id).await?;
    ensure_slot_free(&mut tx, changes.table_id, changes.slot, Some(id)).await?;

    let rows = sqlx::query(
        "UPDATE reservation SET table_id = ?1, reservation_date = ?2, reservation_time = ?3, duration_minutes = ?4, starts_at = ?5, ends_at = ?6, party_size = ?7, special_requests = ?8, updated_at = ?9 \
         WHERE id = ?10 AND status IN ('pending', 'confirmed')",
    )
    .bind(changes.table_id)
    .bind(&changes.date)
    .bind(&changes.time)
    .bind(changes.duration_minutes)
    .bind(changes.slot.starts_at)
    .bind(changes.slot.ends_at)
    .bind(changes.party_size)
    .bind(changes.special_requests)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ReservationNotEditable,
            "Reservation can no longer be edited".into(),
        ));
    }

    tx.commit().await?;
    get_detail(pool, id).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservation r WHERE r.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(reservation)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Reservation> {
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn get_summary(pool: &SqlitePool, id: i64) -> RepoResult<ReservationSummary> {
    sqlx::query_as::<_, ReservationSummary>(&format!("{} WHERE r.id = ?", summary_select()))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn items(pool: &SqlitePool, reservation_id: i64) -> RepoResult<Vec<ReservationItem>> {
    let items = sqlx::query_as::<_, ReservationItem>(
        "SELECT id, reservation_id, menu_item_id, name, unit_price, quantity, line_total FROM reservation_item WHERE reservation_id = ? ORDER BY name",
    )
    .bind(reservation_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn get_detail(pool: &SqlitePool, id: i64) -> RepoResult<ReservationDetail> {
    let summary = get_summary(pool, id).await?;
    let items = items(pool, id).await?;
    Ok(ReservationDetail { summary, items })
}

/// Paginated list, newest booking first
pub async fn list(
    pool: &SqlitePool,
    filter: &ReservationFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<ReservationSummary>, i64)> {
    let clause = "WHERE (?1 IS NULL OR r.status = ?1) AND (?2 IS NULL OR r.reservation_date = ?2) AND (?3 IS NULL OR r.user_id = ?3)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reservation r {clause}"))
        .bind(filter.status)
        .bind(filter.date.as_deref())
        .bind(filter.user_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, ReservationSummary>(&format!(
        "{} {clause} ORDER BY r.starts_at DESC, r.id DESC LIMIT ?4 OFFSET ?5",
        summary_select()
    ))
    .bind(filter.status)
    .bind(filter.date.as_deref())
    .bind(filter.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Move `from` -> `to`; fails if someone else changed the status meanwhile
pub async fn transition(
    pool: &SqlitePool,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
) -> RepoResult<Reservation> {
    if !from.can_transition_to(to) {
        return Err(RepoError::Business(
            ErrorCode::ReservationInvalidTransition,
            format!(
                "Cannot change reservation status from {} to {}",
                from.as_str(),
                to.as_str()
            ),
        ));
    }

    let rows = sqlx::query(
        "UPDATE reservation SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ReservationInvalidTransition,
            "Reservation status changed concurrently".into(),
        ));
    }
    get(pool, id).await
}

/// Set the payment status, enforcing allowed transitions
pub async fn set_payment_status(
    conn: &mut SqliteConnection,
    id: i64,
    to: ReservationPaymentStatus,
) -> RepoResult<()> {
    let current: Option<ReservationPaymentStatus> =
        sqlx::query_scalar("SELECT payment_status FROM reservation WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    let current = current.ok_or_else(|| not_found(id))?;
    if current == to {
        return Ok(());
    }
    if !current.can_transition_to(to) {
        return Err(RepoError::Validation(format!(
            "Cannot change payment status from {} to {}",
            current.as_str(),
            to.as_str()
        )));
    }

    sqlx::query("UPDATE reservation SET payment_status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(to)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Paid reservation: payment status `paid`, `pending` becomes `confirmed`
pub async fn mark_paid(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    set_payment_status(conn, id, ReservationPaymentStatus::Paid).await?;
    sqlx::query(
        "UPDATE reservation SET status = 'confirmed', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Hard delete; items cascade, payments keep their row with a NULL link
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM reservation WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
