//! Dining Table Repository

use super::{RepoError, RepoResult, on_duplicate};
use shared::error::ErrorCode;
use shared::models::{
    DeleteOutcome, DiningTable, DiningTableCreate, DiningTableUpdate, TableCategory,
};
use sqlx::{SqliteConnection, SqlitePool};

const TABLE_SELECT: &str =
    "SELECT id, number, capacity, category, location, is_active, created_at, updated_at FROM dining_table";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::TableNotFound, format!("Table {id} not found"))
}

fn number_taken(number: i32) -> RepoError {
    RepoError::Business(
        ErrorCode::TableNumberExists,
        format!("Table number {number} already exists"),
    )
}

pub async fn find_all(
    pool: &SqlitePool,
    category: Option<TableCategory>,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "{TABLE_SELECT} WHERE (?1 IS NULL OR category = ?1) ORDER BY number"
    ))
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!("{TABLE_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(table)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<DiningTable> {
    let mut conn = pool.acquire().await?;
    find_by_id(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

pub async fn find_by_number(pool: &SqlitePool, number: i32) -> RepoResult<Option<DiningTable>> {
    let table =
        sqlx::query_as::<_, DiningTable>(&format!("{TABLE_SELECT} WHERE number = ? LIMIT 1"))
            .bind(number)
            .fetch_optional(pool)
            .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    if find_by_number(pool, data.number).await?.is_some() {
        return Err(number_taken(data.number));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO dining_table (id, number, capacity, category, location, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.category.unwrap_or_default())
    .bind(data.location)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(
        ErrorCode::TableNumberExists,
        format!("Table number {} already exists", data.number),
    ))?;

    get(pool, id).await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: DiningTableUpdate,
) -> RepoResult<DiningTable> {
    let existing = get(pool, id).await?;

    if let Some(number) = data.number
        && number != existing.number
        && find_by_number(pool, number).await?.is_some()
    {
        return Err(number_taken(number));
    }

    sqlx::query(
        "UPDATE dining_table SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), category = COALESCE(?3, category), location = COALESCE(?4, location), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.category)
    .bind(data.location)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(ErrorCode::TableNumberExists, "Table number already exists"))?;

    get(pool, id).await
}

/// Delete a table
///
/// Refused while pending/confirmed reservations still lie ahead. A table
/// with only past reservations is deactivated instead, keeping history intact.
pub async fn delete(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<DeleteOutcome> {
    get(pool, id).await?;

    let upcoming: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservation WHERE table_id = ?1 AND status IN ('pending', 'confirmed') AND ends_at > ?2",
    )
    .bind(id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    if upcoming > 0 {
        return Err(RepoError::Business(
            ErrorCode::TableHasReservations,
            format!("Table has {upcoming} upcoming reservation(s)"),
        ));
    }

    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation WHERE table_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if history > 0 {
        sqlx::query("UPDATE dining_table SET is_active = 0, updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
        return Ok(DeleteOutcome::archived());
    }

    sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(DeleteOutcome::deleted())
}

/// Tables free for `[starts_at, ends_at)`
///
/// Active, capacity ≥ `party_size`, matching `category` when given, and no
/// pending/confirmed reservation overlapping the window. Sorted by capacity
/// then number so the tightest fit comes first.
pub async fn find_available(
    pool: &SqlitePool,
    starts_at: i64,
    ends_at: i64,
    party_size: i32,
    category: Option<TableCategory>,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT t.id, t.number, t.capacity, t.category, t.location, t.is_active, t.created_at, t.updated_at \
         FROM dining_table t \
         WHERE t.is_active = 1 AND t.capacity >= ?1 AND (?2 IS NULL OR t.category = ?2) \
         AND NOT EXISTS ( \
             SELECT 1 FROM reservation r \
             WHERE r.table_id = t.id AND r.status IN ('pending', 'confirmed') \
             AND r.starts_at < ?4 AND ?3 < r.ends_at \
         ) \
         ORDER BY t.capacity, t.number",
    )
    .bind(party_size)
    .bind(category)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}
