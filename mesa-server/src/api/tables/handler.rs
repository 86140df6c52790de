//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::booking::BookingWindow;
use crate::core::ServerState;
use crate::db::repository::{dining_table, setting};
use crate::utils::{AppResult, validate};
use shared::models::{
    AvailabilityQuery, DeleteOutcome, DiningTable, DiningTableCreate, DiningTableUpdate,
    TableListQuery,
};

/// GET /api/tables?category=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TableListQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.pool, query.category).await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::get(&state.pool, id).await?;
    Ok(Json(table))
}

/// GET /api/tables/availability?date=&time=&party_size=&duration=&category=
///
/// Active tables that seat the party and have no overlapping booking.
pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    validate(&query)?;
    let duration = match query.duration {
        Some(minutes) => minutes,
        None => setting::load(&state.pool).await?.reservation_duration_minutes,
    };
    let window = BookingWindow::parse(&query.date, &query.time, duration, state.config.timezone)?;

    let tables = dining_table::find_available(
        &state.pool,
        window.slot.starts_at,
        window.slot.ends_at,
        query.party_size,
        query.category,
    )
    .await?;
    Ok(Json(tables))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate(&payload)?;
    let table = dining_table::create(&state.pool, payload).await?;
    tracing::info!(table_id = table.id, number = table.number, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    validate(&payload)?;
    let table = dining_table::update(&state.pool, id, payload).await?;
    Ok(Json(table))
}

/// DELETE /api/tables/{id}
///
/// Refused with upcoming reservations; deactivated when only history remains.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome =
        dining_table::delete(&state.pool, id, shared::util::now_millis()).await?;
    tracing::info!(table_id = id, archived = outcome.archived, "Table removed");
    Ok(Json(outcome))
}
