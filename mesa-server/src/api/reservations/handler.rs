//! Reservation API Handlers
//!
//! Create and update run the same checks, in order: party size against the
//! configured maximum, date/time parsing, start in the future, opening hours,
//! table active and large enough, menu items available. The overlap check
//! happens inside the repository transaction.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::booking::BookingWindow;
use crate::core::ServerState;
use crate::db::repository::{dining_table, menu, reservation, setting, user};
use crate::utils::time::parse_date;
use crate::utils::types::PaginationParams;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, validate};
use shared::PaginatedResponse;
use shared::models::{
    DiningTable, Reservation, ReservationCreate, ReservationDetail, ReservationListQuery,
    ReservationStatus, ReservationStatusUpdate, ReservationSummary, ReservationUpdate,
    RestaurantSettings,
};

fn forbidden() -> AppError {
    AppError::forbidden("You can only access your own reservations")
}

fn ensure_party_size(party_size: i32, settings: &RestaurantSettings) -> AppResult<()> {
    if party_size > settings.max_party_size {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!(
                "Party size {party_size} exceeds the maximum of {}",
                settings.max_party_size
            ),
        )
        .with_detail("party_size", party_size));
    }
    Ok(())
}

/// Table must be active and seat the party
async fn bookable_table(
    state: &ServerState,
    table_id: i64,
    party_size: i32,
) -> AppResult<DiningTable> {
    let table = dining_table::get(&state.pool, table_id).await?;
    if !table.is_active {
        return Err(AppError::with_message(
            ErrorCode::TableInactive,
            format!("Table {} is not available for booking", table.number),
        ));
    }
    if party_size > table.capacity {
        return Err(AppError::with_message(
            ErrorCode::TableCapacityExceeded,
            format!(
                "Table {} seats {} guests, party has {party_size}",
                table.number, table.capacity
            ),
        ));
    }
    Ok(table)
}

/// POST /api/reservations
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<ReservationDetail>)> {
    validate(&req)?;
    validate_optional_text(&req.special_requests, "special_requests", MAX_NOTE_LEN)?;
    let settings = setting::load(&state.pool).await?;
    ensure_party_size(req.party_size, &settings)?;

    let user_id = match req.user_id {
        Some(id) if id != current_user.id => {
            if !current_user.is_admin() {
                return Err(AppError::new(ErrorCode::AdminRequired));
            }
            user::get(&state.pool, id).await?.id
        }
        _ => current_user.id,
    };

    let duration = req
        .duration_minutes
        .unwrap_or(settings.reservation_duration_minutes);
    let window = BookingWindow::parse(&req.date, &req.time, duration, state.config.timezone)?;
    window.ensure_future(shared::util::now_millis())?;
    window.ensure_within_hours(&settings.opening_time, &settings.closing_time)?;

    bookable_table(&state, req.table_id, req.party_size).await?;

    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        let item = menu::get_orderable_item(&state.pool, line.menu_item_id).await?;
        items.push((item, line.quantity));
    }

    let detail = reservation::create(
        &state.pool,
        reservation::NewReservation {
            user_id,
            table_id: req.table_id,
            date: window.date_string(),
            time: window.time_string(),
            duration_minutes: duration,
            slot: window.slot,
            party_size: req.party_size,
            special_requests: req.special_requests,
            items,
        },
    )
    .await?;

    tracing::info!(
        reservation_id = detail.summary.reservation.id,
        table_id = req.table_id,
        user_id,
        date = %detail.summary.reservation.reservation_date,
        time = %detail.summary.reservation.reservation_time,
        "Reservation created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/reservations?status=&date=&user_id=&page=&page_size=
///
/// Customers only ever see their own reservations.
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ReservationListQuery>,
) -> AppResult<Json<PaginatedResponse<ReservationSummary>>> {
    let date = match query.date.as_deref() {
        Some(d) => Some(parse_date(d)?.format("%Y-%m-%d").to_string()),
        None => None,
    };
    let user_id = if current_user.is_admin() {
        query.user_id
    } else {
        Some(current_user.id)
    };

    let page = PaginationParams::from_query(query.page, query.page_size);
    let filter = reservation::ReservationFilter {
        status: query.status,
        date,
        user_id,
    };
    let (rows, total) =
        reservation::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page, page.page_size)))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservation::get_detail(&state.pool, id).await?;
    if !current_user.can_access(detail.summary.reservation.user_id) {
        return Err(forbidden());
    }
    Ok(Json(detail))
}

/// PUT /api/reservations/{id}
///
/// Owners may edit while the booking is pending; admins while it is pending
/// or confirmed.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ReservationUpdate>,
) -> AppResult<Json<ReservationDetail>> {
    validate(&req)?;
    validate_optional_text(&req.special_requests, "special_requests", MAX_NOTE_LEN)?;

    let current = reservation::get(&state.pool, id).await?;
    if !current_user.can_access(current.user_id) {
        return Err(forbidden());
    }
    let editable = if current_user.is_admin() {
        current.status.holds_table()
    } else {
        current.status == ReservationStatus::Pending
    };
    if !editable {
        return Err(AppError::new(ErrorCode::ReservationNotEditable));
    }

    let settings = setting::load(&state.pool).await?;
    let party_size = req.party_size.unwrap_or(current.party_size);
    ensure_party_size(party_size, &settings)?;

    let date = req.date.as_deref().unwrap_or(&current.reservation_date);
    let time = req.time.as_deref().unwrap_or(&current.reservation_time);
    let duration = req.duration_minutes.unwrap_or(current.duration_minutes);
    let window = BookingWindow::parse(date, time, duration, state.config.timezone)?;
    let rescheduled = window.slot.starts_at != current.starts_at
        || window.slot.ends_at != current.ends_at;
    if rescheduled {
        window.ensure_future(shared::util::now_millis())?;
        window.ensure_within_hours(&settings.opening_time, &settings.closing_time)?;
    }

    let table_id = req.table_id.unwrap_or(current.table_id);
    bookable_table(&state, table_id, party_size).await?;

    let detail = reservation::update(
        &state.pool,
        id,
        reservation::ReservationChanges {
            table_id,
            date: window.date_string(),
            time: window.time_string(),
            duration_minutes: duration,
            slot: window.slot,
            party_size,
            special_requests: req.special_requests.or(current.special_requests),
        },
    )
    .await?;

    tracing::info!(reservation_id = id, by = current_user.id, "Reservation updated");
    Ok(Json(detail))
}

/// PUT /api/reservations/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ReservationStatusUpdate>,
) -> AppResult<Json<Reservation>> {
    let current = reservation::get(&state.pool, id).await?;
    let updated = reservation::transition(&state.pool, id, current.status, req.status).await?;
    tracing::info!(
        reservation_id = id,
        from = current.status.as_str(),
        to = req.status.as_str(),
        by = current_user.id,
        "Reservation status changed"
    );
    Ok(Json(updated))
}

/// POST /api/reservations/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let current = reservation::get(&state.pool, id).await?;
    if !current_user.can_access(current.user_id) {
        return Err(forbidden());
    }
    let cancelled = reservation::transition(
        &state.pool,
        id,
        current.status,
        ReservationStatus::Cancelled,
    )
    .await?;
    tracing::info!(reservation_id = id, by = current_user.id, "Reservation cancelled");
    Ok(Json(cancelled))
}

/// DELETE /api/reservations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    reservation::delete(&state.pool, id).await?;
    tracing::info!(reservation_id = id, "Reservation deleted");
    Ok(ApiResponse::ok())
}
