//! POS Order API Handlers
//!
//! Line prices are snapshotted from the menu when added; totals include
//! IVA at the configured `tax_rate`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{dining_table, menu, order, reservation, setting};
use crate::money::MAX_TENDER;
use crate::utils::validation::{MAX_NOTE_LEN, validate_amount, validate_optional_text};
use crate::utils::{AppResult, validate};
use shared::models::{
    OrderCreate, OrderDetail, OrderItemInput, OrderItemsAdd, OrderListQuery, OrderPayRequest,
    OrderPayResponse, PosOrder,
};

/// Resolve requested lines against the menu (must exist and be available)
async fn order_lines(
    state: &ServerState,
    inputs: Vec<OrderItemInput>,
) -> AppResult<Vec<order::OrderLine>> {
    let mut lines = Vec::with_capacity(inputs.len());
    for input in inputs {
        let item = menu::get_orderable_item(&state.pool, input.menu_item_id).await?;
        lines.push(order::OrderLine {
            item,
            quantity: input.quantity,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
        });
    }
    Ok(lines)
}

/// POST /api/orders - open an order
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    validate(&req)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;

    if let Some(table_id) = req.table_id {
        dining_table::get(&state.pool, table_id).await?;
    }
    if let Some(reservation_id) = req.reservation_id {
        reservation::get(&state.pool, reservation_id).await?;
    }

    let settings = setting::load(&state.pool).await?;
    let lines = order_lines(&state, req.items).await?;
    let detail = order::create(
        &state.pool,
        order::NewOrder {
            table_id: req.table_id,
            reservation_id: req.reservation_id,
            created_by: current_user.id,
            notes: req.notes,
            lines,
        },
        settings.tax_rate,
    )
    .await?;

    tracing::info!(
        order_id = detail.order.id,
        table_id = ?detail.order.table_id,
        total = detail.order.total,
        "POS order opened"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/orders?status=&table_id=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<PosOrder>>> {
    let orders = order::list(&state.pool, query.status, query.table_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = order::get_detail(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/orders/{id}/items
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderItemsAdd>,
) -> AppResult<Json<OrderDetail>> {
    validate(&req)?;
    let settings = setting::load(&state.pool).await?;
    let lines = order_lines(&state, req.items).await?;
    let detail = order::add_items(&state.pool, id, lines, settings.tax_rate).await?;
    Ok(Json(detail))
}

/// DELETE /api/orders/{id}/items/{item_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<OrderDetail>> {
    let settings = setting::load(&state.pool).await?;
    let detail = order::remove_item(&state.pool, id, item_id, settings.tax_rate).await?;
    Ok(Json(detail))
}

/// POST /api/orders/{id}/pay - settle at the counter (card or cash)
pub async fn pay(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<OrderPayRequest>,
) -> AppResult<Json<OrderPayResponse>> {
    if let Some(tendered) = req.amount_tendered {
        validate_amount(tendered, "amount_tendered", MAX_TENDER)?;
    }
    let result = order::pay(
        &state.pool,
        id,
        req.method,
        req.amount_tendered,
        current_user.id,
    )
    .await?;
    tracing::info!(
        order_id = id,
        payment_id = result.payment.id,
        method = req.method.as_str(),
        total = result.order.total,
        change = result.change,
        "POS order paid"
    );
    Ok(Json(result))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PosOrder>> {
    let cancelled = order::cancel(&state.pool, id).await?;
    tracing::info!(order_id = id, "POS order cancelled");
    Ok(Json(cancelled))
}
