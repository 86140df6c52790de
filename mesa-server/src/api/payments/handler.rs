//! Payment API Handlers
//!
//! Starting a payment writes a `pending` row first, then asks EuPago for a
//! reference. A gateway failure leaves the row `failed` with its reason.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, payment, reservation, setting};
use crate::eupago::{CallbackParams, GatewayError, ReferenceState};
use crate::security_log;
use crate::utils::validation::normalize_mbway_phone;
use crate::utils::{AppError, AppResult, ErrorCode, validate};
use shared::models::{
    MbwayPaymentRequest, MultibancoPaymentRequest, Payment, PaymentListQuery, PaymentMethod,
    PaymentProvider, PaymentStatus, Reservation, ReservationPaymentStatus, ReservationStatus,
};

fn ensure_payment_access(current_user: &CurrentUser, payment: &Payment) -> AppResult<()> {
    if current_user.is_admin() || payment.user_id == Some(current_user.id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only access your own payments"))
    }
}

/// Checks shared by both online rails, then the `pending` payment row
async fn open_payment(
    state: &ServerState,
    current_user: &CurrentUser,
    reservation_id: i64,
    method: PaymentMethod,
    phone: Option<String>,
) -> AppResult<(Reservation, Payment)> {
    let settings = setting::load(&state.pool).await?;
    if !settings.online_payments_enabled {
        return Err(AppError::new(ErrorCode::PaymentsDisabled));
    }

    let booking = reservation::get(&state.pool, reservation_id).await?;
    if !current_user.can_access(booking.user_id) {
        return Err(AppError::forbidden("You can only pay your own reservations"));
    }
    if booking.status == ReservationStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Cancelled reservations cannot be paid",
        ));
    }
    if booking.payment_status == ReservationPaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::PaymentAlreadyPaid));
    }
    if booking.total_amount <= 0.0 {
        return Err(AppError::new(ErrorCode::NothingToPay));
    }

    let mut tx = state.pool.begin().await.map_err(RepoError::from)?;
    let pending = payment::create(
        &mut tx,
        payment::NewPayment {
            reservation_id: Some(booking.id),
            order_id: None,
            user_id: Some(booking.user_id),
            amount: booking.total_amount,
            method,
            provider: PaymentProvider::Eupago,
            status: PaymentStatus::Pending,
            phone,
        },
    )
    .await?;
    reservation::set_payment_status(&mut tx, booking.id, ReservationPaymentStatus::Pending)
        .await?;
    tx.commit().await.map_err(RepoError::from)?;

    Ok((booking, pending))
}

/// Record a gateway failure, then surface it as 502
async fn gateway_failed(state: &ServerState, payment_id: i64, err: GatewayError) -> AppError {
    if let Err(e) = payment::mark_failed(&state.pool, payment_id, &err.to_string()).await {
        tracing::error!(payment_id, error = %e, "Failed to record gateway failure");
    }
    err.into()
}

/// POST /api/payments/multibanco - create a Multibanco reference
pub async fn create_multibanco(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<MultibancoPaymentRequest>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let (booking, pending) = open_payment(
        &state,
        &current_user,
        req.reservation_id,
        PaymentMethod::Multibanco,
        None,
    )
    .await?;

    let reference = match state
        .gateway
        .create_multibanco(&pending.id.to_string(), pending.amount)
        .await
    {
        Ok(r) => r,
        Err(e) => return Err(gateway_failed(&state, pending.id, e).await),
    };

    let stored = payment::set_gateway_reference(
        &state.pool,
        pending.id,
        &reference.reference,
        Some(&reference.entity),
    )
    .await?;
    tracing::info!(
        payment_id = stored.id,
        reservation_id = booking.id,
        amount = stored.amount,
        entity = %reference.entity,
        "Multibanco reference created"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /api/payments/mbway - push an MB WAY request to the customer's phone
pub async fn create_mbway(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<MbwayPaymentRequest>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    validate(&req)?;
    let alias = normalize_mbway_phone(&req.phone)?;

    let (booking, pending) = open_payment(
        &state,
        &current_user,
        req.reservation_id,
        PaymentMethod::Mbway,
        Some(alias.clone()),
    )
    .await?;

    let description = format!(
        "Reservation {} {}",
        booking.reservation_date, booking.reservation_time
    );
    let request = match state
        .gateway
        .create_mbway(&pending.id.to_string(), pending.amount, &alias, &description)
        .await
    {
        Ok(r) => r,
        Err(e) => return Err(gateway_failed(&state, pending.id, e).await),
    };

    let stored =
        payment::set_gateway_reference(&state.pool, pending.id, &request.reference, None).await?;
    tracing::info!(
        payment_id = stored.id,
        reservation_id = booking.id,
        amount = stored.amount,
        "MB WAY request sent"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Acknowledgement sent back to EuPago
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackAck {
    pub payment_id: i64,
    pub status: PaymentStatus,
    /// `false` when the payment had already been settled
    pub updated: bool,
}

/// GET /api/payments/eupago/callback - payment confirmation from EuPago
///
/// Idempotent: repeating a confirmation leaves everything as it is.
pub async fn eupago_callback(
    State(state): State<ServerState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<CallbackAck>> {
    if !params.key_matches(state.gateway.api_key()) {
        security_log!(
            "WARN",
            "payment_callback_rejected",
            reference = params.referencia.clone().unwrap_or_default()
        );
        return Err(AppError::new(ErrorCode::PaymentCallbackUnauthorized));
    }

    let mut found = None;
    if let Some(id) = params.payment_id() {
        let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
        found = payment::find_by_id(&mut conn, id).await?;
    }
    if found.is_none()
        && let Some(reference) = params.referencia.as_deref()
    {
        found = payment::find_by_reference(
            &state.pool,
            reference.trim(),
            params.entidade.as_deref().map(str::trim),
        )
        .await?;
    }
    let Some(target) = found else {
        tracing::warn!(
            identificador = ?params.identificador,
            referencia = ?params.referencia,
            "Callback for unknown payment"
        );
        return Err(AppError::new(ErrorCode::PaymentNotFound));
    };

    match params.amount() {
        Some(amount) if crate::money::amounts_match(amount, target.amount) => {}
        other => {
            tracing::warn!(
                payment_id = target.id,
                expected = target.amount,
                received = ?other,
                "Callback amount mismatch"
            );
            return Err(AppError::new(ErrorCode::PaymentAmountMismatch));
        }
    }

    let (settled, updated) =
        payment::settle(&state.pool, target.id, params.transacao.as_deref()).await?;
    if updated {
        tracing::info!(
            payment_id = settled.id,
            reservation_id = ?settled.reservation_id,
            amount = settled.amount,
            channel = ?params.canal,
            "Payment confirmed by EuPago"
        );
    } else {
        tracing::debug!(payment_id = settled.id, "Duplicate EuPago callback ignored");
    }

    Ok(Json(CallbackAck {
        payment_id: settled.id,
        status: settled.status,
        updated,
    }))
}

/// GET /api/payments?status=&method=&reservation_id=
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<PaymentListQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    let filter = payment::PaymentFilter {
        status: query.status,
        method: query.method,
        reservation_id: query.reservation_id,
        user_id: (!current_user.is_admin()).then_some(current_user.id),
    };
    let payments = payment::list(&state.pool, &filter).await?;
    Ok(Json(payments))
}

/// GET /api/payments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Payment>> {
    let found = payment::get(&state.pool, id).await?;
    ensure_payment_access(&current_user, &found)?;
    Ok(Json(found))
}

/// POST /api/payments/{id}/refresh - poll EuPago for a Multibanco reference
pub async fn refresh(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Payment>> {
    let found = payment::get(&state.pool, id).await?;
    ensure_payment_access(&current_user, &found)?;

    if found.method != PaymentMethod::Multibanco {
        return Err(AppError::with_message(
            ErrorCode::PaymentInvalidMethod,
            "Only Multibanco payments can be refreshed",
        ));
    }
    if found.status == PaymentStatus::Paid {
        return Ok(Json(found));
    }
    let (Some(reference), Some(entity)) = (
        found.provider_reference.as_deref(),
        found.entity.as_deref(),
    ) else {
        return Err(AppError::with_message(
            ErrorCode::PaymentFailed,
            "Payment has no Multibanco reference",
        ));
    };

    let gateway_state = state.gateway.multibanco_status(reference, entity).await?;
    tracing::debug!(payment_id = id, state = ?gateway_state, "Multibanco status");
    if gateway_state == ReferenceState::Paid {
        let (settled, _) = payment::settle(&state.pool, id, None).await?;
        tracing::info!(payment_id = id, "Payment settled on refresh");
        return Ok(Json(settled));
    }
    Ok(Json(found))
}
