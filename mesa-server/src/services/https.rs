//! HTTP router assembly
//!
//! Layer order, outermost first: access log, request id, CORS, compression,
//! timeout, then `require_auth` in front of every route.

use std::time::{Duration, Instant};

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP access log
///
/// Reuses an incoming `x-request-id` or assigns a UUID, and echoes it back.
async fn log_request(
    mut request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    let method = request.method().clone();
    // path only: callback query strings carry the gateway key
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(
            target: "http_access",
            %method,
            %path,
            status = status.as_u16(),
            latency_ms,
            request_id = %request_id,
            "request failed"
        );
    } else {
        tracing::info!(
            target: "http_access",
            %method,
            %path,
            status = status.as_u16(),
            latency_ms,
            request_id = %request_id,
            "request"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Build the Axum router (state not yet bound)
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router(state))
        .merge(crate::api::users::router())
        .merge(crate::api::menu::router())
        .merge(crate::api::tables::router())
        .merge(crate::api::reservations::router())
        .merge(crate::api::payments::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::finance::router())
        .merge(crate::api::settings::router())
}

/// Full application: routes, auth and tower-http layers, bound to `state`
pub fn build_router(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::very_permissive()
    };

    build_app(&state)
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(log_request))
}
