//! Payment API (EuPago Multibanco / MB WAY)
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/payments | GET | session (customers see their own) |
//! | /api/payments/multibanco | POST | owner or admin |
//! | /api/payments/mbway | POST | owner or admin |
//! | /api/payments/eupago/callback | GET | public, `chave_api` checked |
//! | /api/payments/{id} | GET | owner or admin |
//! | /api/payments/{id}/refresh | POST | owner or admin |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/multibanco", post(handler::create_multibanco))
        .route("/mbway", post(handler::create_mbway))
        .route("/eupago/callback", get(handler::eupago_callback))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/refresh", post(handler::refresh))
}
