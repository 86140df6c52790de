//! Reservation API
//!
//! Customers manage their own bookings; admins see and manage all of them.
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/reservations | GET, POST | session |
//! | /api/reservations/{id} | GET, PUT | owner or admin |
//! | /api/reservations/{id} | DELETE | admin |
//! | /api/reservations/{id}/status | PUT | admin |
//! | /api/reservations/{id}/cancel | POST | owner or admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/cancel", post(handler::cancel));

    let admin_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(admin_routes)
}
