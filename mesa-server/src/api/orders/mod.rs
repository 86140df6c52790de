//! POS Order API (admin only)
//!
//! | Path | Method |
//! |------|--------|
//! | /api/orders | GET, POST |
//! | /api/orders/{id} | GET |
//! | /api/orders/{id}/items | POST |
//! | /api/orders/{id}/items/{item_id} | DELETE |
//! | /api/orders/{id}/pay | POST |
//! | /api/orders/{id}/cancel | POST |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/items/{item_id}", delete(handler::remove_item))
        .route("/{id}/pay", post(handler::pay))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_admin))
}
