//! Restaurant Settings API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/settings/public | GET | public |
//! | /api/settings | GET, PUT | admin |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/api/settings", get(handler::get_all).put(handler::update))
        .layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/settings/public", get(handler::get_public))
        .merge(admin_routes)
}
