//! Menu API
//!
//! Reads are public; writes need an admin.
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/menu | GET | public |
//! | /api/menu/categories | GET / POST | public / admin |
//! | /api/menu/categories/{id} | GET / PUT, DELETE | public / admin |
//! | /api/menu/items | GET / POST | public / admin |
//! | /api/menu/items/{id} | GET / PUT, DELETE | public / admin |
//! | /api/menu/items/{id}/availability | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::public_menu))
        .route("/categories", get(handler::list_categories))
        .route("/categories/{id}", get(handler::get_category))
        .route("/items", get(handler::list_items))
        .route("/items/{id}", get(handler::get_item));

    let manage_routes = Router::new()
        .route("/categories", post(handler::create_category))
        .route(
            "/categories/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .route("/items", post(handler::create_item))
        .route(
            "/items/{id}",
            put(handler::update_item).delete(handler::delete_item),
        )
        .route("/items/{id}/availability", put(handler::set_availability))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
