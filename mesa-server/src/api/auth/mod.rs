//! Authentication Routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/register | POST | public, rate limited |
//! | /api/auth/login | POST | public, rate limited |
//! | /api/auth/logout | POST | public |
//! | /api/auth/me | GET, PUT | session |
//! | /api/auth/password | PUT | session |

mod handler;

use axum::{
    Router, middleware,
    routing::{post, put},
};

use crate::auth::{login_rate_limit, register_rate_limit};
use crate::core::ServerState;

/// The limiters read their thresholds from `state`, so this router needs it
/// up front
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/auth", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let register = Router::new()
        .route("/register", post(handler::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let login = Router::new()
        .route("/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let session = Router::new()
        .route("/logout", post(handler::logout))
        .route("/me", axum::routing::get(handler::me).put(handler::update_me))
        .route("/password", put(handler::change_password));

    register.merge(login).merge(session)
}
