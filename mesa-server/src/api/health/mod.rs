//! Health check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "database": "ok", "uptime_seconds": 42 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::DbService;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// ok | error
    database: &'static str,
    uptime_seconds: u64,
}

/// GET /health - liveness plus a database probe
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let db = DbService {
        pool: state.pool.clone(),
    };
    let database_ok = db.ping().await;
    if !database_ok {
        tracing::warn!("Health check: database unreachable");
    }

    Json(HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_ok { "ok" } else { "error" },
        uptime_seconds: state.uptime_seconds(),
    })
}
