//! Settings API Handlers

use std::collections::BTreeMap;

use axum::{Extension, Json, extract::State};
use serde_json::Value;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::setting;
use crate::utils::AppResult;
use shared::models::{PublicSettings, RestaurantSettings};

/// GET /api/settings/public
pub async fn get_public(State(state): State<ServerState>) -> AppResult<Json<PublicSettings>> {
    let settings = setting::load(&state.pool).await?;
    Ok(Json(settings.into()))
}

/// GET /api/settings
pub async fn get_all(State(state): State<ServerState>) -> AppResult<Json<RestaurantSettings>> {
    let settings = setting::load(&state.pool).await?;
    Ok(Json(settings))
}

/// PUT /api/settings - `{key: value, ...}`, all-or-nothing
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(values): Json<BTreeMap<String, Value>>,
) -> AppResult<Json<RestaurantSettings>> {
    let settings = setting::update(&state.pool, &values).await?;
    tracing::info!(by = current_user.id, count = values.len(), "Restaurant settings changed");
    Ok(Json(settings))
}
