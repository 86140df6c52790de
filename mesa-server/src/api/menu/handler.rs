//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::menu;
use crate::utils::validation::{validate_not_blank, validate_price};
use crate::utils::{ApiResponse, AppResult, validate};
use shared::models::{
    AvailabilityUpdate, DeleteOutcome, MenuCategory, MenuCategoryCreate, MenuCategoryUpdate,
    MenuItem, MenuItemCreate, MenuItemQuery, MenuItemUpdate, MenuSection,
};

/// GET /api/menu - active categories with their available items
pub async fn public_menu(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuSection>>> {
    let sections = menu::public_menu(&state.pool).await?;
    Ok(Json(sections))
}

// ==================== Categories ====================

/// GET /api/menu/categories - admins also see inactive categories
pub async fn list_categories(
    State(state): State<ServerState>,
    current_user: Option<CurrentUser>,
) -> AppResult<Json<Vec<MenuCategory>>> {
    let active_only = !current_user.is_some_and(|u| u.is_admin());
    let categories = menu::list_categories(&state.pool, active_only).await?;
    Ok(Json(categories))
}

/// GET /api/menu/categories/{id}
pub async fn get_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuCategory>> {
    let category = menu::get_category(&state.pool, id).await?;
    Ok(Json(category))
}

/// POST /api/menu/categories
pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<MenuCategoryCreate>,
) -> AppResult<(StatusCode, Json<MenuCategory>)> {
    validate(&payload)?;
    validate_not_blank(&payload.name, "name")?;
    let category = menu::create_category(&state.pool, payload).await?;
    tracing::info!(category_id = category.id, name = %category.name, "Menu category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/menu/categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuCategoryUpdate>,
) -> AppResult<Json<MenuCategory>> {
    validate(&payload)?;
    if let Some(name) = &payload.name {
        validate_not_blank(name, "name")?;
    }
    let category = menu::update_category(&state.pool, id, payload).await?;
    Ok(Json(category))
}

/// DELETE /api/menu/categories/{id} - refused while items remain
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    menu::delete_category(&state.pool, id).await?;
    tracing::info!(category_id = id, "Menu category deleted");
    Ok(ApiResponse::ok())
}

// ==================== Items ====================

/// GET /api/menu/items?category_id=&available=
pub async fn list_items(
    State(state): State<ServerState>,
    Query(query): Query<MenuItemQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu::list_items(&state.pool, query.category_id, query.available).await?;
    Ok(Json(items))
}

/// GET /api/menu/items/{id}
pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu::get_item(&state.pool, id).await?;
    Ok(Json(item))
}

/// POST /api/menu/items
pub async fn create_item(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    validate(&payload)?;
    validate_not_blank(&payload.name, "name")?;
    validate_price(payload.price)?;
    let item = menu::create_item(&state.pool, payload).await?;
    tracing::info!(item_id = item.id, name = %item.name, price = item.price, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu/items/{id}
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    validate(&payload)?;
    if let Some(name) = &payload.name {
        validate_not_blank(name, "name")?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    let item = menu::update_item(&state.pool, id, payload).await?;
    Ok(Json(item))
}

/// PUT /api/menu/items/{id}/availability
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityUpdate>,
) -> AppResult<Json<MenuItem>> {
    let item = menu::set_availability(&state.pool, id, payload.is_available).await?;
    Ok(Json(item))
}

/// DELETE /api/menu/items/{id} - archived instead when still referenced
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = menu::delete_item(&state.pool, id).await?;
    tracing::info!(item_id = id, archived = outcome.archived, "Menu item removed");
    Ok(Json(outcome))
}
