//! User API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::types::PaginationParams;
use crate::utils::validation::{MAX_SEARCH_LEN, validate_not_blank};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, validate};
use shared::PaginatedResponse;
use shared::models::{User, UserDetail, UserListQuery, UserRole, UserUpdate};

/// GET /api/users - paginated list, filter by role and search term
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    if let Some(search) = &query.search
        && search.chars().count() > MAX_SEARCH_LEN
    {
        return Err(AppError::validation("search term is too long"));
    }
    let page = PaginationParams::from_query(query.page, query.page_size);
    let (users, total) = user::list(
        &state.pool,
        query.role,
        query.search.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(PaginatedResponse::new(users, total, page.page, page.page_size)))
}

/// GET /api/users/{id} - user with reservation count
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDetail>> {
    let found = user::get(&state.pool, id).await?;
    let reservation_count = user::reservation_count(&state.pool, id).await?;
    Ok(Json(UserDetail {
        user: found,
        reservation_count,
    }))
}

/// PUT /api/users/{id}
///
/// Admins cannot demote or disable their own account.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    validate(&payload)?;
    if let Some(name) = &payload.full_name {
        validate_not_blank(name, "full_name")?;
    }
    if id == current_user.id
        && (payload.role.is_some_and(|r| r != UserRole::Admin) || payload.is_active == Some(false))
    {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }

    let updated = user::update(&state.pool, id, payload).await?;
    tracing::info!(user_id = id, by = current_user.id, "User updated");
    Ok(Json(updated))
}

/// DELETE /api/users/{id} - soft delete (deactivate)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if id == current_user.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    user::deactivate(&state.pool, id).await?;
    security_log!("INFO", "user_deactivated", user_id = id, by = current_user.id);
    Ok(ApiResponse::ok())
}
