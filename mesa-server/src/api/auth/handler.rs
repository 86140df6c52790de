//! Authentication Handlers
//!
//! Login, registration and the caller's own account.

use std::time::Duration;

use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;

use crate::auth::session::token_from_headers;
use crate::auth::{
    CurrentUser, hash_password, removal_cookie, session_cookie, verify_dummy_password,
    verify_password,
};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::validate_not_blank;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, validate};
use shared::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, User,
    UserRole,
};

/// Issue a token for `user` and attach the session cookie
fn start_session(
    state: &ServerState,
    jar: CookieJar,
    user: User,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let issued = state
        .jwt_service
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to issue session: {e}")))?;

    let jar = jar.add(session_cookie(
        issued.token.clone(),
        state.config.cookie_secure,
    ));
    Ok((
        jar,
        Json(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }),
    ))
}

/// POST /api/auth/register - create a customer account and log it in
pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    validate(&req)?;
    validate_not_blank(&req.full_name, "full_name")?;

    let password_hash = hash_password(&req.password)?;
    let created = user::create(
        &state.pool,
        user::NewUser {
            username: req.username.trim(),
            email: &req.email,
            password_hash: &password_hash,
            full_name: req.full_name.trim(),
            phone: req.phone.as_deref(),
            role: UserRole::Customer,
        },
    )
    .await?;

    security_log!("INFO", "register", user_id = created.id, username = created.username.as_str());
    let (jar, body) = start_session(&state, jar, created)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// POST /api/auth/login - username or email + password
///
/// Every answer waits the configured delay; unknown user and wrong
/// password are indistinguishable.
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    validate(&req)?;
    let login = req.login.trim();
    let found = user::find_by_login(&state.pool, login).await?;

    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    let verified = match &found {
        Some(u) => verify_password(&req.password, &u.password_hash),
        None => verify_dummy_password(&req.password),
    };
    let account = match found {
        Some(u) if verified => u,
        _ => {
            security_log!("WARN", "login_failed", login = login);
            return Err(AppError::invalid_credentials());
        }
    };
    if !account.is_active {
        security_log!("WARN", "login_disabled", user_id = account.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    security_log!("INFO", "login", user_id = account.id, username = account.username.as_str());
    start_session(&state, jar, account)
}

/// POST /api/auth/logout - revoke the presented session and clear the cookie
///
/// Anonymous or already invalid sessions just get the cookie cleared.
pub async fn logout(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<()>)> {
    let claims = token_from_headers(&headers)
        .ok()
        .flatten()
        .and_then(|token| state.jwt_service.validate_token(&token).ok());
    if let Some(user_id) = claims.and_then(|c| c.sub.parse::<i64>().ok()) {
        user::revoke_sessions(&state.pool, user_id).await?;
        security_log!("INFO", "logout", user_id = user_id);
    }
    Ok((jar.remove(removal_cookie()), ApiResponse::ok()))
}

/// GET /api/auth/me - own profile, fresh from the database
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let account = user::get(&state.pool, current_user.id).await?;
    Ok(Json(account))
}

/// PUT /api/auth/me - update own name, email or phone
pub async fn update_me(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    validate(&req)?;
    if let Some(name) = &req.full_name {
        validate_not_blank(name, "full_name")?;
    }
    let updated = user::update_profile(&state.pool, current_user.id, req).await?;
    Ok(Json(updated))
}

/// PUT /api/auth/password - change own password
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    validate(&req)?;
    let account = user::get(&state.pool, current_user.id).await?;
    if !verify_password(&req.current_password, &account.password_hash) {
        security_log!("WARN", "password_change_rejected", user_id = account.id);
        return Err(AppError::invalid_credentials());
    }

    let password_hash = hash_password(&req.new_password)?;
    user::update_password(&state.pool, account.id, &password_hash).await?;
    security_log!("INFO", "password_changed", user_id = account.id);
    Ok(ApiResponse::ok())
}
