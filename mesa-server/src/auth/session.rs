//! Session cookie handling
//!
//! The session is the JWT itself, stored in an HttpOnly cookie. API clients
//! may send the same token as `Authorization: Bearer`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::HeaderMap;

use crate::AppError;
use crate::auth::{Claims, CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::ErrorCode;

/// Session cookie name
pub const SESSION_COOKIE: &str = "mesa_session";

/// Build the session cookie for a freshly issued token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that removes the session on the client
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Find the session token: Bearer header first, then the cookie
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    if let Some(value) = headers.get(http::header::AUTHORIZATION) {
        let header = value
            .to_str()
            .map_err(|_| AppError::invalid_token("Invalid authorization header"))?;
        let token = JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;
        return Ok(Some(token.to_string()));
    }

    Ok(CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

/// Decode and verify the session token
///
/// | Situation | Error |
/// |-----------|-------|
/// | no token | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | bad signature / malformed | 401 TokenInvalid |
pub fn decode_session(
    headers: &HeaderMap,
    jwt: &JwtService,
    uri: &http::Uri,
) -> Result<Claims, AppError> {
    let Some(token) = token_from_headers(headers)? else {
        security_log!("WARN", "auth_missing", uri = uri.to_string());
        return Err(AppError::not_authenticated());
    };

    jwt.validate_token(&token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = e.to_string(),
            uri = uri.to_string()
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// Resolve the caller: a valid token whose account is still active and whose
/// epoch matches the `users` row
///
/// Role and username come from the row, so role changes apply immediately.
///
/// | Situation | Error |
/// |-----------|-------|
/// | token problems | see [`decode_session`] |
/// | account gone | 401 TokenInvalid |
/// | account deactivated | 401 AccountDisabled |
/// | logged out / revoked | 401 TokenInvalid |
pub async fn resolve_session(
    headers: &HeaderMap,
    state: &ServerState,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let claims = decode_session(headers, &state.jwt_service, uri)?;
    let epoch = claims.epoch;
    let claimed = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed session claims: {e}")))?;

    let Some(account) = user::find_by_id(&state.pool, claimed.id).await? else {
        security_log!("WARN", "session_unknown_user", user_id = claimed.id);
        return Err(AppError::invalid_token("Session user no longer exists"));
    };
    if !account.is_active {
        security_log!("WARN", "session_disabled", user_id = account.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if account.session_epoch != epoch {
        security_log!("WARN", "session_revoked", user_id = account.id);
        return Err(AppError::invalid_token("Session has been revoked"));
    }

    Ok(CurrentUser {
        id: account.id,
        username: account.username,
        role: account.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("mesa_session=from-cookie"),
        );
        assert_eq!(
            token_from_headers(&headers).unwrap().as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; mesa_session=abc.def.ghi"),
        );
        assert_eq!(
            token_from_headers(&headers).unwrap().as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn malformed_authorization_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Token x"));
        assert!(token_from_headers(&headers).is_err());
        assert_eq!(token_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("t".into(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
