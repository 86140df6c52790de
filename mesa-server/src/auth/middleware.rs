//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::session::resolve_session;
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a session
///
/// | Method | Path |
/// |--------|------|
/// | POST | /api/auth/register, /api/auth/login, /api/auth/logout |
/// | GET | /api/menu, /api/menu/categories[/..], /api/menu/items[/..] |
/// | GET | /api/tables/availability |
/// | GET | /api/payments/eupago/callback |
/// | GET | /api/settings/public |
pub fn is_public_route(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    if *method == Method::POST {
        return matches!(
            path,
            "/api/auth/register" | "/api/auth/login" | "/api/auth/logout"
        );
    }
    if *method == Method::GET {
        return path == "/api/menu"
            || path == "/api/menu/categories"
            || path.starts_with("/api/menu/categories/")
            || path == "/api/menu/items"
            || path.starts_with("/api/menu/items/")
            || path == "/api/tables/availability"
            || path == "/api/payments/eupago/callback"
            || path == "/api/settings/public";
    }
    false
}

/// Authentication middleware
///
/// Resolves the session from `Authorization: Bearer <token>` or the session
/// cookie, checks it against the account row and inserts [`CurrentUser`] into request extensions.
///
/// Skipped for `OPTIONS` (CORS preflight), non-`/api/` paths and
/// [`is_public_route`].
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let user = resolve_session(req.headers(), &state, req.uri()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Admin middleware - requires the admin role
///
/// Non-admins get 403 `AdminRequired`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            path = req.uri().path().to_string()
        );
        return Err(AppError::new(shared::ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/auth/register"));
        assert!(is_public_route(&Method::GET, "/api/menu"));
        assert!(is_public_route(&Method::GET, "/api/menu/items/12"));
        assert!(is_public_route(&Method::GET, "/api/tables/availability"));
        assert!(is_public_route(&Method::GET, "/api/payments/eupago/callback"));
        assert!(is_public_route(&Method::GET, "/api/settings/public"));
    }

    #[test]
    fn protected_routes() {
        assert!(!is_public_route(&Method::GET, "/api/auth/me"));
        assert!(!is_public_route(&Method::POST, "/api/menu/items"));
        assert!(!is_public_route(&Method::DELETE, "/api/menu/items/12"));
        assert!(!is_public_route(&Method::GET, "/api/tables"));
        assert!(!is_public_route(&Method::GET, "/api/reservations"));
        assert!(!is_public_route(&Method::GET, "/api/settings"));
        assert!(!is_public_route(&Method::GET, "/api/menu-admin"));
    }
}
