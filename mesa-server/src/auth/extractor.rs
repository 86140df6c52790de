//! CurrentUser extractor

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::session::resolve_session;
use crate::core::ServerState;

/// Reuses the user inserted by [`crate::auth::require_auth`]; otherwise
/// resolves the session from the request headers.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = resolve_session(&parts.headers, state, &parts.uri).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// `Option<CurrentUser>` on public routes: a missing or unusable session is
/// an anonymous caller, not an error
impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<CurrentUser as FromRequestParts<ServerState>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}
