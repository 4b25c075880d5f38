//! JWT Extractor
//!
//! `CurrentUser` can be taken directly as a handler argument; it reuses the
//! value injected by [`require_auth`](super::require_auth) when present.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user = authenticate(state.jwt_service(), header, parts.uri.path())?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Validate an Authorization header value into a user
pub(crate) fn authenticate(
    jwt: &JwtService,
    header: Option<&str>,
    path: &str,
) -> Result<CurrentUser, AppError> {
    let Some(header) = header else {
        tracing::warn!(target: "security", path, "auth_missing");
        return Err(AppError::unauthorized());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::warn!(target: "security", path, error = %e, "auth_failed");
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))
}
