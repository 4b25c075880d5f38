//! 认证中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use super::extractor::authenticate;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// Require a valid bearer token on every `/api/` route.
///
/// Injects [`CurrentUser`] into request extensions. `OPTIONS` (CORS
/// preflight) and non-API paths pass through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS || !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let user = authenticate(state.jwt_service(), header, req.uri().path())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Reject non-admin callers with 403. Must run after [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;

    if !user.is_admin() {
        tracing::warn!(
            target: "security",
            user_id = user.id,
            path = req.uri().path(),
            "admin_required"
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(req).await)
}
