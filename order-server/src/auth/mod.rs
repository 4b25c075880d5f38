//! 认证授权模块
//!
//! - [`JwtService`] - token validation
//! - [`CurrentUser`] - request-scoped caller identity
//! - [`require_auth`] / [`require_admin`] - axum middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
