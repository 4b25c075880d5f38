//! Shared types for the ordering core
//!
//! Domain models, the unified error system and small utilities used by
//! `order-server` and its API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
