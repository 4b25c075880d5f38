//! Data models
//!
//! Shared between order-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod report;

// Re-exports
pub use cart::*;
pub use catalog::*;
pub use order::*;
pub use report::*;
