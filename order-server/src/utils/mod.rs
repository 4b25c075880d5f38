//! Utilities: logging, business time, audit stamping

pub mod logger;
pub mod stamping;
pub mod time;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use stamping::{Operation, Stamped, stamp};
