//! Error codes for the ordering core
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / permission errors
//! - 2xxx: Cart errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Address errors
//! - 8xxx: Report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so clients can switch on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Admin role required
    AdminRequired = 1102,

    // ==================== 2xxx: Cart ====================
    /// Cart has no lines
    CartEmpty = 2001,
    /// Cart line does not exist
    CartItemNotFound = 2002,
    /// Item reference must name exactly one of dish / combo
    InvalidItemRef = 2003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order number already taken, or the cart changed during submission
    OrderNumberConflict = 4002,
    /// Status transition not allowed by the state machine
    IllegalTransition = 4003,
    /// Client-side amount does not match the cart
    AmountMismatch = 4004,

    // ==================== 6xxx: Catalog ====================
    /// Dish or combo does not exist (or is disabled)
    ItemNotFound = 6001,

    // ==================== 7xxx: Address ====================
    /// Delivery address does not exist
    AddressMissing = 7001,

    // ==================== 8xxx: Report ====================
    /// Date range is reversed or too long
    InvalidDateRange = 8001,
    /// Report rendering failed
    ExportFailed = 8002,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether a caller may resubmit the same request unchanged
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::OrderNumberConflict)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",
            Self::AdminRequired => "Admin role required",

            Self::CartEmpty => "Shopping cart is empty",
            Self::CartItemNotFound => "Cart item not found",
            Self::InvalidItemRef => "Exactly one of dish_id or combo_id is required",

            Self::OrderNotFound => "Order not found",
            Self::OrderNumberConflict => "Order could not be placed, please retry",
            Self::IllegalTransition => "Order status does not allow this operation",
            Self::AmountMismatch => "Order amount does not match the cart",

            Self::ItemNotFound => "Item not found in catalog",

            Self::AddressMissing => "Delivery address not found",

            Self::InvalidDateRange => "Invalid date range",
            Self::ExportFailed => "Report export failed",

            Self::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown `u16` into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),
            8 => Ok(Self::ValueOutOfRange),

            1001 => Ok(Self::NotAuthenticated),
            1003 => Ok(Self::TokenExpired),
            1004 => Ok(Self::TokenInvalid),
            1102 => Ok(Self::AdminRequired),

            2001 => Ok(Self::CartEmpty),
            2002 => Ok(Self::CartItemNotFound),
            2003 => Ok(Self::InvalidItemRef),

            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::OrderNumberConflict),
            4003 => Ok(Self::IllegalTransition),
            4004 => Ok(Self::AmountMismatch),

            6001 => Ok(Self::ItemNotFound),

            7001 => Ok(Self::AddressMissing),

            8001 => Ok(Self::InvalidDateRange),
            8002 => Ok(Self::ExportFailed),

            9002 => Ok(Self::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
