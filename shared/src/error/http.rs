//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CartItemNotFound
            | Self::OrderNotFound
            | Self::ItemNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (OrderNumberConflict is retryable)
            Self::AlreadyExists | Self::OrderNumberConflict | Self::IllegalTransition => {
                StatusCode::CONFLICT
            }

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::AdminRequired => StatusCode::FORBIDDEN,

            // 422 Unprocessable (request is well-formed, state says no)
            Self::CartEmpty | Self::AddressMissing | Self::AmountMismatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 500 Internal Server Error
            Self::DatabaseError | Self::ExportFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::ValueOutOfRange
            | Self::InvalidItemRef
            | Self::InvalidDateRange => StatusCode::BAD_REQUEST,
        }
    }
}
