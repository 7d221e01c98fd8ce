//! Inventory error taxonomy with HTTP status code mapping.
//!
//! [`InventoryError`] is the single error type of the service. Business
//! rejections, validation failures, and storage failures all travel as
//! typed variants up to the caller of
//! [`crate::service::BookingService::book`]; the API layer turns them into
//! a structured JSON body through [`IntoResponse`].

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PoolId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "reason": "seat_unavailable",
///     "message": "seat 2 is not available",
///     "details": { "seat_number": 2 }
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, machine-readable reason, and a
/// human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Stable machine-readable reason, e.g. `"insufficient_capacity"`.
    pub reason: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details for business rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Every way an inventory operation can fail.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                 |
/// |-----------|-------------------|-----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request             |
/// | 2000–2999 | Not Found         | 404 Not Found               |
/// | 3000–3999 | Server            | 500 Internal Server Error   |
/// | 4000–4999 | Business rule     | 409 Conflict                |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// Malformed input; the caller corrects it and resubmits.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pool with the given ID does not exist.
    #[error("pool not found: {0}")]
    NotFound(PoolId),

    /// More tickets requested than remain in a capacity pool.
    #[error("insufficient capacity: requested {requested}, remaining {remaining}")]
    InsufficientCapacity {
        /// Units requested.
        requested: u32,
        /// Units remaining at decision time.
        remaining: u32,
    },

    /// A requested seat is already booked.
    #[error("seat {0} is not available")]
    SeatUnavailable(u32),

    /// Durable write failed; nothing was committed.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::StorageFailure(_) => 3001,
            Self::InsufficientCapacity { .. } => 4001,
            Self::SeatUnavailable(_) => 4002,
        }
    }

    /// Returns the machine-readable reason code for this variant.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "pool_not_found",
            Self::InsufficientCapacity { .. } => "insufficient_capacity",
            Self::SeatUnavailable(_) => "seat_unavailable",
            Self::StorageFailure(_) => "storage_failure",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientCapacity { .. } | Self::SeatUnavailable(_) => StatusCode::CONFLICT,
            Self::StorageFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the response body. Server-side failures get a generic message
    /// so that database errors never reach the client.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let (message, details) = match self {
            Self::StorageFailure(_) => ("storage failure; booking was not committed".to_string(), None),
            Self::Internal(_) => ("internal error".to_string(), None),
            Self::InsufficientCapacity {
                requested,
                remaining,
            } => (
                self.to_string(),
                Some(serde_json::json!({ "requested": requested, "remaining": remaining })),
            ),
            Self::SeatUnavailable(seat_number) => (
                self.to_string(),
                Some(serde_json::json!({ "seat_number": seat_number })),
            ),
            Self::InvalidRequest(_) | Self::NotFound(_) => (self.to_string(), None),
        };
        ErrorBody {
            code: self.error_code(),
            reason: self.reason(),
            message,
            details,
        }
    }
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl From<JsonRejection> for InventoryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for InventoryError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for InventoryError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_body(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_map_to_conflict() {
        let err = InventoryError::SeatUnavailable(2);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.reason(), "seat_unavailable");

        let err = InventoryError::InsufficientCapacity {
            requested: 3,
            remaining: 1,
        };
        assert_eq!(err.error_code(), 4001);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_failure_body_hides_cause() {
        let err = InventoryError::StorageFailure("connection reset by peer".to_string());
        let body = err.to_body();
        assert_eq!(body.reason, "storage_failure");
        assert!(!body.message.contains("connection reset"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn seat_unavailable_body_names_the_seat() {
        let body = InventoryError::SeatUnavailable(7).to_body();
        assert_eq!(body.code, 4002);
        assert_eq!(
            body.details,
            Some(serde_json::json!({ "seat_number": 7 }))
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = InventoryError::NotFound(PoolId::new());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.reason(), "pool_not_found");
    }
}
