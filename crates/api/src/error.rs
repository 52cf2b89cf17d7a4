//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking::BookingError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed ids, bodies, headers).
    BadRequest(String),
    /// An error from the booking core.
    Booking(BookingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::Booking(err) => booking_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn booking_error_to_response(err: BookingError) -> (StatusCode, serde_json::Value) {
    let status = match &err {
        BookingError::UserNotFound(_)
        | BookingError::BoatNotFound(_)
        | BookingError::BookingNotFound(_)
        | BookingError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::Validation(_) => StatusCode::BAD_REQUEST,
        BookingError::Conflict { .. } => StatusCode::CONFLICT,
        BookingError::Payment { .. } => StatusCode::PAYMENT_REQUIRED,
        BookingError::Store(_) | BookingError::Internal(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    // A declined payment carries the gateway's human-readable message
    // for display.
    let body = match &err {
        BookingError::Payment { message } => serde_json::json!({
            "error": err.to_string(),
            "gateway_message": message,
        }),
        _ => serde_json::json!({ "error": err.to_string() }),
    };

    (status, body)
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}
