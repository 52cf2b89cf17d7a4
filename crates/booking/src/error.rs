use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, UserId};
use store::StoreError;
use thiserror::Error;

/// Errors returned by the booking orchestrators.
///
/// Every failure the core can produce is one of these kinds; nothing
/// else crosses the orchestrator boundary. The HTTP layer maps each
/// variant to a status code.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Boat not found: {0}")]
    BoatNotFound(BoatId),

    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("Unknown transaction: {0}")]
    TransactionNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Boat {boat} already has a booking from {start} to {end}")]
    Conflict {
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Payment failed: {message}")]
    Payment { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn payment(message: impl Into<String>) -> Self {
        Self::Payment {
            message: message.into(),
        }
    }
}

impl From<domain::DomainError> for BookingError {
    fn from(err: domain::DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}
