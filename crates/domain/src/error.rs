//! Domain error types.

use thiserror::Error;

use crate::booking::BookingStatus;
use crate::payment::PaymentStatus;

/// Errors raised when a domain invariant would be violated.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The start of a period is not strictly before its end.
    #[error("Invalid period: start must be before end")]
    InvalidPeriod,

    /// The booking starts in the past.
    #[error("It is not possible to book in the past")]
    StartInPast,

    /// The booking price is negative.
    #[error("Price must be non-negative")]
    NegativePrice,

    /// An availability window was created with a non-positive rate.
    #[error("Invalid hourly rate: {cents} cents (must be greater than 0)")]
    InvalidRate { cents: i64 },

    /// A booking status transition that the state machine forbids.
    #[error("Invalid booking transition: cannot {action} from {current} state")]
    InvalidBookingTransition {
        current: BookingStatus,
        action: &'static str,
    },

    /// A payment status transition that would move backwards.
    #[error("Invalid payment transition: {from} -> {to}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Malformed card data.
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}
