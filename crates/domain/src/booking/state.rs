//! Booking status state machine.

use serde::{Deserialize, Serialize};

/// The status of a booking in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► Finished
///    │
///    └──────► Cancelled
/// ```
///
/// There are no reverse transitions; Finished and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingStatus {
    /// Booking has been created but payment has not been confirmed.
    #[default]
    Pending,

    /// Payment approved; the reservation holds the period.
    Confirmed,

    /// The rental period ended (terminal state).
    Finished,

    /// The booking was cancelled before confirmation (terminal state).
    Cancelled,
}

impl BookingStatus {
    /// Returns true if the booking can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Returns true if the booking can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Returns true if the booking can be finished in this status.
    pub fn can_finish(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Finished | BookingStatus::Cancelled)
    }

    /// Returns true if this status still occupies the boat's calendar.
    ///
    /// Cancelled bookings never count for conflict detection.
    pub fn blocks_period(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Finished => "Finished",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Finished" => Ok(BookingStatus::Finished),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}
