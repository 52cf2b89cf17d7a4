//! Booking entity and its status state machine.

mod state;

pub use state::BookingStatus;

use chrono::{DateTime, Duration, Utc};
use common::{BoatId, BookingId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// Minimum rental duration accepted by the marketplace, in hours.
pub const MIN_BOOKING_HOURS: i64 = 4;

/// One rental reservation of a boat for a time period.
///
/// Created by the booking orchestrator from validated input; only the
/// orchestrator (and the webhook processor, for payment-driven
/// confirmation) mutates its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    renter: UserId,
    boat: BoatId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: BookingStatus,
    total_price: Money,
}

impl Booking {
    /// Creates a new Pending booking, validating the basic invariants.
    ///
    /// Rejects inverted or empty periods, periods starting in the past,
    /// and negative prices. The 4-hour duration floor is a validation-step
    /// rule, not a constructor invariant; see [`Booking::has_min_duration`].
    pub fn new(
        renter: UserId,
        boat: BoatId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        total_price: Money,
    ) -> Result<Self, DomainError> {
        if start_time >= end_time {
            return Err(DomainError::InvalidPeriod);
        }
        if start_time < Utc::now() {
            return Err(DomainError::StartInPast);
        }
        if total_price.is_negative() {
            return Err(DomainError::NegativePrice);
        }

        Ok(Self {
            id: BookingId::new(),
            renter,
            boat,
            start_time,
            end_time,
            status: BookingStatus::Pending,
            total_price,
        })
    }

    /// Rehydrates a booking from persisted fields without re-validating.
    ///
    /// For store implementations only; rows written by [`Booking::new`]
    /// already satisfied the invariants when they were created.
    pub fn from_parts(
        id: BookingId,
        renter: UserId,
        boat: BoatId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: BookingStatus,
        total_price: Money,
    ) -> Self {
        Self {
            id,
            renter,
            boat,
            start_time,
            end_time,
            status,
            total_price,
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn renter(&self) -> UserId {
        self.renter
    }

    pub fn boat(&self) -> BoatId {
        self.boat
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Duration of the rental in whole hours, truncating any remainder.
    pub fn whole_hours(&self) -> i64 {
        (self.end_time - self.start_time).num_hours()
    }

    /// Returns true if the rental meets the 4-hour duration floor.
    pub fn has_min_duration(&self) -> bool {
        self.end_time - self.start_time >= Duration::hours(MIN_BOOKING_HOURS)
    }

    /// Interval-overlap test against another period on the same boat.
    ///
    /// Half-open semantics: touching endpoints do not overlap, so a
    /// booking ending at 14:00 never conflicts with one starting at 14:00.
    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.start_time < other_end && other_start < self.end_time
    }

    /// Transitions Pending -> Confirmed.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        if !self.status.can_confirm() {
            return Err(DomainError::InvalidBookingTransition {
                current: self.status,
                action: "confirm",
            });
        }
        self.status = BookingStatus::Confirmed;
        Ok(())
    }

    /// Transitions Pending -> Cancelled.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if !self.status.can_cancel() {
            return Err(DomainError::InvalidBookingTransition {
                current: self.status,
                action: "cancel",
            });
        }
        self.status = BookingStatus::Cancelled;
        Ok(())
    }

    /// Transitions Confirmed -> Finished.
    pub fn finish(&mut self) -> Result<(), DomainError> {
        if !self.status.can_finish() {
            return Err(DomainError::InvalidBookingTransition {
                current: self.status,
                action: "finish",
            });
        }
        self.status = BookingStatus::Finished;
        Ok(())
    }
}
