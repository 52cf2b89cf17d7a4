//! Availability windows with per-window hourly pricing.

use chrono::{DateTime, Utc};
use common::BoatId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::money::Money;

/// A published time range during which a boat may be booked, with the
/// hourly rate that applies inside it.
///
/// Windows are created by owner management flows and are read-only from
/// the booking core's perspective. Windows for the same boat are allowed
/// to overlap each other; when several cover a requested period the first
/// containing window in store order wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    id: Uuid,
    boat: BoatId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    price_per_hour: Money,
}

impl AvailabilityWindow {
    /// Creates a new availability window.
    ///
    /// Rejects inverted periods and non-positive hourly rates.
    pub fn new(
        boat: BoatId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price_per_hour: Money,
    ) -> Result<Self, DomainError> {
        if start_time >= end_time {
            return Err(DomainError::InvalidPeriod);
        }
        if !price_per_hour.is_positive() {
            return Err(DomainError::InvalidRate {
                cents: price_per_hour.cents(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            boat,
            start_time,
            end_time,
            price_per_hour,
        })
    }

    /// Rehydrates a window from persisted fields. For store implementations.
    pub fn from_parts(
        id: Uuid,
        boat: BoatId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price_per_hour: Money,
    ) -> Self {
        Self {
            id,
            boat,
            start_time,
            end_time,
            price_per_hour,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
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

    pub fn price_per_hour(&self) -> Money {
        self.price_per_hour
    }

    /// Returns true if the window fully contains `[start, end]`.
    ///
    /// Boundary equality counts as contained: a booking starting exactly
    /// at the window's start or ending exactly at its end is legal.
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time <= start && end <= self.end_time
    }

    /// Returns true if the window intersects `[start, end)` at all.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }
}
