use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, UserId};
use domain::{AvailabilityWindow, Boat, Booking, Payment, User};

use crate::error::Result;

/// Persistence for boat availability windows.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Registers a new availability window for a boat.
    async fn add_window(&self, window: &AvailabilityWindow) -> Result<()>;

    /// Returns every window of `boat` that overlaps the given period,
    /// ordered by start time.
    async fn windows_overlapping(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>>;

    /// Returns the first window that fully contains the given period,
    /// if any. A period split across two adjacent windows does not count.
    async fn find_covering(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<AvailabilityWindow>> {
        let windows = self.windows_overlapping(boat, start, end).await?;
        Ok(windows.into_iter().find(|w| w.covers(start, end)))
    }
}

/// Persistence for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Inserts a new booking. Returns [`StoreError::Conflict`] when a
    /// non-cancelled booking for the same boat overlaps the period.
    ///
    /// [`StoreError::Conflict`]: crate::error::StoreError::Conflict
    async fn insert(&self, booking: &Booking) -> Result<()>;

    /// Persists the current state of an existing booking.
    async fn update(&self, booking: &Booking) -> Result<()>;

    /// Looks up a booking by id.
    async fn find(&self, id: BookingId) -> Result<Option<Booking>>;

    /// Returns every non-cancelled booking of `boat` whose period
    /// overlaps the given one.
    async fn find_conflicting(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// Returns all bookings made by a renter, newest first.
    async fn list_for_renter(&self, renter: UserId) -> Result<Vec<Booking>>;
}

/// Persistence for payment attempts.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a new payment record.
    async fn insert(&self, payment: &Payment) -> Result<()>;

    /// Persists the current state of an existing payment.
    async fn update(&self, payment: &Payment) -> Result<()>;

    /// Looks up a payment by id.
    async fn find(&self, id: common::PaymentId) -> Result<Option<Payment>>;

    /// Looks up a payment by its gateway transaction id.
    async fn find_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>>;

    /// Returns all payment attempts for a booking, oldest first.
    async fn list_for_booking(&self, booking: BookingId) -> Result<Vec<Payment>>;
}

/// Persistence for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn add(&self, user: &User) -> Result<()>;

    async fn find(&self, id: UserId) -> Result<Option<User>>;
}

/// Persistence for boats.
#[async_trait]
pub trait BoatStore: Send + Sync {
    async fn add(&self, boat: &Boat) -> Result<()>;

    async fn find(&self, id: BoatId) -> Result<Option<Boat>>;
}
