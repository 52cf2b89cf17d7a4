use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, PaymentId, UserId};
use domain::{AvailabilityWindow, Boat, Booking, Payment, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, UserStore},
};

/// In-memory availability store for testing.
#[derive(Clone, Default)]
pub struct InMemoryAvailabilityStore {
    windows: Arc<RwLock<HashMap<Uuid, AvailabilityWindow>>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of windows stored.
    pub async fn window_count(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn add_window(&self, window: &AvailabilityWindow) -> Result<()> {
        let mut windows = self.windows.write().await;
        windows.insert(window.id(), window.clone());
        Ok(())
    }

    async fn windows_overlapping(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>> {
        let windows = self.windows.read().await;
        let mut matching: Vec<_> = windows
            .values()
            .filter(|w| w.boat() == boat && w.overlaps(start, end))
            .cloned()
            .collect();
        matching.sort_by_key(|w| w.start_time());
        Ok(matching)
    }
}

/// In-memory booking store for testing.
///
/// Inserts enforce the same rule as the database exclusion constraint:
/// a non-cancelled booking may not overlap another non-cancelled
/// booking of the same boat.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
    fail_on_insert: Arc<RwLock<bool>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bookings stored.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Makes the next inserts fail with a database error.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        if *self.fail_on_insert.read().await {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        let mut bookings = self.bookings.write().await;

        // Exclusion constraint simulation
        let conflict = bookings.values().any(|b| {
            b.boat() == booking.boat()
                && b.status().blocks_period()
                && booking.status().blocks_period()
                && b.overlaps(booking.start_time(), booking.end_time())
        });
        if conflict {
            return Err(StoreError::Conflict {
                boat: booking.boat(),
            });
        }

        bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id()) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn find(&self, id: BookingId) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn find_conflicting(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut matching: Vec<_> = bookings
            .values()
            .filter(|b| b.boat() == boat && b.status().blocks_period() && b.overlaps(start, end))
            .cloned()
            .collect();
        matching.sort_by_key(|b| b.start_time());
        Ok(matching)
    }

    async fn list_for_renter(&self, renter: UserId) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut matching: Vec<_> = bookings
            .values()
            .filter(|b| b.renter() == renter)
            .cloned()
            .collect();
        matching.sort_by_key(|b| std::cmp::Reverse(b.start_time()));
        Ok(matching)
    }
}

/// In-memory payment store for testing.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
    fail_on_insert: Arc<RwLock<bool>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Makes the next inserts fail with a database error.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: &Payment) -> Result<()> {
        if *self.fail_on_insert.read().await {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut payments = self.payments.write().await;
        payments.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        if !payments.contains_key(&payment.id()) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        payments.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.transaction_id() == Some(transaction_id))
            .cloned())
    }

    async fn list_for_booking(&self, booking: BookingId) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        let mut matching: Vec<_> = payments
            .values()
            .filter(|p| p.booking() == booking)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at());
        Ok(matching)
    }
}

/// In-memory user store for testing.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn add(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

/// In-memory boat store for testing.
#[derive(Clone, Default)]
pub struct InMemoryBoatStore {
    boats: Arc<RwLock<HashMap<BoatId, Boat>>>,
}

impl InMemoryBoatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoatStore for InMemoryBoatStore {
    async fn add(&self, boat: &Boat) -> Result<()> {
        let mut boats = self.boats.write().await;
        boats.insert(boat.id, boat.clone());
        Ok(())
    }

    async fn find(&self, id: BoatId) -> Result<Option<Boat>> {
        let boats = self.boats.read().await;
        Ok(boats.get(&id).cloned())
    }
}
