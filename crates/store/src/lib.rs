//! Persistence layer for the booking core.
//!
//! Defines the store traits consumed by the orchestrators and two
//! interchangeable implementations: an in-memory one for tests and the
//! single-process default, and a PostgreSQL one backed by sqlx.
//!
//! The PostgreSQL bookings table carries an exclusion constraint over
//! `(boat_id, tstzrange(start_time, end_time))` for non-cancelled rows,
//! so a double-booking that slips past validation is still rejected at
//! commit time and surfaces as [`StoreError::Conflict`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryAvailabilityStore, InMemoryBoatStore, InMemoryBookingStore, InMemoryPaymentStore,
    InMemoryUserStore,
};
pub use postgres::PostgresStore;
pub use store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, UserStore};
