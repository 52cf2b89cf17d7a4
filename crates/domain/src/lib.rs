//! Domain layer for the boat-rental marketplace.
//!
//! This crate provides the three stateful entities of the booking core
//! and their invariants:
//! - Booking with its status state machine
//! - AvailabilityWindow with per-window hourly pricing
//! - Payment with its forward-only status lifecycle
//!
//! Plus the value objects they share: Money (integer cents), card data,
//! and the plain User/Boat lookup records.

pub mod availability;
pub mod booking;
pub mod error;
pub mod money;
pub mod party;
pub mod payment;

pub use availability::AvailabilityWindow;
pub use booking::{Booking, BookingStatus};
pub use error::DomainError;
pub use money::Money;
pub use party::{Boat, User};
pub use payment::{CardData, Payment, PaymentMethod, PaymentStatus};
