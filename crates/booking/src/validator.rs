//! Availability validation for booking candidates.

use chrono::{DateTime, Duration, Utc};
use common::BoatId;
use domain::{AvailabilityWindow, booking::MIN_BOOKING_HOURS};
use store::{AvailabilityStore, BookingStore};

use crate::error::BookingError;

/// Validates a candidate period against a boat's availability windows
/// and its existing bookings.
///
/// Checks run fail-fast in a fixed order: period sanity, duration
/// floor, window containment, conflict detection. On success the
/// covering window is returned so pricing does not re-query.
pub struct AvailabilityValidator<A, B>
where
    A: AvailabilityStore,
    B: BookingStore,
{
    availability: A,
    bookings: B,
}

impl<A, B> AvailabilityValidator<A, B>
where
    A: AvailabilityStore,
    B: BookingStore,
{
    pub fn new(availability: A, bookings: B) -> Self {
        Self {
            availability,
            bookings,
        }
    }

    /// Validates the candidate period, returning the single window
    /// that fully contains it.
    pub async fn validate(
        &self,
        boat: BoatId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AvailabilityWindow, BookingError> {
        if start >= end {
            return Err(BookingError::validation(
                "Invalid period: start must be before end",
            ));
        }
        if start < Utc::now() {
            return Err(BookingError::validation(
                "It is not possible to book in the past",
            ));
        }
        if end - start < Duration::hours(MIN_BOOKING_HOURS) {
            return Err(BookingError::validation(format!(
                "Booking must be at least {MIN_BOOKING_HOURS} hours"
            )));
        }

        let windows = self.availability.windows_overlapping(boat, start, end).await?;
        if windows.is_empty() {
            return Err(BookingError::validation(
                "Boat is not available for the selected dates",
            ));
        }

        // A single window must contain the whole period. Partial
        // coverage across adjacent windows does not count.
        let window = windows
            .into_iter()
            .find(|w| w.covers(start, end))
            .ok_or_else(|| {
                BookingError::validation("Booking period doesn't match boat availability")
            })?;

        let conflicting = self.bookings.find_conflicting(boat, start, end).await?;
        if let Some(existing) = conflicting.first() {
            return Err(BookingError::Conflict {
                boat,
                start: existing.start_time(),
                end: existing.end_time(),
            });
        }

        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use common::UserId;
    use domain::{Booking, Money};
    use store::{InMemoryAvailabilityStore, InMemoryBookingStore};

    use super::*;

    fn validator() -> (
        AvailabilityValidator<InMemoryAvailabilityStore, InMemoryBookingStore>,
        InMemoryAvailabilityStore,
        InMemoryBookingStore,
    ) {
        let availability = InMemoryAvailabilityStore::new();
        let bookings = InMemoryBookingStore::new();
        (
            AvailabilityValidator::new(availability.clone(), bookings.clone()),
            availability,
            bookings,
        )
    }

    async fn seed_window(availability: &InMemoryAvailabilityStore, boat: BoatId) {
        let now = Utc::now();
        let window = AvailabilityWindow::new(
            boat,
            now + Duration::days(1),
            now + Duration::days(30),
            Money::from_units(250),
        )
        .unwrap();
        availability.add_window(&window).await.unwrap();
    }

    #[tokio::test]
    async fn accepts_period_inside_window() {
        let (validator, availability, _) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let result = validator
            .validate(boat, now + Duration::days(2), now + Duration::days(2) + Duration::hours(4))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_too_short_period() {
        let (validator, availability, _) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let result = validator
            .validate(boat, now + Duration::days(2), now + Duration::days(2) + Duration::hours(3))
            .await;
        assert!(
            matches!(result, Err(BookingError::Validation(ref m)) if m == "Booking must be at least 4 hours")
        );
    }

    #[tokio::test]
    async fn rejects_past_start() {
        let (validator, availability, _) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let result = validator
            .validate(boat, now - Duration::hours(2), now + Duration::hours(4))
            .await;
        assert!(
            matches!(result, Err(BookingError::Validation(ref m)) if m == "It is not possible to book in the past")
        );
    }

    #[tokio::test]
    async fn rejects_inverted_period() {
        let (validator, _, _) = validator();
        let now = Utc::now();

        let result = validator
            .validate(BoatId::new(), now + Duration::days(2), now + Duration::days(1))
            .await;
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_when_no_windows() {
        let (validator, _, _) = validator();
        let now = Utc::now();

        let result = validator
            .validate(
                BoatId::new(),
                now + Duration::days(2),
                now + Duration::days(2) + Duration::hours(4),
            )
            .await;
        assert!(
            matches!(result, Err(BookingError::Validation(ref m)) if m == "Boat is not available for the selected dates")
        );
    }

    #[tokio::test]
    async fn rejects_period_split_across_windows() {
        let (validator, availability, _) = validator();
        let boat = BoatId::new();
        let now = Utc::now();

        let first = AvailabilityWindow::new(
            boat,
            now + Duration::days(1),
            now + Duration::days(3),
            Money::from_units(250),
        )
        .unwrap();
        let second = AvailabilityWindow::new(
            boat,
            now + Duration::days(3),
            now + Duration::days(5),
            Money::from_units(250),
        )
        .unwrap();
        availability.add_window(&first).await.unwrap();
        availability.add_window(&second).await.unwrap();

        let result = validator
            .validate(boat, now + Duration::days(2), now + Duration::days(4))
            .await;
        assert!(
            matches!(result, Err(BookingError::Validation(ref m)) if m == "Booking period doesn't match boat availability")
        );
    }

    #[tokio::test]
    async fn boundary_equality_is_legal() {
        let (validator, availability, _) = validator();
        let boat = BoatId::new();
        let now = Utc::now();

        let window_start = now + Duration::days(1);
        let window = AvailabilityWindow::new(
            boat,
            window_start,
            window_start + Duration::hours(4),
            Money::from_units(250),
        )
        .unwrap();
        availability.add_window(&window).await.unwrap();

        // Exactly the window's own bounds
        let result = validator
            .validate(boat, window_start, window_start + Duration::hours(4))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_overlap_with_existing_booking() {
        let (validator, availability, bookings) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let existing = Booking::new(
            UserId::new(),
            boat,
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(6),
            Money::from_units(1500),
        )
        .unwrap();
        bookings.insert(&existing).await.unwrap();

        let result = validator
            .validate(
                boat,
                now + Duration::days(2) + Duration::hours(3),
                now + Duration::days(2) + Duration::hours(8),
            )
            .await;
        assert!(matches!(result, Err(BookingError::Conflict { .. })));
    }

    #[tokio::test]
    async fn touching_existing_booking_is_legal() {
        let (validator, availability, bookings) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let existing_end = now + Duration::days(2) + Duration::hours(6);
        let existing = Booking::new(
            UserId::new(),
            boat,
            now + Duration::days(2),
            existing_end,
            Money::from_units(1500),
        )
        .unwrap();
        bookings.insert(&existing).await.unwrap();

        let result = validator
            .validate(boat, existing_end, existing_end + Duration::hours(4))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cancelled_booking_does_not_conflict() {
        let (validator, availability, bookings) = validator();
        let boat = BoatId::new();
        seed_window(&availability, boat).await;

        let now = Utc::now();
        let mut existing = Booking::new(
            UserId::new(),
            boat,
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(6),
            Money::from_units(1500),
        )
        .unwrap();
        existing.cancel().unwrap();
        bookings.insert(&existing).await.unwrap();

        let result = validator
            .validate(
                boat,
                now + Duration::days(2),
                now + Duration::days(2) + Duration::hours(6),
            )
            .await;
        assert!(result.is_ok());
    }
}
