//! Price calculation for validated booking periods.

use chrono::{DateTime, Utc};
use domain::{AvailabilityWindow, Money, booking::MIN_BOOKING_HOURS};

/// Computes the total price of a booking inside the given window.
///
/// Billing is by whole hours with a floor of [`MIN_BOOKING_HOURS`]:
/// a validated 4h10m booking bills 4 hours. The caller is expected to
/// pass the window returned by validation, so containment has already
/// been established.
pub fn booking_price(
    window: &AvailabilityWindow,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Money {
    let whole_hours = (end - start).num_hours().max(MIN_BOOKING_HOURS);
    window.price_per_hour().multiply_hours(whole_hours as u32)
}
