//! Booking orchestration: the create-booking saga and booking queries.

use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, UserId};
use domain::{Booking, CardData, Money, Payment, PaymentMethod};
use store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, StoreError, UserStore};

use crate::error::BookingError;
use crate::gateway::PaymentGateway;
use crate::locks::BoatLocks;
use crate::notify::{NotificationSink, Recipient};
use crate::processor::{PaymentFailure, PaymentProcessor, PaymentRequest};
use crate::validator::AvailabilityValidator;

/// Command to create a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub renter: UserId,
    pub boat: BoatId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub method: PaymentMethod,
    pub card: Option<CardData>,
    pub installments: u32,
}

/// Orchestrates the booking saga.
///
/// The sequence is strictly ordered and fail-fast: resolve parties,
/// validate availability, price, charge, persist, notify. A booking
/// row is only written once payment succeeded (or is pending gateway
/// confirmation); a declined charge leaves no booking behind.
pub struct BookingService<U, Bo, A, B, P, G, N>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore,
    P: PaymentStore,
    G: PaymentGateway,
    N: NotificationSink,
{
    users: U,
    boats: Bo,
    bookings: B,
    payments: P,
    validator: AvailabilityValidator<A, B>,
    processor: PaymentProcessor<P, G>,
    notifier: N,
    locks: BoatLocks,
}

impl<U, Bo, A, B, P, G, N> BookingService<U, Bo, A, B, P, G, N>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    pub fn new(
        users: U,
        boats: Bo,
        availability: A,
        bookings: B,
        payments: P,
        processor: PaymentProcessor<P, G>,
        notifier: N,
    ) -> Self {
        let validator = AvailabilityValidator::new(availability, bookings.clone());
        Self {
            users,
            boats,
            bookings,
            payments,
            validator,
            processor,
            notifier,
            locks: BoatLocks::new(),
        }
    }

    /// Runs the booking saga end to end.
    ///
    /// Holds the per-boat lock across validation, charge and persist,
    /// so two concurrent requests for the same boat cannot both pass
    /// validation before either commits.
    #[tracing::instrument(skip(self, command), fields(boat = %command.boat, renter = %command.renter))]
    pub async fn create_booking(&self, command: CreateBooking) -> Result<Booking, BookingError> {
        metrics::counter!("bookings_requested_total").increment(1);
        let saga_start = std::time::Instant::now();

        let _boat_guard = self.locks.acquire(command.boat).await;

        // 1. Resolve parties
        let renter = self
            .users
            .find(command.renter)
            .await?
            .ok_or(BookingError::UserNotFound(command.renter))?;
        let boat = self
            .boats
            .find(command.boat)
            .await?
            .ok_or(BookingError::BoatNotFound(command.boat))?;

        // 2-3. Validate the candidate period
        let window = self
            .validator
            .validate(boat.id, command.start_time, command.end_time)
            .await?;

        // 4. Price
        let price = crate::pricing::booking_price(&window, command.start_time, command.end_time);

        let mut booking = Booking::new(
            renter.id,
            boat.id,
            command.start_time,
            command.end_time,
            price,
        )?;

        // 5. Charge
        let outcome = self
            .processor
            .process(PaymentRequest {
                booking: Some(booking.id()),
                boat: None,
                amount: price,
                method: command.method,
                card: command.card,
                installments: command.installments,
                payer_email: renter.email.clone(),
            })
            .await;

        // 6. A failed charge leaves no booking row behind
        if let Some(failure) = outcome.failure {
            metrics::counter!("bookings_failed_total", "stage" => "payment").increment(1);
            return Err(match failure {
                PaymentFailure::Validation(m) => BookingError::Validation(m),
                PaymentFailure::Declined(m) | PaymentFailure::Gateway(m) => {
                    BookingError::Payment { message: m }
                }
                PaymentFailure::System(m) => BookingError::Internal(m),
            });
        }

        // 7. Persist. An approved charge confirms the booking; a
        // gateway-pending charge persists it as Pending for the
        // webhook to settle.
        if outcome.is_successful() {
            booking.confirm()?;
        }

        if let Err(e) = self.bookings.insert(&booking).await {
            return Err(match e {
                // Lost the race to another process; the exclusion
                // constraint is the backstop for what validation
                // could not see.
                StoreError::Conflict { boat } => {
                    metrics::counter!("bookings_failed_total", "stage" => "conflict").increment(1);
                    BookingError::Conflict {
                        boat,
                        start: booking.start_time(),
                        end: booking.end_time(),
                    }
                }
                other => BookingError::Store(other),
            });
        }

        // 8. Fire-and-forget notifications
        if let Some(owner) = self.users.find(boat.owner).await.ok().flatten()
            && let Err(e) = self
                .notifier
                .notify(&booking, &owner, Recipient::Owner)
                .await
        {
            tracing::warn!(booking_id = %booking.id(), error = %e, "owner notification failed");
        }
        if let Err(e) = self
            .notifier
            .notify(&booking, &renter, Recipient::Renter)
            .await
        {
            tracing::warn!(booking_id = %booking.id(), error = %e, "renter notification failed");
        }

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("booking_saga_duration_seconds").record(duration);
        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(booking_id = %booking.id(), status = %booking.status(), duration, "booking created");

        Ok(booking)
    }

    /// Looks up a booking by id.
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.bookings
            .find(id)
            .await?
            .ok_or(BookingError::BookingNotFound(id))
    }

    /// Returns all bookings of a renter, newest first.
    pub async fn bookings_for_renter(&self, renter: UserId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.bookings.list_for_renter(renter).await?)
    }

    /// Cancels a booking, freeing its period for re-booking.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        let mut booking = self.get_booking(id).await?;
        booking.cancel()?;
        self.bookings.update(&booking).await?;

        metrics::counter!("bookings_cancelled_total").increment(1);
        tracing::info!(booking_id = %id, "booking cancelled");
        Ok(booking)
    }

    /// Looks up a payment by its gateway transaction id.
    pub async fn payment_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Payment, BookingError> {
        self.payments
            .find_by_transaction(transaction_id)
            .await?
            .ok_or_else(|| BookingError::TransactionNotFound(transaction_id.to_string()))
    }
}
