//! Payment processing orchestration.
//!
//! The processor's public contract is "always returns a result, never
//! raises": validation failures, gateway declines, timeouts and store
//! errors all come back as data in [`PaymentOutcome`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{BoatId, BookingId, PaymentId};
use domain::{CardData, Money, Payment, PaymentMethod, PaymentStatus};
use store::PaymentStore;

use crate::gateway::{ChargeRequest, GatewayOutcome, PaymentGateway};

/// Default bound on the gateway call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default maximum accepted charge, in cents.
pub const DEFAULT_MAX_AMOUNT_CENTS: i64 = 1_000_000;

/// Input to a payment attempt.
///
/// Exactly one of `booking` and `boat` must be set; a payment row is
/// only written for the booking context.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub booking: Option<BookingId>,
    pub boat: Option<BoatId>,
    pub amount: Money,
    pub method: PaymentMethod,
    pub card: Option<CardData>,
    pub installments: u32,
    pub payer_email: String,
}

/// Why a payment attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFailure {
    /// The request was malformed; nothing was charged.
    Validation(String),
    /// The gateway refused the charge.
    Declined(String),
    /// The gateway could not be reached or timed out.
    Gateway(String),
    /// An unexpected internal error, typically a store failure.
    System(String),
}

/// The auditable result of one payment attempt.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: Option<PaymentId>,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub message: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failure: Option<PaymentFailure>,
}

impl PaymentOutcome {
    /// The charge was approved.
    pub fn is_successful(&self) -> bool {
        self.failure.is_none() && self.status.is_successful()
    }

    /// The gateway accepted the charge but has not decided yet; a
    /// webhook will settle it later.
    pub fn is_pending(&self) -> bool {
        self.failure.is_none() && self.status == PaymentStatus::Pending
    }

    fn failed(failure: PaymentFailure, payment: Option<PaymentId>, status: PaymentStatus) -> Self {
        let message = match &failure {
            PaymentFailure::Validation(m)
            | PaymentFailure::Declined(m)
            | PaymentFailure::Gateway(m)
            | PaymentFailure::System(m) => Some(m.clone()),
        };
        Self {
            payment,
            status,
            transaction_id: None,
            message,
            processed_at: None,
            failure: Some(failure),
        }
    }
}

/// Orchestrates one payment attempt against the gateway.
pub struct PaymentProcessor<P, G>
where
    P: PaymentStore,
    G: PaymentGateway,
{
    payments: P,
    gateway: G,
    max_amount: Money,
    gateway_timeout: Duration,
}

impl<P, G> PaymentProcessor<P, G>
where
    P: PaymentStore,
    G: PaymentGateway,
{
    pub fn new(payments: P, gateway: G) -> Self {
        Self {
            payments,
            gateway,
            max_amount: Money::from_cents(DEFAULT_MAX_AMOUNT_CENTS),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    /// Overrides the maximum accepted amount.
    pub fn with_max_amount(mut self, max_amount: Money) -> Self {
        self.max_amount = max_amount;
        self
    }

    /// Overrides the gateway call timeout.
    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    /// Processes a payment attempt end to end.
    ///
    /// The payment row is written twice: once as Pending before the
    /// gateway call, once with the gateway's answer. Both writes happen
    /// on failure paths too, so the row always reflects an auditable
    /// attempt.
    #[tracing::instrument(skip(self, request), fields(method = %request.method))]
    pub async fn process(&self, request: PaymentRequest) -> PaymentOutcome {
        metrics::counter!("payments_attempted_total").increment(1);

        if let Err(message) = self.validate(&request) {
            metrics::counter!("payments_rejected_total", "reason" => "validation").increment(1);
            return PaymentOutcome::failed(
                PaymentFailure::Validation(message),
                None,
                PaymentStatus::Cancelled,
            );
        }

        // A row is only recorded for booking-context attempts; a
        // boat-context charge is a pre-booking check with no booking
        // to link to.
        let mut payment = request
            .booking
            .map(|booking| Payment::new(booking, request.amount, request.method));

        if let Some(payment) = &payment
            && let Err(e) = self.payments.insert(payment).await
        {
            tracing::error!(error = %e, "failed to record payment attempt");
            return PaymentOutcome::failed(
                PaymentFailure::System(format!("Failed to record payment: {e}")),
                None,
                PaymentStatus::Unknown,
            );
        }
        let payment_id = payment.as_ref().map(Payment::id);

        let charge = ChargeRequest {
            amount: request.amount,
            method: request.method,
            card: request.card,
        };

        let response =
            match tokio::time::timeout(self.gateway_timeout, self.gateway.charge(&charge)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    let message = format!("Gateway error: {e}");
                    return self
                        .settle_failure(&mut payment, PaymentFailure::Gateway(message))
                        .await;
                }
                Err(_) => {
                    return self
                        .settle_failure(
                            &mut payment,
                            PaymentFailure::Gateway("Gateway timeout".to_string()),
                        )
                        .await;
                }
            };

        let status = match response.outcome {
            GatewayOutcome::Approved => PaymentStatus::Confirmed,
            GatewayOutcome::Declined => PaymentStatus::Cancelled,
            GatewayOutcome::Pending => PaymentStatus::Pending,
        };
        let processed_at = Utc::now();

        if let Some(payment) = &mut payment {
            payment.record_gateway_result(
                status,
                Some(response.transaction_id.clone()),
                Some(response.message.clone()),
                processed_at,
            );
            if let Err(e) = self.payments.update(payment).await {
                tracing::error!(error = %e, "failed to persist gateway result");
                return PaymentOutcome::failed(
                    PaymentFailure::System(format!("Failed to persist payment result: {e}")),
                    payment_id,
                    status,
                );
            }
        }

        let failure = match response.outcome {
            GatewayOutcome::Declined => {
                metrics::counter!("payments_declined_total").increment(1);
                Some(PaymentFailure::Declined(response.message.clone()))
            }
            GatewayOutcome::Approved => {
                metrics::counter!("payments_approved_total").increment(1);
                None
            }
            GatewayOutcome::Pending => {
                metrics::counter!("payments_pending_total").increment(1);
                None
            }
        };

        PaymentOutcome {
            payment: payment_id,
            status,
            transaction_id: Some(response.transaction_id),
            message: Some(response.message),
            processed_at: Some(processed_at),
            failure,
        }
    }

    /// Records a gateway-level failure on the payment row, then
    /// returns the failure outcome. The status moves to Unknown: the
    /// charge may or may not have reached the gateway.
    async fn settle_failure(
        &self,
        payment: &mut Option<Payment>,
        failure: PaymentFailure,
    ) -> PaymentOutcome {
        metrics::counter!("payments_rejected_total", "reason" => "gateway").increment(1);

        let payment_id = payment.as_ref().map(Payment::id);
        if let Some(payment) = payment {
            let message = match &failure {
                PaymentFailure::Gateway(m) | PaymentFailure::System(m) => m.clone(),
                PaymentFailure::Validation(m) | PaymentFailure::Declined(m) => m.clone(),
            };
            payment.record_gateway_result(
                PaymentStatus::Unknown,
                None,
                Some(message),
                Utc::now(),
            );
            if let Err(e) = self.payments.update(payment).await {
                tracing::error!(error = %e, "failed to record gateway failure");
            }
        }

        PaymentOutcome::failed(failure, payment_id, PaymentStatus::Unknown)
    }

    fn validate(&self, request: &PaymentRequest) -> Result<(), String> {
        if !request.amount.is_positive() {
            return Err("Payment amount must be greater than zero".to_string());
        }
        if request.amount > self.max_amount {
            return Err(format!(
                "Payment amount exceeds the maximum of {}",
                self.max_amount
            ));
        }
        match (request.booking, request.boat) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(
                    "Payment must reference exactly one of a booking or a boat".to_string(),
                );
            }
        }
        if request.installments < 1 {
            return Err("Installments must be at least 1".to_string());
        }
        if request.method == PaymentMethod::CreditCard {
            let card = request
                .card
                .as_ref()
                .ok_or_else(|| "Card data is required for credit card payments".to_string())?;
            card.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use store::InMemoryPaymentStore;

    use super::*;
    use crate::error::BookingError;
    use crate::gateway::{CARD_ALWAYS_APPROVED, CARD_ALWAYS_DECLINED, CARD_ALWAYS_PENDING, ChargeResponse, SandboxGateway};

    /// Gateway double that always errors, for the degraded path.
    struct BrokenGateway;

    #[async_trait]
    impl PaymentGateway for BrokenGateway {
        async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeResponse, BookingError> {
            Err(BookingError::Internal("connection refused".to_string()))
        }
    }

    /// Gateway double that never answers, for the timeout path.
    struct StalledGateway;

    #[async_trait]
    impl PaymentGateway for StalledGateway {
        async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeResponse, BookingError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn card_request(booking: BookingId, number: &str) -> PaymentRequest {
        PaymentRequest {
            booking: Some(booking),
            boat: None,
            amount: Money::from_units(1000),
            method: PaymentMethod::CreditCard,
            card: Some(CardData::new(number, "JOHN DOE", "12/28", "123")),
            installments: 1,
            payer_email: "renter@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn approved_charge_confirms_payment() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), SandboxGateway::with_seed(1));
        let booking = BookingId::new();

        let outcome = processor
            .process(card_request(booking, CARD_ALWAYS_APPROVED))
            .await;

        assert!(outcome.is_successful());
        assert_eq!(outcome.status, PaymentStatus::Confirmed);
        assert!(outcome.transaction_id.is_some());

        let stored = payments.list_for_booking(booking).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), PaymentStatus::Confirmed);
        assert!(stored[0].processed_at().is_some());
    }

    #[tokio::test]
    async fn declined_charge_cancels_payment_row() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), SandboxGateway::with_seed(1));
        let booking = BookingId::new();

        let outcome = processor
            .process(card_request(booking, CARD_ALWAYS_DECLINED))
            .await;

        assert!(!outcome.is_successful());
        assert!(matches!(outcome.failure, Some(PaymentFailure::Declined(_))));
        assert_eq!(outcome.status, PaymentStatus::Cancelled);

        // The row still records the audited attempt
        let stored = payments.list_for_booking(booking).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), PaymentStatus::Cancelled);
    }

    #[tokio::test]
    async fn pending_is_neither_success_nor_failure() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), SandboxGateway::with_seed(1));

        let outcome = processor
            .process(card_request(BookingId::new(), CARD_ALWAYS_PENDING))
            .await;

        assert!(!outcome.is_successful());
        assert!(outcome.is_pending());
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn validation_failure_writes_no_row() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), SandboxGateway::with_seed(1));
        let booking = BookingId::new();

        let mut request = card_request(booking, CARD_ALWAYS_APPROVED);
        request.amount = Money::zero();

        let outcome = processor.process(request).await;
        assert!(matches!(
            outcome.failure,
            Some(PaymentFailure::Validation(_))
        ));
        assert_eq!(payments.payment_count().await, 0);
    }

    #[tokio::test]
    async fn short_card_number_is_rejected() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments, SandboxGateway::with_seed(1));

        let outcome = processor
            .process(card_request(BookingId::new(), "411111"))
            .await;
        assert!(matches!(
            outcome.failure,
            Some(PaymentFailure::Validation(_))
        ));
    }

    #[tokio::test]
    async fn ambiguous_context_is_rejected() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments, SandboxGateway::with_seed(1));

        let mut request = card_request(BookingId::new(), CARD_ALWAYS_APPROVED);
        request.boat = Some(BoatId::new());

        let outcome = processor.process(request).await;
        assert!(matches!(
            outcome.failure,
            Some(PaymentFailure::Validation(_))
        ));
    }

    #[tokio::test]
    async fn amount_over_maximum_is_rejected() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments, SandboxGateway::with_seed(1))
            .with_max_amount(Money::from_units(500));

        let outcome = processor
            .process(card_request(BookingId::new(), CARD_ALWAYS_APPROVED))
            .await;
        assert!(matches!(
            outcome.failure,
            Some(PaymentFailure::Validation(_))
        ));
    }

    #[tokio::test]
    async fn gateway_error_degrades_to_unknown() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), BrokenGateway);
        let booking = BookingId::new();

        let outcome = processor
            .process(card_request(booking, CARD_ALWAYS_APPROVED))
            .await;

        assert!(matches!(outcome.failure, Some(PaymentFailure::Gateway(_))));
        assert_eq!(outcome.status, PaymentStatus::Unknown);

        let stored = payments.list_for_booking(booking).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), PaymentStatus::Unknown);
    }

    #[tokio::test]
    async fn gateway_timeout_degrades_to_unknown() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments.clone(), StalledGateway)
            .with_gateway_timeout(Duration::from_millis(20));
        let booking = BookingId::new();

        let outcome = processor
            .process(card_request(booking, CARD_ALWAYS_APPROVED))
            .await;

        assert!(matches!(outcome.failure, Some(PaymentFailure::Gateway(_))));
        assert_eq!(outcome.message.as_deref(), Some("Gateway timeout"));

        let stored = payments.list_for_booking(booking).await.unwrap();
        assert_eq!(stored[0].status(), PaymentStatus::Unknown);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_system_error() {
        let payments = InMemoryPaymentStore::new();
        payments.set_fail_on_insert(true).await;
        let processor = PaymentProcessor::new(payments, SandboxGateway::with_seed(1));

        let outcome = processor
            .process(card_request(BookingId::new(), CARD_ALWAYS_APPROVED))
            .await;
        assert!(matches!(outcome.failure, Some(PaymentFailure::System(_))));
    }

    #[tokio::test]
    async fn pix_needs_no_card() {
        let payments = InMemoryPaymentStore::new();
        let processor = PaymentProcessor::new(payments, SandboxGateway::with_seed(1));

        let request = PaymentRequest {
            booking: Some(BookingId::new()),
            boat: None,
            amount: Money::from_units(100),
            method: PaymentMethod::Pix,
            card: None,
            installments: 1,
            payer_email: "renter@example.com".to_string(),
        };

        let outcome = processor.process(request).await;
        assert!(outcome.failure.is_none() || !matches!(outcome.failure, Some(PaymentFailure::Validation(_))));
    }
}
