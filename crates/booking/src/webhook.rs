//! Gateway webhook handling: signature verification and asynchronous
//! payment settlement.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use domain::PaymentStatus;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use store::{BookingStore, PaymentStore};

use crate::error::BookingError;

type HmacSha256 = Hmac<Sha256>;

/// A gateway notification payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayNotification {
    pub notification_code: String,
    pub notification_type: String,
    /// The gateway transaction id.
    #[serde(rename = "code")]
    pub transaction_code: String,
    /// Optional internal reference set at checkout time.
    #[serde(default)]
    pub reference: Option<String>,
    /// Gateway status code.
    pub status: i32,
}

/// What a handled notification did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookAck {
    /// True if the payment (and possibly its booking) moved forward;
    /// false for idempotent redeliveries and unmapped status codes.
    pub updated: bool,
}

/// Maps a gateway status code to the internal payment status.
///
/// Unmapped codes return None and are acknowledged without effect.
fn map_status_code(code: i32) -> Option<PaymentStatus> {
    match code {
        1 | 2 | 5 | 9 => Some(PaymentStatus::Pending),
        3 | 4 => Some(PaymentStatus::Confirmed),
        6 | 7 | 8 => Some(PaymentStatus::Cancelled),
        _ => None,
    }
}

/// Settles payments from asynchronous gateway notifications.
///
/// Deliveries are idempotent: a redelivered or out-of-order
/// notification that would not move the payment forward is
/// acknowledged and ignored.
pub struct WebhookProcessor<P, B>
where
    P: PaymentStore,
    B: BookingStore,
{
    payments: P,
    bookings: B,
    secret: String,
}

impl<P, B> WebhookProcessor<P, B>
where
    P: PaymentStore,
    B: BookingStore,
{
    pub fn new(payments: P, bookings: B, secret: impl Into<String>) -> Self {
        Self {
            payments,
            bookings,
            secret: secret.into(),
        }
    }

    /// Verifies the HMAC-SHA256 signature over the raw body.
    ///
    /// The header value is the base64-encoded MAC; the comparison is
    /// constant-time via [`Mac::verify_slice`].
    pub fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        let Ok(claimed) = BASE64.decode(signature) else {
            return false;
        };
        let mut mac = match HmacSha256::new_from_slice(self.secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(raw_body);
        mac.verify_slice(&claimed).is_ok()
    }

    /// Computes the signature for a body, for tests and local tooling.
    pub fn sign(&self, raw_body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(raw_body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Handles a raw notification delivery.
    #[tracing::instrument(skip(self, raw_body, signature))]
    pub async fn handle(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<WebhookAck, BookingError> {
        metrics::counter!("webhook_deliveries_total").increment(1);

        if !self.verify_signature(raw_body, signature) {
            metrics::counter!("webhook_rejected_total", "reason" => "signature").increment(1);
            return Err(BookingError::validation("Invalid webhook signature"));
        }

        let notification: GatewayNotification = serde_json::from_slice(raw_body)
            .map_err(|e| BookingError::validation(format!("Malformed webhook payload: {e}")))?;

        self.apply(&notification).await
    }

    /// Applies a verified notification.
    pub async fn apply(
        &self,
        notification: &GatewayNotification,
    ) -> Result<WebhookAck, BookingError> {
        let mut payment = self
            .payments
            .find_by_transaction(&notification.transaction_code)
            .await?
            .ok_or_else(|| {
                BookingError::TransactionNotFound(notification.transaction_code.clone())
            })?;

        let Some(next) = map_status_code(notification.status) else {
            tracing::debug!(
                transaction = %notification.transaction_code,
                code = notification.status,
                "ignoring unmapped gateway status code"
            );
            return Ok(WebhookAck { updated: false });
        };

        // Forward progress only; redeliveries and regressions are
        // acknowledged no-ops.
        let moved = match payment.advance_status(next) {
            Ok(moved) => moved,
            Err(e) => {
                tracing::debug!(
                    transaction = %notification.transaction_code,
                    error = %e,
                    "ignoring non-forward webhook transition"
                );
                return Ok(WebhookAck { updated: false });
            }
        };
        if !moved {
            return Ok(WebhookAck { updated: false });
        }

        payment.set_processed_at(chrono::Utc::now());
        self.payments.update(&payment).await?;

        // A confirmed payment promotes its pending booking.
        if next == PaymentStatus::Confirmed
            && let Some(mut booking) = self.bookings.find(payment.booking()).await?
            && booking.status().can_confirm()
        {
            booking.confirm()?;
            self.bookings.update(&booking).await?;
            tracing::info!(booking_id = %booking.id(), "booking confirmed by webhook");
        }

        metrics::counter!("webhook_applied_total").increment(1);
        Ok(WebhookAck { updated: true })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use common::{BoatId, UserId};
    use domain::{Booking, BookingStatus, Money, Payment, PaymentMethod};
    use store::{InMemoryBookingStore, InMemoryPaymentStore};

    use super::*;

    const SECRET: &str = "webhook-test-secret";

    fn processor() -> (
        WebhookProcessor<InMemoryPaymentStore, InMemoryBookingStore>,
        InMemoryPaymentStore,
        InMemoryBookingStore,
    ) {
        let payments = InMemoryPaymentStore::new();
        let bookings = InMemoryBookingStore::new();
        (
            WebhookProcessor::new(payments.clone(), bookings.clone(), SECRET),
            payments,
            bookings,
        )
    }

    /// Seeds a Pending booking with a Pending payment under the given
    /// transaction id.
    async fn seed_pending(
        payments: &InMemoryPaymentStore,
        bookings: &InMemoryBookingStore,
        tx: &str,
    ) -> Booking {
        let now = Utc::now();
        let booking = Booking::new(
            UserId::new(),
            BoatId::new(),
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(4),
            Money::from_units(1000),
        )
        .unwrap();
        bookings.insert(&booking).await.unwrap();

        let mut payment = Payment::new(booking.id(), booking.total_price(), PaymentMethod::Pix);
        payment.record_gateway_result(
            domain::PaymentStatus::Pending,
            Some(tx.to_string()),
            Some("Transaction pending confirmation".to_string()),
            now,
        );
        payments.insert(&payment).await.unwrap();

        booking
    }

    fn body(tx: &str, status: i32) -> Vec<u8> {
        serde_json::json!({
            "notificationCode": "NC-1",
            "notificationType": "transaction",
            "code": tx,
            "status": status,
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let (processor, payments, bookings) = processor();
        seed_pending(&payments, &bookings, "PSB-1").await;

        let raw = body("PSB-1", 3);
        let result = processor.handle(&raw, "not-a-signature").await;
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[tokio::test]
    async fn signature_is_over_exact_bytes() {
        let (processor, _, _) = processor();

        let raw = body("PSB-1", 3);
        let signature = processor.sign(&raw);
        assert!(processor.verify_signature(&raw, &signature));

        // One changed byte invalidates it
        let mut tampered = raw.clone();
        tampered[0] = b' ';
        assert!(!processor.verify_signature(&tampered, &signature));

        // A header that is not even base64 is rejected outright
        assert!(!processor.verify_signature(&raw, "%%not-base64%%"));
    }

    #[tokio::test]
    async fn confirmation_promotes_payment_and_booking() {
        let (processor, payments, bookings) = processor();
        let booking = seed_pending(&payments, &bookings, "PSB-1").await;

        let raw = body("PSB-1", 3);
        let signature = processor.sign(&raw);
        let ack = processor.handle(&raw, &signature).await.unwrap();
        assert!(ack.updated);

        let payment = payments.find_by_transaction("PSB-1").await.unwrap().unwrap();
        assert_eq!(payment.status(), domain::PaymentStatus::Confirmed);

        let booking = bookings.find(booking.id()).await.unwrap().unwrap();
        assert_eq!(booking.status(), BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn redelivery_is_a_noop() {
        let (processor, payments, bookings) = processor();
        seed_pending(&payments, &bookings, "PSB-1").await;

        let raw = body("PSB-1", 3);
        let signature = processor.sign(&raw);

        let first = processor.handle(&raw, &signature).await.unwrap();
        assert!(first.updated);

        let second = processor.handle(&raw, &signature).await.unwrap();
        assert!(!second.updated);
    }

    #[tokio::test]
    async fn regression_after_confirmation_is_ignored() {
        let (processor, payments, bookings) = processor();
        seed_pending(&payments, &bookings, "PSB-1").await;

        let confirm = body("PSB-1", 3);
        let signature = processor.sign(&confirm);
        processor.handle(&confirm, &signature).await.unwrap();

        // A late "pending" code must not move the payment backwards
        let stale = body("PSB-1", 1);
        let signature = processor.sign(&stale);
        let ack = processor.handle(&stale, &signature).await.unwrap();
        assert!(!ack.updated);

        let payment = payments.find_by_transaction("PSB-1").await.unwrap().unwrap();
        assert_eq!(payment.status(), domain::PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn cancellation_codes_cancel_the_payment() {
        let (processor, payments, bookings) = processor();
        let booking = seed_pending(&payments, &bookings, "PSB-1").await;

        let raw = body("PSB-1", 7);
        let signature = processor.sign(&raw);
        let ack = processor.handle(&raw, &signature).await.unwrap();
        assert!(ack.updated);

        let payment = payments.find_by_transaction("PSB-1").await.unwrap().unwrap();
        assert_eq!(payment.status(), domain::PaymentStatus::Cancelled);

        // The booking is not confirmed by a cancellation
        let booking = bookings.find(booking.id()).await.unwrap().unwrap();
        assert_eq!(booking.status(), BookingStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_transaction_is_rejected() {
        let (processor, _, _) = processor();

        let raw = body("PSB-missing", 3);
        let signature = processor.sign(&raw);
        let result = processor.handle(&raw, &signature).await;
        assert!(matches!(result, Err(BookingError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn unmapped_status_code_is_acknowledged() {
        let (processor, payments, bookings) = processor();
        seed_pending(&payments, &bookings, "PSB-1").await;

        let raw = body("PSB-1", 42);
        let signature = processor.sign(&raw);
        let ack = processor.handle(&raw, &signature).await.unwrap();
        assert!(!ack.updated);

        let payment = payments.find_by_transaction("PSB-1").await.unwrap().unwrap();
        assert_eq!(payment.status(), domain::PaymentStatus::Pending);
    }
}
