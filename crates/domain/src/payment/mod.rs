//! Payment record tied to a booking, plus its method and card data.

mod card;
mod status;

pub use card::CardData;
pub use status::PaymentStatus;

use chrono::{DateTime, Utc};
use common::{BookingId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// How the renter pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    Pix,
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Boleto => "BOLETO",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "PIX" => Ok(PaymentMethod::Pix),
            "BOLETO" => Ok(PaymentMethod::Boleto),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// One charge attempt tied to exactly one booking.
///
/// Created Pending by the payment processor immediately before the
/// gateway call, updated with the gateway's immediate response, and
/// possibly updated again later by the webhook processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    booking: BookingId,
    amount: Money,
    method: PaymentMethod,
    status: PaymentStatus,
    transaction_id: Option<String>,
    gateway_message: Option<String>,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new Pending payment for a booking.
    ///
    /// The amount is the booking's total price at creation time; it never
    /// changes afterwards.
    pub fn new(booking: BookingId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            id: PaymentId::new(),
            booking,
            amount,
            method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            gateway_message: None,
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Rehydrates a payment from persisted fields. For store implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        booking: BookingId,
        amount: Money,
        method: PaymentMethod,
        status: PaymentStatus,
        transaction_id: Option<String>,
        gateway_message: Option<String>,
        processed_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking,
            amount,
            method,
            status,
            transaction_id,
            gateway_message,
            processed_at,
            created_at,
        }
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn booking(&self) -> BookingId {
        self.booking
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn gateway_message(&self) -> Option<&str> {
        self.gateway_message.as_deref()
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records the gateway's immediate response on this payment.
    ///
    /// Always stores the transaction id and message; the status only moves
    /// if it is forward progress. Recording the same status again (e.g. a
    /// Pending PIX staying Pending) keeps the gateway fields and is not an
    /// error.
    pub fn record_gateway_result(
        &mut self,
        status: PaymentStatus,
        transaction_id: Option<String>,
        message: Option<String>,
        processed_at: DateTime<Utc>,
    ) {
        if self.status.can_transition_to(status) {
            self.status = status;
        }
        if transaction_id.is_some() {
            self.transaction_id = transaction_id;
        }
        if message.is_some() {
            self.gateway_message = message;
        }
        self.processed_at = Some(processed_at);
    }

    /// Attempts a forward status transition, as driven by a webhook.
    ///
    /// Returns `Ok(true)` if the status moved, `Ok(false)` for an
    /// idempotent no-op (same status redelivered), and an error for a
    /// regression attempt on a terminal payment.
    pub fn advance_status(&mut self, next: PaymentStatus) -> Result<bool, DomainError> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidPaymentTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(true)
    }

    /// Updates the gateway message, e.g. from a webhook notification code.
    pub fn set_gateway_message(&mut self, message: impl Into<String>) {
        self.gateway_message = Some(message.into());
    }

    /// Updates the processed-at timestamp.
    pub fn set_processed_at(&mut self, at: DateTime<Utc>) {
        self.processed_at = Some(at);
    }
}
