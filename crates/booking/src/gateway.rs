//! Payment gateway trait and its sandbox implementation.

use std::time::Duration;

use async_trait::async_trait;
use domain::{CardData, Money, PaymentMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::BookingError;

/// Card number that always charges successfully.
pub const CARD_ALWAYS_APPROVED: &str = "4111111111111111";
/// Card number that is always declined.
pub const CARD_ALWAYS_DECLINED: &str = "4222222222222222";
/// Card number that always leaves the charge pending confirmation.
pub const CARD_ALWAYS_PENDING: &str = "4333333333333333";

/// Charges at or above this amount (in cents) are declined on the
/// randomized path.
const DECLINE_THRESHOLD_CENTS: i64 = 1_000_000;

/// Approval probability for charges below the threshold that do not
/// match one of the fixed card numbers.
const APPROVAL_RATE: f64 = 0.9;

/// What the gateway decided about a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Approved,
    Declined,
    Pending,
}

/// A charge request sent to the gateway.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Money,
    pub method: PaymentMethod,
    pub card: Option<CardData>,
}

/// The gateway's immediate response to a charge.
#[derive(Debug, Clone)]
pub struct ChargeResponse {
    pub outcome: GatewayOutcome,
    pub transaction_id: String,
    pub message: String,
}

/// Trait for payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a charge and returns the gateway's immediate decision.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, BookingError>;
}

/// Sandbox gateway with a deterministic routing table.
///
/// The three fixed card numbers map to fixed outcomes regardless of
/// amount. Everything else is approved with probability 0.9 when the
/// amount is below the decline threshold, and declined otherwise. The
/// randomness source is injected at construction so tests can seed it.
pub struct SandboxGateway {
    rng: Mutex<StdRng>,
    delay: Duration,
}

impl SandboxGateway {
    /// Creates a gateway with entropy-seeded randomness and no delay.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            delay: Duration::ZERO,
        }
    }

    /// Creates a gateway with a fixed seed for deterministic tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay: Duration::ZERO,
        }
    }

    /// Adds an artificial response delay, for demo realism only.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn decide(&self, request: &ChargeRequest) -> GatewayOutcome {
        if let Some(card) = &request.card {
            match card.number.as_str() {
                CARD_ALWAYS_APPROVED => return GatewayOutcome::Approved,
                CARD_ALWAYS_DECLINED => return GatewayOutcome::Declined,
                CARD_ALWAYS_PENDING => return GatewayOutcome::Pending,
                _ => {}
            }
        }

        if request.amount.cents() >= DECLINE_THRESHOLD_CENTS {
            return GatewayOutcome::Declined;
        }

        let mut rng = self.rng.lock().await;
        if rng.gen_bool(APPROVAL_RATE) {
            GatewayOutcome::Approved
        } else {
            GatewayOutcome::Declined
        }
    }
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, BookingError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self.decide(request).await;
        let message = match outcome {
            GatewayOutcome::Approved => "Transaction approved",
            GatewayOutcome::Declined => "Transaction declined",
            GatewayOutcome::Pending => "Transaction pending confirmation",
        };

        Ok(ChargeResponse {
            outcome,
            transaction_id: format!("PSB-{}", Uuid::new_v4().simple()),
            message: message.to_string(),
        })
    }
}
