//! Booking orchestration for the boat-rental marketplace.
//!
//! This crate wires the domain entities and the stores into the
//! booking saga: availability validation, pricing, payment processing
//! against a (sandbox) gateway, persistence, notifications, and
//! asynchronous settlement through gateway webhooks.
//!
//! The public surface is three orchestrators:
//! - [`BookingService`] runs the create-booking saga and booking queries
//! - [`PaymentProcessor`] runs a single payment attempt, returning
//!   failures as data
//! - [`WebhookProcessor`] settles pending payments from signed gateway
//!   notifications

pub mod error;
pub mod gateway;
pub mod locks;
pub mod notify;
pub mod pricing;
pub mod processor;
pub mod service;
pub mod validator;
pub mod webhook;

pub use error::BookingError;
pub use gateway::{
    CARD_ALWAYS_APPROVED, CARD_ALWAYS_DECLINED, CARD_ALWAYS_PENDING, ChargeRequest,
    ChargeResponse, GatewayOutcome, PaymentGateway, SandboxGateway,
};
pub use locks::BoatLocks;
pub use notify::{LoggingNotificationSink, NotificationSink, Recipient, RecordingNotificationSink};
pub use processor::{
    DEFAULT_GATEWAY_TIMEOUT, DEFAULT_MAX_AMOUNT_CENTS, PaymentFailure, PaymentOutcome,
    PaymentProcessor, PaymentRequest,
};
pub use service::{BookingService, CreateBooking};
pub use validator::AvailabilityValidator;
pub use webhook::{GatewayNotification, WebhookAck, WebhookProcessor};
