//! Notification sink trait and implementations.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::BookingId;
use domain::{Booking, User};

use crate::error::BookingError;

/// Who a booking notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Owner,
    Renter,
}

impl Recipient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recipient::Owner => "owner",
            Recipient::Renter => "renter",
        }
    }
}

/// Fire-and-forget booking notifications.
///
/// Failures here never roll back a booking; the orchestrator logs and
/// continues.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        booking: &Booking,
        user: &User,
        recipient: Recipient,
    ) -> Result<(), BookingError>;
}

/// Notification sink that just logs, the single-process default.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotificationSink;

impl LoggingNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn notify(
        &self,
        booking: &Booking,
        user: &User,
        recipient: Recipient,
    ) -> Result<(), BookingError> {
        tracing::info!(
            booking_id = %booking.id(),
            email = %user.email,
            role = recipient.as_str(),
            "booking notification sent"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<(BookingId, Recipient)>,
    fail_on_notify: bool,
}

/// Recording notification sink for testing.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSink {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to fail on the next notify calls.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns the number of notifications sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns true if a notification was sent for the booking and role.
    pub fn was_notified(&self, booking: BookingId, recipient: Recipient) -> bool {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .any(|(b, r)| *b == booking && *r == recipient)
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(
        &self,
        booking: &Booking,
        _user: &User,
        recipient: Recipient,
    ) -> Result<(), BookingError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_notify {
            return Err(BookingError::Internal(
                "notification channel unavailable".to_string(),
            ));
        }
        state.sent.push((booking.id(), recipient));
        Ok(())
    }
}
