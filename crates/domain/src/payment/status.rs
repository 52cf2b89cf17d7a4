//! Payment status lifecycle.

use serde::{Deserialize, Serialize};

/// The status of a payment record.
///
/// Status moves forward only:
/// ```text
/// Pending ──┬──► Confirmed
///           ├──► Cancelled
///           └──► Unknown
/// ```
///
/// Unknown is reached when the gateway returns something unrecognized or
/// the call fails outright; it still counts as forward movement so the
/// row records the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Payment initiated but not settled; typical for PIX/Boleto awaiting
    /// the customer, or a card charge under review.
    #[default]
    Pending,

    /// Funds captured; the only status considered successful.
    Confirmed,

    /// Declined by the gateway or abandoned (terminal state).
    Cancelled,

    /// Outcome could not be determined; needs reconciliation.
    Unknown,
}

impl PaymentStatus {
    /// Returns true if the payment settled successfully.
    pub fn is_successful(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed)
    }

    /// Returns true if no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Cancelled)
    }

    /// Returns true if moving from `self` to `next` is forward progress.
    ///
    /// Identical statuses are not progress (webhook redeliveries must be
    /// no-ops) and terminal statuses never regress.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match self {
            PaymentStatus::Pending => next != PaymentStatus::Pending,
            PaymentStatus::Unknown => {
                matches!(next, PaymentStatus::Confirmed | PaymentStatus::Cancelled)
            }
            PaymentStatus::Confirmed | PaymentStatus::Cancelled => false,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Confirmed => "Confirmed",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Confirmed" => Ok(PaymentStatus::Confirmed),
            "Cancelled" => Ok(PaymentStatus::Cancelled),
            "Unknown" => Ok(PaymentStatus::Unknown),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_only_confirmed_is_successful() {
        assert!(PaymentStatus::Confirmed.is_successful());
        assert!(!PaymentStatus::Pending.is_successful());
        assert!(!PaymentStatus::Cancelled.is_successful());
        assert!(!PaymentStatus::Unknown.is_successful());
    }

    #[test]
    fn test_pending_moves_forward() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Confirmed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Unknown));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn test_terminal_statuses_never_regress() {
        for next in [
            PaymentStatus::Pending,
            PaymentStatus::Confirmed,
            PaymentStatus::Cancelled,
            PaymentStatus::Unknown,
        ] {
            assert!(!PaymentStatus::Confirmed.can_transition_to(next));
            assert!(!PaymentStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_unknown_can_resolve() {
        assert!(PaymentStatus::Unknown.can_transition_to(PaymentStatus::Confirmed));
        assert!(PaymentStatus::Unknown.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Unknown.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn test_display_and_parse() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Confirmed,
            PaymentStatus::Cancelled,
            PaymentStatus::Unknown,
        ] {
            assert_eq!(status.to_string().parse::<PaymentStatus>().unwrap(), status);
        }
    }
}
