//! Card data value object with sandbox-grade format validation.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Card details supplied for CREDIT_CARD payments.
///
/// These are sandbox test cards, never real PANs; the number doubles as
/// the gateway routing fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub number: String,
    pub holder_name: String,
    /// Expiration in `MM/YY` or `MM/YYYY` form.
    pub expiration: String,
    pub cvv: String,
}

impl CardData {
    pub fn new(
        number: impl Into<String>,
        holder_name: impl Into<String>,
        expiration: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            holder_name: holder_name.into(),
            expiration: expiration.into(),
            cvv: cvv.into(),
        }
    }

    /// Validates card field formats, reporting the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        let number = self.number.trim();
        if number.len() < 13 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidCard(
                "valid card number is required (minimum 13 digits)".to_string(),
            ));
        }
        if self.holder_name.trim().is_empty() {
            return Err(DomainError::InvalidCard(
                "card holder name is required".to_string(),
            ));
        }
        if !is_valid_expiration(self.expiration.trim()) {
            return Err(DomainError::InvalidCard(
                "card expiration date must be in format MM/YY or MM/YYYY".to_string(),
            ));
        }
        let cvv = self.cvv.trim();
        if cvv.len() < 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidCard(
                "card security code (CVV) is required (3-4 digits)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepts `MM/YY` or `MM/YYYY` with month 01-12.
fn is_valid_expiration(s: &str) -> bool {
    let Some((month, year)) = s.split_once('/') else {
        return false;
    };
    if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let Ok(m) = month.parse::<u8>() else {
        return false;
    };
    if !(1..=12).contains(&m) {
        return false;
    }
    matches!(year.len(), 2 | 4) && year.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardData {
        CardData::new("4111111111111111", "JOSE SILVA", "12/28", "123")
    }

    #[test]
    fn test_valid_card_passes() {
        assert!(card().validate().is_ok());
    }

    #[test]
    fn test_short_number_rejected() {
        let mut c = card();
        c.number = "41111".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_non_numeric_number_rejected() {
        let mut c = card();
        c.number = "4111-1111-1111-111".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_empty_holder_rejected() {
        let mut c = card();
        c.holder_name = "  ".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_expiration_formats() {
        for good in ["01/25", "12/2030"] {
            let mut c = card();
            c.expiration = good.to_string();
            assert!(c.validate().is_ok(), "expected {good} to be accepted");
        }
        for bad in ["13/25", "1/25", "12-25", "12/2", "12/20301", ""] {
            let mut c = card();
            c.expiration = bad.to_string();
            assert!(c.validate().is_err(), "expected {bad} to be rejected");
        }
    }

    #[test]
    fn test_short_cvv_rejected() {
        let mut c = card();
        c.cvv = "12".to_string();
        assert!(c.validate().is_err());
    }
}
