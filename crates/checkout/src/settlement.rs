//! Settlement input boundary and the simulated gateway rules.
//!
//! The engine settles payments deterministically instead of calling a
//! real gateway: each method has a fixed acceptance rule, so tests and
//! demos can steer the outcome through the supplied details.

use std::collections::HashMap;

use domain::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Detail key for the card number.
pub const CARD_NUMBER: &str = "card_number";
/// Detail key for the card CVV.
pub const CVV: &str = "cvv";
/// Detail key for the UPI identifier.
pub const UPI_ID: &str = "upi_id";

/// Payment input collected by the outer prompt/UI layer and handed to
/// the orchestrator synchronously. The method is a raw string; the
/// orchestrator normalizes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub method: String,
    pub details: HashMap<String, String>,
}

impl PaymentRequest {
    /// Creates a request with the given raw method string.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            details: HashMap::new(),
        }
    }

    /// Attaches a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// A card request with number and CVV.
    pub fn card(number: impl Into<String>, cvv: impl Into<String>) -> Self {
        Self::new("Card")
            .with_detail(CARD_NUMBER, number)
            .with_detail(CVV, cvv)
    }

    /// A UPI request with the given identifier.
    pub fn upi(id: impl Into<String>) -> Self {
        Self::new("UPI").with_detail(UPI_ID, id)
    }

    /// A cash-on-delivery request.
    pub fn cod() -> Self {
        Self::new("COD")
    }
}

/// Flags malformed payment details.
///
/// Format problems are reported for logging but never block settlement
/// construction; they only make the acceptance rule below unlikely to
/// pass.
pub fn detail_issues(method: PaymentMethod, details: &HashMap<String, String>) -> Vec<String> {
    let mut issues = Vec::new();
    if method == PaymentMethod::Card {
        let number = details.get(CARD_NUMBER).map(String::as_str).unwrap_or("");
        if number.len() != 16 || !number.chars().all(|c| c.is_ascii_digit()) {
            issues.push("card number must be 16 digits".to_string());
        }
        let cvv = details.get(CVV).map(String::as_str).unwrap_or("");
        if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
            issues.push("CVV must be 3 digits".to_string());
        }
    }
    issues
}

/// Applies the method's deterministic acceptance rule.
///
/// - `Card`: accepted iff the card number starts with `4`
/// - `UPI`: accepted iff the identifier contains `@upi` (any casing)
/// - `COD`: always accepted
pub fn evaluate(method: PaymentMethod, details: &HashMap<String, String>) -> bool {
    match method {
        PaymentMethod::Card => details
            .get(CARD_NUMBER)
            .is_some_and(|n| n.starts_with('4')),
        PaymentMethod::Upi => details
            .get(UPI_ID)
            .is_some_and(|id| id.to_uppercase().contains("@UPI")),
        PaymentMethod::Cod => true,
    }
}
