//! Payment record and its method/status enumerations.

use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// How a settlement is attempted.
///
/// `as_str` yields the exact casing the payments table's CHECK
/// constraint enumerates, regardless of how the caller spelled the
/// method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    Upi,
    Cod,
}

impl PaymentMethod {
    /// Parses caller input, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for unrecognized input; the checkout layer decides
    /// what to do with that.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CARD" => Some(PaymentMethod::Card),
            "UPI" => Some(PaymentMethod::Upi),
            "COD" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }

    /// Returns the method name in its persisted casing.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Cod => "COD",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome state of one settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    /// Returns the status name in its persisted casing.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Success => "Success",
            PaymentStatus::Failed => "Failed",
        }
    }

    /// Parses the persisted casing back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(PaymentStatus::Pending),
            "Success" => Some(PaymentStatus::Success),
            "Failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One settlement attempt tied to an order.
///
/// Retrying a checkout appends a new payment row rather than updating an
/// existing one, so the attempt history survives as an audit trail; only
/// the latest attempt matters for order state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

impl Payment {
    /// Creates a payment record for an order.
    pub fn new(id: PaymentId, order_id: OrderId, method: PaymentMethod, status: PaymentStatus) -> Self {
        Self {
            id,
            order_id,
            method,
            status,
        }
    }

    /// Pure settlement precondition: the charged amount must be positive.
    ///
    /// Method validity is guaranteed by construction, so this predicate
    /// only inspects the amount. No side effects; usable on its own in
    /// tests.
    pub fn validate(&self, amount: Money) -> bool {
        amount.is_positive()
    }
}
