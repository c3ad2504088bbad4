//! Order record and its status lifecycle.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// The status of an order.
///
/// ```text
/// Pending ──┬──► Confirmed   (terminal)
///           └──► Cancelled
/// ```
///
/// `Confirmed` is terminal: no further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Created by checkout, awaiting a successful settlement.
    #[default]
    Pending,

    /// Settlement succeeded; the order is immutable from here on.
    Confirmed,

    /// The order was withdrawn before confirmation.
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns the status name in its persisted casing.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Parses the persisted casing back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A placed order.
///
/// The total is snapshotted from the cart when the order is created and
/// never recomputed, so later catalog price changes cannot retroactively
/// alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    total_amount: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order in `Pending` with the given snapshot total.
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        total_amount: Money,
    ) -> Result<Self, DomainError> {
        Self::from_parts(id, customer_id, total_amount, OrderStatus::Pending, Utc::now())
    }

    /// Rebuilds an order from its persisted fields.
    pub fn from_parts(
        id: OrderId,
        customer_id: CustomerId,
        total_amount: Money,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if total_amount.is_negative() {
            return Err(DomainError::InvalidAmount {
                cents: total_amount.cents(),
            });
        }
        Ok(Self {
            id,
            customer_id,
            total_amount,
            status,
            created_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the snapshot total fixed at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves the order to a new status.
    ///
    /// Once `Confirmed`, any call with a different target fails with
    /// `TerminalStateViolation` and leaves the status unchanged. A
    /// cancelled order likewise cannot return to `Pending` or
    /// `Confirmed`.
    pub fn update_status(&mut self, new_status: OrderStatus) -> Result<(), DomainError> {
        let blocked = match self.status {
            OrderStatus::Confirmed => new_status != OrderStatus::Confirmed,
            OrderStatus::Cancelled => new_status != OrderStatus::Cancelled,
            OrderStatus::Pending => false,
        };
        if blocked {
            return Err(DomainError::TerminalStateViolation {
                current: self.status,
                requested: new_status,
            });
        }
        self.status = new_status;
        Ok(())
    }

    /// Marks the order confirmed. Irreversible.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Confirmed)
    }

    /// Cancels the order. Fails on a confirmed order.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_order(cents: i64) -> Order {
        Order::new(OrderId::new(), CustomerId::new(), Money::from_cents(cents)).unwrap()
    }

    #[test]
    fn new_order_starts_pending() {
        let order = pending_order(2500);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount().cents(), 2500);
    }

    #[test]
    fn rejects_negative_total() {
        let err =
            Order::new(OrderId::new(), CustomerId::new(), Money::from_cents(-100)).unwrap_err();
        assert_eq!(err, DomainError::InvalidAmount { cents: -100 });
    }

    #[test]
    fn pending_can_confirm_or_cancel() {
        let mut order = pending_order(100);
        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        let mut order = pending_order(100);
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn confirmed_is_terminal() {
        let mut order = pending_order(100);
        order.confirm().unwrap();

        let err = order.update_status(OrderStatus::Pending).unwrap_err();
        assert_eq!(
            err,
            DomainError::TerminalStateViolation {
                current: OrderStatus::Confirmed,
                requested: OrderStatus::Pending,
            }
        );
        assert_eq!(order.status(), OrderStatus::Confirmed);

        let err = order.cancel().unwrap_err();
        assert!(matches!(err, DomainError::TerminalStateViolation { .. }));
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn confirming_a_confirmed_order_is_a_no_op() {
        let mut order = pending_order(100);
        order.confirm().unwrap();
        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn cancelled_cannot_come_back() {
        let mut order = pending_order(100);
        order.cancel().unwrap();

        assert!(order.confirm().is_err());
        assert!(order.update_status(OrderStatus::Pending).is_err());
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn status_round_trips_through_persisted_casing() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("confirmed"), None);
        assert_eq!(OrderStatus::parse("Shipped"), None);
    }

    #[test]
    fn order_serialization_round_trip() {
        let order = pending_order(2500);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }

    #[test]
    fn only_confirmed_is_terminal() {
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Cancelled.is_terminal());
    }
}
