//! Domain error types.

use common::BookId;
use thiserror::Error;

use crate::order::OrderStatus;
use crate::user::Role;

/// Errors that can occur while enforcing domain rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Quantity must be greater than zero.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// A monetary amount was negative.
    #[error("Invalid amount: {cents} cents (must not be negative)")]
    InvalidAmount { cents: i64 },

    /// The book has no line in the cart.
    #[error("Item not found in cart: {book_id}")]
    ItemNotFound { book_id: BookId },

    /// An email address failed shape validation.
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// An order in a terminal state was asked to change status.
    #[error("Illegal status transition: order is {current}, cannot move to {requested}")]
    TerminalStateViolation {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// Requested more units than the ledger holds.
    #[error("Insufficient stock for {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        book_id: BookId,
        requested: u32,
        available: u32,
    },

    /// The acting user's role does not permit catalog management.
    #[error("Role {role} may not manage the catalog")]
    CatalogAccessDenied { role: Role },
}
