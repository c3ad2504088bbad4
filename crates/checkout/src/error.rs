//! Checkout error types.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that abort a checkout or cart operation.
///
/// A declined settlement is not among them: payment failure is a valid
/// outcome carried in [`crate::CheckoutOutcome`], not an error.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was attempted on an empty cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// The cart total was not strictly positive.
    #[error("Invalid cart total: {cents} cents")]
    InvalidTotal { cents: i64 },

    /// A domain rule was violated (quantity, stock, state transition).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The persistence gateway failed on the critical path.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
