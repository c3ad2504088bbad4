//! Shared identifier types used across the checkout engine crates.

pub mod types;

pub use types::{BookId, CustomerId, OrderId, PaymentId};
