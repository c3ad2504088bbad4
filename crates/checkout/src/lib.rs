//! Checkout orchestration for the bookshop engine.
//!
//! This crate drives the cart-to-order-to-settlement pipeline:
//! 1. Validate the cart and reserve every line against the ledger
//! 2. Create the order with a snapshot total
//! 3. Settle the payment with deterministic per-method rules
//! 4. On success: record the payment, confirm the order, decrement
//!    stock per line (best effort), clear the cart
//! 5. On failure: record the failed attempt and leave the order
//!    pending for a retry
//!
//! It also provides the inventory ledger, the per-customer cart session
//! cache, and tracing initialization.

pub mod error;
pub mod ledger;
pub mod service;
pub mod sessions;
pub mod settlement;
pub mod telemetry;

pub use error::CheckoutError;
pub use ledger::InventoryLedger;
pub use service::{CheckoutOutcome, CheckoutService};
pub use sessions::CartSessions;
pub use settlement::PaymentRequest;
