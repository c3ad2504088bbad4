//! Domain layer for the bookshop checkout engine.
//!
//! This crate provides the core domain types and rules:
//! - `Money` value object (integer cents)
//! - `Book` inventory record
//! - `Cart` and `CartItem` with derived totals
//! - `Order` with its constrained status lifecycle
//! - `Payment` with canonical method/status enumerations
//! - `User` with role-based capability tagging

pub mod book;
pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod user;

pub use book::Book;
pub use cart::{Cart, CartItem};
pub use error::DomainError;
pub use money::Money;
pub use order::{Order, OrderStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use user::{Role, User};
