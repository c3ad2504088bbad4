//! The gateway trait the core depends on.

use async_trait::async_trait;
use common::{BookId, CustomerId, OrderId, PaymentId};
use domain::{Book, Money, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus};

use crate::Result;

/// Durable storage behind the checkout engine.
///
/// All implementations must be thread-safe (Send + Sync). Callers treat
/// every method as fallible; whether a storage failure aborts the
/// surrounding operation is the caller's policy, not the gateway's.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fetches a book, failing with `BookNotFound` when absent.
    async fn get_book(&self, id: BookId) -> Result<Book>;

    /// Lists the whole catalog.
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// Adds a new book to the catalog.
    async fn insert_book(&self, book: &Book) -> Result<()>;

    /// Rewrites a book's catalog fields (price, stock, title, author).
    async fn update_book(&self, book: &Book) -> Result<()>;

    /// Atomically decrements a book's stock, clamping at zero.
    ///
    /// Returns the stock level after the decrement. The clamp is a
    /// defensive floor; a caller that reserved first never reaches it.
    async fn decrement_stock(&self, id: BookId, qty: u32) -> Result<u32>;

    /// Creates an order row and returns its id.
    async fn create_order(
        &self,
        customer_id: CustomerId,
        total: Money,
        status: OrderStatus,
    ) -> Result<OrderId>;

    /// Fetches an order, failing with `OrderNotFound` when absent.
    async fn get_order(&self, id: OrderId) -> Result<Order>;

    /// Lists a customer's orders, oldest first.
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// Writes an order's status.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()>;

    /// Appends a settlement attempt row and returns its id.
    ///
    /// Rows are append-only: a retried checkout adds a new row rather
    /// than updating an earlier attempt.
    async fn add_payment(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<PaymentId>;

    /// Lists an order's settlement attempts, oldest first.
    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>>;

    /// Loads a customer's persisted cart lines.
    async fn load_cart_lines(&self, customer_id: CustomerId) -> Result<Vec<(BookId, u32)>>;

    /// Replaces a customer's persisted cart lines with the given set.
    async fn save_cart_lines(&self, customer_id: CustomerId, lines: &[(BookId, u32)])
    -> Result<()>;
}
