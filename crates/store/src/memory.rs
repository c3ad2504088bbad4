//! In-memory gateway implementation for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{BookId, CustomerId, OrderId, PaymentId};
use domain::{Book, Money, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::repository::Repository;

#[derive(Debug, Default)]
struct State {
    books: HashMap<BookId, Book>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    cart_lines: HashMap<CustomerId, Vec<(BookId, u32)>>,
    fail_on_decrement: bool,
    decrement_failures: HashSet<BookId>,
}

/// In-memory gateway implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure injection and row-count accessors for assertions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures `decrement_stock` to fail until switched back off.
    pub async fn set_fail_on_decrement(&self, fail: bool) {
        self.state.write().await.fail_on_decrement = fail;
    }

    /// Configures `decrement_stock` to fail for one specific book only.
    pub async fn fail_decrement_for(&self, id: BookId) {
        self.state.write().await.decrement_failures.insert(id);
    }

    /// Returns the number of order rows.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of payment rows.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }
}

#[async_trait]
impl Repository for InMemoryStore {
    async fn get_book(&self, id: BookId) -> Result<Book> {
        self.state
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::BookNotFound(id))
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let state = self.state.read().await;
        let mut books: Vec<_> = state.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn insert_book(&self, book: &Book) -> Result<()> {
        self.state.write().await.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&book.id) {
            return Err(StoreError::BookNotFound(book.id));
        }
        state.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn decrement_stock(&self, id: BookId, qty: u32) -> Result<u32> {
        let mut state = self.state.write().await;
        if state.fail_on_decrement || state.decrement_failures.contains(&id) {
            return Err(StoreError::Injected("decrement_stock"));
        }
        let book = state
            .books
            .get_mut(&id)
            .ok_or(StoreError::BookNotFound(id))?;
        book.stock = book.stock.saturating_sub(qty);
        Ok(book.stock)
    }

    async fn create_order(
        &self,
        customer_id: CustomerId,
        total: Money,
        status: OrderStatus,
    ) -> Result<OrderId> {
        let id = OrderId::new();
        let order = Order::from_parts(id, customer_id, total, status, Utc::now())?;
        self.state.write().await.orders.push(order);
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id() == id)
            .cloned()
            .ok_or(StoreError::OrderNotFound(id))
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or(StoreError::OrderNotFound(id))?;
        *order = Order::from_parts(
            order.id(),
            order.customer_id(),
            order.total_amount(),
            status,
            order.created_at(),
        )?;
        Ok(())
    }

    async fn add_payment(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<PaymentId> {
        let id = PaymentId::new();
        self.state
            .write()
            .await
            .payments
            .push(Payment::new(id, order_id, method, status));
        Ok(id)
    }

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        Ok(self
            .state
            .read()
            .await
            .payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn load_cart_lines(&self, customer_id: CustomerId) -> Result<Vec<(BookId, u32)>> {
        Ok(self
            .state
            .read()
            .await
            .cart_lines
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_cart_lines(
        &self,
        customer_id: CustomerId,
        lines: &[(BookId, u32)],
    ) -> Result<()> {
        self.state
            .write()
            .await
            .cart_lines
            .insert(customer_id, lines.to_vec());
        Ok(())
    }
}
