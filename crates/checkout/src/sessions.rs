//! Per-customer cart cache over the persistence gateway.

use std::collections::HashMap;

use common::{BookId, CustomerId};
use domain::{Cart, DomainError};
use store::{Repository, StoreError};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::service::{CheckoutOutcome, CheckoutService};
use crate::settlement::PaymentRequest;

/// Cart session cache: load-on-miss, write-through on every mutation.
///
/// The in-memory cart is authoritative; the persisted lines are a
/// mirror kept current after each operation so a restarted process can
/// rehydrate. Lines referencing books that have since left the catalog
/// are dropped on rehydration with a warning.
pub struct CartSessions<R> {
    repo: R,
    carts: RwLock<HashMap<CustomerId, Cart>>,
}

impl<R: Repository + Clone> CartSessions<R> {
    /// Creates an empty session cache over the given gateway.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            carts: RwLock::new(HashMap::new()),
        }
    }

    async fn rehydrate(&self, customer_id: CustomerId) -> Result<Cart> {
        let mut cart = Cart::new(customer_id);
        for (book_id, qty) in self.repo.load_cart_lines(customer_id).await? {
            match self.repo.get_book(book_id).await {
                Ok(book) => cart.add_item(&book, qty)?,
                Err(StoreError::BookNotFound(_)) => {
                    tracing::warn!(%customer_id, %book_id, "dropping cart line for unknown book");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(cart)
    }

    /// Fills the cache entry for a customer if absent.
    async fn ensure_loaded(&self, customer_id: CustomerId) -> Result<()> {
        if self.carts.read().await.contains_key(&customer_id) {
            return Ok(());
        }
        let cart = self.rehydrate(customer_id).await?;
        self.carts.write().await.entry(customer_id).or_insert(cart);
        Ok(())
    }

    /// Returns a snapshot of a customer's cart.
    pub async fn cart(&self, customer_id: CustomerId) -> Result<Cart> {
        self.ensure_loaded(customer_id).await?;
        let carts = self.carts.read().await;
        // Present by ensure_loaded above; a fresh empty cart otherwise.
        Ok(carts
            .get(&customer_id)
            .cloned()
            .unwrap_or_else(|| Cart::new(customer_id)))
    }

    /// Adds `qty` units of a book, validating existence and stock first.
    pub async fn add_to_cart(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
        qty: u32,
    ) -> Result<()> {
        if qty == 0 {
            return Err(DomainError::InvalidQuantity { quantity: qty }.into());
        }
        let book = self.repo.get_book(book_id).await?;
        if book.stock < qty {
            return Err(DomainError::InsufficientStock {
                book_id,
                requested: qty,
                available: book.stock,
            }
            .into());
        }

        self.ensure_loaded(customer_id).await?;
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(customer_id)
            .or_insert_with(|| Cart::new(customer_id));
        cart.add_item(&book, qty)?;
        let lines = cart.lines();
        drop(carts);

        Ok(self.repo.save_cart_lines(customer_id, &lines).await?)
    }

    /// Removes a book's line. Absent lines are a no-op.
    pub async fn remove_from_cart(&self, customer_id: CustomerId, book_id: BookId) -> Result<()> {
        self.ensure_loaded(customer_id).await?;
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(customer_id)
            .or_insert_with(|| Cart::new(customer_id));
        cart.remove_item(book_id);
        let lines = cart.lines();
        drop(carts);

        Ok(self.repo.save_cart_lines(customer_id, &lines).await?)
    }

    /// Sets the quantity of an existing line.
    pub async fn update_quantity(
        &self,
        customer_id: CustomerId,
        book_id: BookId,
        new_qty: u32,
    ) -> Result<()> {
        self.ensure_loaded(customer_id).await?;
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(customer_id)
            .or_insert_with(|| Cart::new(customer_id));
        cart.update_quantity(book_id, new_qty)?;
        let lines = cart.lines();
        drop(carts);

        Ok(self.repo.save_cart_lines(customer_id, &lines).await?)
    }

    /// Empties a customer's cart.
    pub async fn clear(&self, customer_id: CustomerId) -> Result<()> {
        self.ensure_loaded(customer_id).await?;
        self.carts
            .write()
            .await
            .entry(customer_id)
            .or_insert_with(|| Cart::new(customer_id))
            .clear();

        Ok(self.repo.save_cart_lines(customer_id, &[]).await?)
    }

    /// Runs a checkout for a customer through the given service.
    ///
    /// The cart is taken out of the cache for the duration of the run,
    /// so no cart mutation can interleave with settlement, and put back
    /// afterwards: emptied on success, untouched on a declined attempt
    /// or error.
    pub async fn checkout(
        &self,
        service: &CheckoutService<R>,
        customer_id: CustomerId,
        request: PaymentRequest,
    ) -> Result<CheckoutOutcome> {
        self.ensure_loaded(customer_id).await?;
        let mut cart = self
            .carts
            .write()
            .await
            .remove(&customer_id)
            .unwrap_or_else(|| Cart::new(customer_id));

        let result = service.checkout(customer_id, &mut cart, request).await;

        self.carts.write().await.insert(customer_id, cart);
        result
    }
}
