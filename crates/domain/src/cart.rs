//! Customer cart and its line items.

use common::{BookId, CustomerId};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::error::DomainError;
use crate::money::Money;

/// One cart line: a book reference with a purchase quantity.
///
/// The unit price is locked from the book's catalog price at the moment
/// the line is created; the subtotal is always derived from it, never
/// stored, so it cannot go stale when the quantity changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub book_id: BookId,
    pub title: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartItem {
    fn new(book: &Book, quantity: u32) -> Self {
        Self {
            book_id: book.id,
            title: book.title.clone(),
            unit_price: book.price,
            quantity,
        }
    }

    /// Returns `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An in-memory, per-customer collection of cart lines.
///
/// Invariant: at most one line per book id. The persisted form is the
/// `(book_id, quantity)` pair list returned by [`Cart::lines`];
/// persisting it is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    customer_id: CustomerId,
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart for a customer.
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            items: Vec::new(),
        }
    }

    /// Returns the owning customer.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the cart lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `qty` units of a book.
    ///
    /// If the book already has a line its quantity accumulates; a new
    /// line is appended otherwise, locking the book's current price.
    pub fn add_item(&mut self, book: &Book, qty: u32) -> Result<(), DomainError> {
        if qty == 0 {
            return Err(DomainError::InvalidQuantity { quantity: qty });
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.book_id == book.id) {
            line.quantity += qty;
        } else {
            self.items.push(CartItem::new(book, qty));
        }
        Ok(())
    }

    /// Removes the line for a book. Removing an absent book is a no-op.
    pub fn remove_item(&mut self, book_id: BookId) {
        self.items.retain(|i| i.book_id != book_id);
    }

    /// Sets the quantity of an existing line.
    pub fn update_quantity(&mut self, book_id: BookId, new_qty: u32) -> Result<(), DomainError> {
        if new_qty == 0 {
            return Err(DomainError::InvalidQuantity { quantity: new_qty });
        }
        match self.items.iter_mut().find(|i| i.book_id == book_id) {
            Some(line) => {
                line.quantity = new_qty;
                Ok(())
            }
            None => Err(DomainError::ItemNotFound { book_id }),
        }
    }

    /// Returns the sum of all line subtotals.
    pub fn calculate_total(&self) -> Money {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Empties the cart. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the persistable `(book_id, quantity)` pairs.
    pub fn lines(&self) -> Vec<(BookId, u32)> {
        self.items.iter().map(|i| (i.book_id, i.quantity)).collect()
    }
}
