//! Inventory ledger: stock reservation, decrement, and catalog writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::BookId;
use domain::{Book, DomainError, Money, User};
use store::Repository;

use crate::error::Result;

/// Owns all stock mutation on top of the persistence gateway.
///
/// Reservation is a pure sufficiency check so the orchestrator can
/// validate a whole cart before touching any stock. Commits for the
/// same book are serialized through a per-book lock; two checkouts
/// racing for the last unit cannot both decrement past it.
pub struct InventoryLedger<R> {
    repo: R,
    locks: Mutex<HashMap<BookId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: Repository> InventoryLedger<R> {
    /// Creates a ledger over the given gateway.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: BookId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(id).or_default().clone()
    }

    /// Fetches a book from the gateway.
    pub async fn get(&self, id: BookId) -> Result<Book> {
        Ok(self.repo.get_book(id).await?)
    }

    /// Checks that `qty` units are available. No mutation.
    pub async fn reserve(&self, id: BookId, qty: u32) -> Result<()> {
        let book = self.repo.get_book(id).await?;
        if qty > book.stock {
            return Err(DomainError::InsufficientStock {
                book_id: id,
                requested: qty,
                available: book.stock,
            }
            .into());
        }
        Ok(())
    }

    /// Decrements stock for a committed sale, clamping at zero.
    ///
    /// A caller that reserved first never triggers the clamp. Returns
    /// the stock level after the decrement.
    pub async fn commit(&self, id: BookId, qty: u32) -> Result<u32> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        Ok(self.repo.decrement_stock(id, qty).await?)
    }

    // Catalog management. Gated on the acting user's role rather than a
    // separate admin type.

    /// Adds a new title to the catalog.
    pub async fn add_book(
        &self,
        actor: &User,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Result<Book> {
        self.require_catalog_access(actor)?;
        let book = Book::new(BookId::new(), title, author, price, stock)?;
        self.repo.insert_book(&book).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "book added to catalog");
        Ok(book)
    }

    /// Changes a book's catalog price. Existing cart lines keep the
    /// price they locked at add time; placed orders are unaffected.
    pub async fn set_price(&self, actor: &User, id: BookId, price: Money) -> Result<Book> {
        self.require_catalog_access(actor)?;
        if price.is_negative() {
            return Err(DomainError::InvalidAmount {
                cents: price.cents(),
            }
            .into());
        }
        let mut book = self.repo.get_book(id).await?;
        book.price = price;
        self.repo.update_book(&book).await?;
        Ok(book)
    }

    /// Adds units to a book's stock.
    pub async fn restock(&self, actor: &User, id: BookId, additional: u32) -> Result<Book> {
        self.require_catalog_access(actor)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        let mut book = self.repo.get_book(id).await?;
        book.stock = book.stock.saturating_add(additional);
        self.repo.update_book(&book).await?;
        Ok(book)
    }

    fn require_catalog_access(&self, actor: &User) -> Result<()> {
        if !actor.role.can_manage_catalog() {
            return Err(DomainError::CatalogAccessDenied { role: actor.role }.into());
        }
        Ok(())
    }
}
