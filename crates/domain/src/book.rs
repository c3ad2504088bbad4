//! Book inventory record.

use common::BookId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// A catalog entry with its current price and stock level.
///
/// `stock` is the only mutable field; all mutation goes through the
/// inventory ledger so that sufficiency checks and decrements stay
/// serialized per book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Money,
    pub stock: u32,
}

impl Book {
    /// Creates a catalog entry, rejecting negative prices.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Result<Self, DomainError> {
        if price.is_negative() {
            return Err(DomainError::InvalidAmount {
                cents: price.cents(),
            });
        }
        Ok(Self {
            id,
            title: title.into(),
            author: author.into(),
            price,
            stock,
        })
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} by {} — {} (stock: {})",
            self.title, self.author, self.price, self.stock
        )
    }
}
