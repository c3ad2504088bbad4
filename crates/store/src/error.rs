use common::{BookId, OrderId};
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur when interacting with the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The book does not exist.
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A persisted row violates a domain rule and cannot be rebuilt.
    #[error("Invalid persisted record: {0}")]
    InvalidRecord(String),

    /// A domain rule failed while rebuilding a record.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A failure injected by a test double.
    #[error("Injected failure: {0}")]
    Injected(&'static str),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, StoreError>;
