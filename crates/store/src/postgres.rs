//! PostgreSQL-backed gateway implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BookId, CustomerId, OrderId, PaymentId};
use domain::{Book, Money, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::repository::Repository;

/// PostgreSQL-backed gateway.
///
/// Holds an explicitly constructed, injected connection pool rather
/// than process-wide singleton state; clone the store to share the
/// pool, call [`PostgresStore::close`] for a scoped shutdown.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

/// Stock columns are BIGINT ≥ 0 by constraint; every write comes from a
/// `u32`, so the clamp only guards hand-edited rows.
fn to_u32(v: i64) -> u32 {
    u32::try_from(v).unwrap_or(0)
}

impl PostgresStore {
    /// Creates a gateway over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool from configuration.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        tracing::debug!(max_connections = config.max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool, waiting for in-flight connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_book(row: PgRow) -> Result<Book> {
        Ok(Book {
            id: BookId::from_uuid(row.try_get::<Uuid, _>("book_id")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: to_u32(row.try_get("stock")?),
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status_raw: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_raw)
            .ok_or_else(|| StoreError::InvalidRecord(format!("order status {status_raw:?}")))?;
        let order = Order::from_parts(
            OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            Money::from_cents(row.try_get("total_cents")?),
            status,
            row.try_get::<DateTime<Utc>, _>("created_at")?,
        )?;
        Ok(order)
    }

    fn row_to_payment(row: PgRow) -> Result<Payment> {
        let method_raw: String = row.try_get("method")?;
        let status_raw: String = row.try_get("status")?;
        Ok(Payment::new(
            PaymentId::from_uuid(row.try_get::<Uuid, _>("payment_id")?),
            OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            PaymentMethod::parse(&method_raw)
                .ok_or_else(|| StoreError::InvalidRecord(format!("payment method {method_raw:?}")))?,
            PaymentStatus::parse(&status_raw)
                .ok_or_else(|| StoreError::InvalidRecord(format!("payment status {status_raw:?}")))?,
        ))
    }
}

#[async_trait]
impl Repository for PostgresStore {
    async fn get_book(&self, id: BookId) -> Result<Book> {
        let row = sqlx::query(
            "SELECT book_id, title, author, price_cents, stock FROM books WHERE book_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::BookNotFound(id))?;

        Self::row_to_book(row)
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            "SELECT book_id, title, author, price_cents, stock FROM books ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_book).collect()
    }

    async fn insert_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, price_cents, stock)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(book.id.as_uuid())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price.cents())
        .bind(i64::from(book.stock))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, price_cents = $4, stock = $5
            WHERE book_id = $1
            "#,
        )
        .bind(book.id.as_uuid())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price.cents())
        .bind(i64::from(book.stock))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::BookNotFound(book.id));
        }
        Ok(())
    }

    async fn decrement_stock(&self, id: BookId, qty: u32) -> Result<u32> {
        // Single UPDATE so the row lock serializes concurrent decrements
        // of the same book; GREATEST keeps the non-negative constraint.
        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET stock = GREATEST(stock - $2, 0)
            WHERE book_id = $1
            RETURNING stock
            "#,
        )
        .bind(id.as_uuid())
        .bind(i64::from(qty))
        .fetch_optional(&self.pool)
        .await?;

        stock.map(to_u32).ok_or(StoreError::BookNotFound(id))
    }

    async fn create_order(
        &self,
        customer_id: CustomerId,
        total: Money,
        status: OrderStatus,
    ) -> Result<OrderId> {
        let id = OrderId::new();
        sqlx::query(
            r#"
            INSERT INTO orders (order_id, customer_id, total_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(customer_id.as_uuid())
        .bind(total.cents())
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query(
            "SELECT order_id, customer_id, total_cents, status, created_at FROM orders WHERE order_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::OrderNotFound(id))?;

        Self::row_to_order(row)
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, customer_id, total_cents, status, created_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }
        Ok(())
    }

    async fn add_payment(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Result<PaymentId> {
        let id = PaymentId::new();
        sqlx::query(
            r#"
            INSERT INTO payments (payment_id, order_id, method, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(method.as_str())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT payment_id, order_id, method, status
            FROM payments
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn load_cart_lines(&self, customer_id: CustomerId) -> Result<Vec<(BookId, u32)>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT book_id, quantity FROM cart_items WHERE customer_id = $1 ORDER BY book_id",
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(book_id, qty)| (BookId::from_uuid(book_id), to_u32(qty)))
            .collect())
    }

    async fn save_cart_lines(
        &self,
        customer_id: CustomerId,
        lines: &[(BookId, u32)],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE customer_id = $1")
            .bind(customer_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (book_id, qty) in lines {
            sqlx::query(
                r#"
                INSERT INTO cart_items (customer_id, book_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(customer_id.as_uuid())
            .bind(book_id.as_uuid())
            .bind(i64::from(*qty))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
