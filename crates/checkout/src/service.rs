//! The checkout orchestrator.

use common::{CustomerId, OrderId, PaymentId};
use domain::{
    Cart, DomainError, Money, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus,
};
use store::Repository;

use crate::error::{CheckoutError, Result};
use crate::ledger::InventoryLedger;
use crate::settlement::{self, PaymentRequest};

/// The result of a checkout run.
///
/// Produced for both settled and declined attempts; `status` tells them
/// apart. A declined attempt leaves the order `Pending` and the cart
/// intact so the customer can retry with another method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub total: Money,
}

impl CheckoutOutcome {
    /// Returns true if the settlement succeeded and the order confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// Converts a validated cart into a settled order.
///
/// The service is the only writer of order status and the only creator
/// of payment rows. One checkout for one owner runs to completion
/// without interleaving with that owner's cart; cross-owner checkouts
/// may run concurrently because stock commits are serialized per book
/// inside the ledger.
pub struct CheckoutService<R: Repository> {
    repo: R,
    ledger: InventoryLedger<R>,
}

impl<R: Repository + Clone> CheckoutService<R> {
    /// Creates a checkout service over the given gateway.
    pub fn new(repo: R) -> Self {
        let ledger = InventoryLedger::new(repo.clone());
        Self { repo, ledger }
    }

    /// Returns the ledger sharing this service's gateway.
    pub fn ledger(&self) -> &InventoryLedger<R> {
        &self.ledger
    }

    /// Runs the full checkout pipeline for a customer's cart.
    ///
    /// On success the cart is cleared (and its emptied persisted line
    /// set written through); on a declined settlement the cart and its
    /// persisted lines are left untouched, and the order stays
    /// `Pending`. Storage failures on the critical path (order create,
    /// payment insert, status update) abort; failures in the per-line
    /// stock decrement loop are logged and skipped so one bad row
    /// cannot block the rest of the batch.
    #[tracing::instrument(skip(self, cart, request), fields(customer_id = %customer_id))]
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        cart: &mut Cart,
        request: PaymentRequest,
    ) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_attempts_total").increment(1);

        // Preconditions; nothing is mutated past this point until the
        // order row exists.
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = cart.calculate_total();
        if !total.is_positive() {
            return Err(CheckoutError::InvalidTotal {
                cents: total.cents(),
            });
        }

        // Reserve every line before creating anything. The first short
        // line aborts the whole checkout with no side effects.
        for item in cart.items() {
            self.ledger.reserve(item.book_id, item.quantity).await?;
        }

        // The order snapshots the total now; later price changes cannot
        // reach it. The row exists even if settlement is declined,
        // preserving the attempt trail.
        let order_id = self
            .repo
            .create_order(customer_id, total, OrderStatus::Pending)
            .await?;

        self.settle(customer_id, order_id, total, cart, request)
            .await
    }

    /// Retries settlement for an order whose earlier attempt failed.
    ///
    /// The order must still be `Pending`; its snapshot total is charged,
    /// not the cart's current total. Each retry appends a new payment
    /// row, preserving the attempt audit trail.
    #[tracing::instrument(skip(self, cart, request), fields(customer_id = %customer_id))]
    pub async fn retry_payment(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
        cart: &mut Cart,
        request: PaymentRequest,
    ) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_attempts_total").increment(1);

        let order = self.repo.get_order(order_id).await?;
        if order.status() != OrderStatus::Pending {
            return Err(DomainError::TerminalStateViolation {
                current: order.status(),
                requested: OrderStatus::Confirmed,
            }
            .into());
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Stock may have moved since the first attempt.
        for item in cart.items() {
            self.ledger.reserve(item.book_id, item.quantity).await?;
        }

        self.settle(customer_id, order_id, order.total_amount(), cart, request)
            .await
    }

    /// Steps 4–8 of the pipeline: normalize the method, evaluate the
    /// deterministic gateway rules, record the attempt, and commit or
    /// leave pending.
    async fn settle(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
        total: Money,
        cart: &mut Cart,
        request: PaymentRequest,
    ) -> Result<CheckoutOutcome> {
        let start = std::time::Instant::now();

        // Unrecognized method input falls back to Card and is settled
        // under Card rules.
        let method = PaymentMethod::parse(&request.method).unwrap_or_else(|| {
            tracing::warn!(
                supplied = %request.method,
                "unrecognized payment method, defaulting to Card"
            );
            PaymentMethod::Card
        });
        for issue in settlement::detail_issues(method, &request.details) {
            tracing::warn!(%order_id, issue, "malformed payment detail");
        }

        let payment = Payment::new(PaymentId::new(), order_id, method, PaymentStatus::Pending);
        let settled = payment.validate(total) && settlement::evaluate(method, &request.details);
        let status = if settled {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };

        self.repo.add_payment(order_id, method, status).await?;

        if settled {
            self.repo
                .update_order_status(order_id, OrderStatus::Confirmed)
                .await?;

            for item in cart.items() {
                if let Err(e) = self.ledger.commit(item.book_id, item.quantity).await {
                    tracing::warn!(
                        %order_id,
                        book_id = %item.book_id,
                        quantity = item.quantity,
                        error = %e,
                        "stock decrement failed, continuing with remaining lines"
                    );
                }
            }

            cart.clear();
            if let Err(e) = self.repo.save_cart_lines(customer_id, &[]).await {
                // The order is confirmed and paid; a failed cart-line
                // cleanup must not reverse that decision.
                tracing::warn!(%order_id, error = %e, "failed to persist cleared cart");
            }

            metrics::counter!("checkout_confirmed_total").increment(1);
            tracing::info!(%order_id, %method, %total, "checkout confirmed");
        } else {
            metrics::counter!("checkout_declined_total").increment(1);
            tracing::info!(%order_id, %method, "settlement declined, order left pending");
        }

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());

        Ok(CheckoutOutcome {
            order_id,
            method,
            status,
            total,
        })
    }

    /// Lists a customer's orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn order_history(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        Ok(self.repo.orders_for_customer(customer_id).await?)
    }
}
