//! Integration tests for the checkout pipeline.

use checkout::{CartSessions, CheckoutError, CheckoutService, PaymentRequest};
use common::{BookId, CustomerId};
use domain::{Book, Cart, DomainError, Money, OrderStatus, PaymentMethod, PaymentStatus};
use store::{InMemoryStore, Repository};

struct TestHarness {
    store: InMemoryStore,
    service: CheckoutService<InMemoryStore>,
    sessions: CartSessions<InMemoryStore>,
    customer: CustomerId,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let service = CheckoutService::new(store.clone());
        let sessions = CartSessions::new(store.clone());
        Self {
            store,
            service,
            sessions,
            customer: CustomerId::new(),
        }
    }

    async fn seed_book(&self, title: &str, price_cents: i64, stock: u32) -> Book {
        let book = Book::new(
            BookId::new(),
            title,
            "Author",
            Money::from_cents(price_cents),
            stock,
        )
        .unwrap();
        self.store.insert_book(&book).await.unwrap();
        book
    }

    async fn cart_with(&self, lines: &[(&Book, u32)]) -> Cart {
        let mut cart = Cart::new(self.customer);
        for (book, qty) in lines {
            cart.add_item(book, *qty).unwrap();
        }
        cart
    }

    async fn stock_of(&self, book: &Book) -> u32 {
        self.store.get_book(book.id).await.unwrap().stock
    }
}

fn good_card() -> PaymentRequest {
    PaymentRequest::card("4111111111111111", "123")
}

fn declined_card() -> PaymentRequest {
    PaymentRequest::card("5111111111111111", "123")
}

#[tokio::test]
async fn empty_cart_fails_and_creates_no_order() {
    let h = TestHarness::new();
    let mut cart = Cart::new(h.customer);

    let err = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(h.store.order_count().await, 0);
    assert_eq!(h.store.payment_count().await, 0);
}

#[tokio::test]
async fn insufficient_stock_on_any_line_creates_no_order() {
    let h = TestHarness::new();
    let plenty = h.seed_book("Plenty", 1000, 10).await;
    let scarce = h.seed_book("Scarce", 500, 1).await;
    let mut cart = h.cart_with(&[(&plenty, 2), (&scarce, 3)]).await;

    let err = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Domain(DomainError::InsufficientStock {
            requested: 3,
            available: 1,
            ..
        })
    ));
    // Reservation is all-or-nothing before creation: no rows, no
    // stock movement, cart intact.
    assert_eq!(h.store.order_count().await, 0);
    assert_eq!(h.stock_of(&plenty).await, 10);
    assert_eq!(cart.line_count(), 2);
}

#[tokio::test]
async fn successful_card_checkout_confirms_and_decrements() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let b = h.seed_book("B", 500, 5).await;
    let mut cart = h.cart_with(&[(&a, 2), (&b, 1)]).await;

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap();

    assert!(outcome.is_confirmed());
    assert_eq!(outcome.status, PaymentStatus::Success);
    assert_eq!(outcome.total, Money::from_cents(2500));

    let order = h.store.get_order(outcome.order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Confirmed);
    assert_eq!(order.total_amount(), Money::from_cents(2500));

    assert_eq!(h.stock_of(&a).await, 3);
    assert_eq!(h.stock_of(&b).await, 4);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn declined_card_leaves_order_pending_and_state_untouched() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let mut cart = h.cart_with(&[(&a, 2)]).await;

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, declined_card())
        .await
        .unwrap();

    assert!(!outcome.is_confirmed());
    assert_eq!(outcome.status, PaymentStatus::Failed);

    // An order row exists even for the failed attempt.
    let order = h.store.get_order(outcome.order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Pending);

    let payments = h.store.payments_for_order(outcome.order_id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Failed);

    // Stock and cart survive for a retry.
    assert_eq!(h.stock_of(&a).await, 5);
    assert_eq!(cart.line_count(), 1);
}

#[tokio::test]
async fn cod_always_succeeds_regardless_of_details() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 300, 2).await;
    let mut cart = h.cart_with(&[(&a, 1)]).await;

    let outcome = h
        .service
        .checkout(
            h.customer,
            &mut cart,
            PaymentRequest::cod().with_detail("anything", "at all"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, PaymentStatus::Success);
    assert_eq!(outcome.method, PaymentMethod::Cod);
}

#[tokio::test]
async fn upi_scenario_settles_the_expected_total() {
    let h = TestHarness::new();
    let a = h.seed_book("BookA", 1000, 5).await;
    let b = h.seed_book("BookB", 500, 5).await;
    let mut cart = h.cart_with(&[(&a, 2), (&b, 1)]).await;

    assert_eq!(cart.calculate_total(), Money::from_cents(2500));

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, PaymentRequest::upi("user@UPI"))
        .await
        .unwrap();

    assert_eq!(outcome.status, PaymentStatus::Success);
    assert_eq!(outcome.method, PaymentMethod::Upi);
    assert!(cart.is_empty());

    let order = h.store.get_order(outcome.order_id).await.unwrap();
    assert_eq!(order.total_amount(), Money::from_cents(2500));
}

#[tokio::test]
async fn unrecognized_method_settles_under_card_rules() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let mut cart = h.cart_with(&[(&a, 1)]).await;

    let outcome = h
        .service
        .checkout(
            h.customer,
            &mut cart,
            PaymentRequest::new("wire")
                .with_detail("card_number", "4111111111111111")
                .with_detail("cvv", "123"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.method, PaymentMethod::Card);
    assert_eq!(outcome.status, PaymentStatus::Success);

    let payments = h.store.payments_for_order(outcome.order_id).await.unwrap();
    assert_eq!(payments[0].method, PaymentMethod::Card);
}

#[tokio::test]
async fn retry_on_same_order_appends_payment_rows() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let mut cart = h.cart_with(&[(&a, 2)]).await;

    let first = h
        .service
        .checkout(h.customer, &mut cart, declined_card())
        .await
        .unwrap();
    assert_eq!(first.status, PaymentStatus::Failed);

    let second = h
        .service
        .retry_payment(h.customer, first.order_id, &mut cart, good_card())
        .await
        .unwrap();

    // Same order, two attempt rows, charged at the snapshot total.
    assert_eq!(second.order_id, first.order_id);
    assert_eq!(second.status, PaymentStatus::Success);
    assert_eq!(second.total, Money::from_cents(2000));

    let payments = h.store.payments_for_order(first.order_id).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].status, PaymentStatus::Failed);
    assert_eq!(payments[1].status, PaymentStatus::Success);

    let order = h.store.get_order(first.order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Confirmed);
    assert_eq!(h.stock_of(&a).await, 3);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn retry_on_confirmed_order_is_rejected() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let mut cart = h.cart_with(&[(&a, 1)]).await;

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap();
    assert!(outcome.is_confirmed());

    let mut retry_cart = h.cart_with(&[(&a, 1)]).await;
    let err = h
        .service
        .retry_payment(h.customer, outcome.order_id, &mut retry_cart, good_card())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Domain(DomainError::TerminalStateViolation {
            current: OrderStatus::Confirmed,
            ..
        })
    ));
    assert_eq!(h.store.payment_count().await, 1);
}

#[tokio::test]
async fn snapshot_total_survives_later_price_changes() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let mut cart = h.cart_with(&[(&a, 2)]).await;

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap();

    // Reprice the catalog after the order is placed.
    let mut repriced = h.store.get_book(a.id).await.unwrap();
    repriced.price = Money::from_cents(9999);
    h.store.update_book(&repriced).await.unwrap();

    let order = h.store.get_order(outcome.order_id).await.unwrap();
    assert_eq!(order.total_amount(), Money::from_cents(2000));
}

#[tokio::test]
async fn one_failed_decrement_does_not_block_the_batch() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let b = h.seed_book("B", 500, 5).await;
    let mut cart = h.cart_with(&[(&a, 2), (&b, 1)]).await;

    h.store.fail_decrement_for(a.id).await;

    let outcome = h
        .service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap();

    // The checkout decision stands; the failed line is skipped, the
    // rest of the batch still applies.
    assert!(outcome.is_confirmed());
    let order = h.store.get_order(outcome.order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Confirmed);
    assert_eq!(h.stock_of(&a).await, 5);
    assert_eq!(h.stock_of(&b).await, 4);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn order_history_lists_each_attempted_checkout() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 9).await;

    let mut cart = h.cart_with(&[(&a, 1)]).await;
    h.service
        .checkout(h.customer, &mut cart, declined_card())
        .await
        .unwrap();

    let mut cart = h.cart_with(&[(&a, 2)]).await;
    h.service
        .checkout(h.customer, &mut cart, good_card())
        .await
        .unwrap();

    let history = h.service.order_history(h.customer).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status(), OrderStatus::Pending);
    assert_eq!(history[1].status(), OrderStatus::Confirmed);

    assert!(
        h.service
            .order_history(CustomerId::new())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn session_checkout_clears_cart_and_persisted_lines() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    let b = h.seed_book("B", 500, 5).await;

    h.sessions.add_to_cart(h.customer, a.id, 2).await.unwrap();
    h.sessions.add_to_cart(h.customer, b.id, 1).await.unwrap();

    let outcome = h
        .sessions
        .checkout(&h.service, h.customer, PaymentRequest::upi("shop@upi"))
        .await
        .unwrap();

    assert!(outcome.is_confirmed());
    assert!(h.sessions.cart(h.customer).await.unwrap().is_empty());
    assert!(h.store.load_cart_lines(h.customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn session_checkout_keeps_cart_on_decline() {
    let h = TestHarness::new();
    let a = h.seed_book("A", 1000, 5).await;
    h.sessions.add_to_cart(h.customer, a.id, 2).await.unwrap();

    let outcome = h
        .sessions
        .checkout(&h.service, h.customer, declined_card())
        .await
        .unwrap();

    assert!(!outcome.is_confirmed());
    let cart = h.sessions.cart(h.customer).await.unwrap();
    assert_eq!(cart.lines(), vec![(a.id, 2)]);
    assert_eq!(
        h.store.load_cart_lines(h.customer).await.unwrap(),
        vec![(a.id, 2)]
    );
}
