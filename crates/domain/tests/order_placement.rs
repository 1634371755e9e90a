//! Integration tests for the order-placement workflow.
//!
//! These exercise the placement engine end to end against the in-memory
//! store: atomicity of failed attempts, stock conservation under concurrent
//! placements, price-snapshot behavior, and report-facing read paths.

use common::{CustomerId, Money, ProductId};
use domain::{
    CustomerService, DomainError, EntityKind, OrderLine, OrderService, PlaceOrderRequest,
    ProductService,
};
use store::{MemoryStore, NewCustomer, NewProduct, ProductStore};

fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: format!("{name}@example.com"),
        phone: format!("+1-555-{name}"),
    }
}

fn new_product(name: &str, price_cents: i64, stock: u32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        stock,
    }
}

fn request(customer_id: CustomerId, lines: &[(ProductId, u32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_id,
        items: lines
            .iter()
            .map(|&(product_id, quantity)| OrderLine { product_id, quantity })
            .collect(),
    }
}

struct Fixture {
    store: MemoryStore,
    customers: CustomerService<MemoryStore>,
    products: ProductService<MemoryStore>,
    orders: OrderService<MemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = MemoryStore::new();
        Self {
            customers: CustomerService::new(store.clone()),
            products: ProductService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            store,
        }
    }

    async fn stock_of(&self, product_id: ProductId) -> u32 {
        self.store
            .find_product(product_id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }
}

#[tokio::test]
async fn scenario_a_successful_placement() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let receipt = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 3)]))
        .await
        .unwrap();

    assert_eq!(fx.stock_of(p1.id).await, 2);
    assert_eq!(receipt.total.cents(), 3000);
    assert_eq!(receipt.items[0].unit_price.cents(), 1000);
    assert_eq!(receipt.items[0].product_name, "widget");
}

#[tokio::test]
async fn scenario_b_insufficient_stock_leaves_stock_untouched() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 2)).await.unwrap();

    let err = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 5)]))
        .await
        .unwrap_err();

    match err {
        DomainError::InsufficientStock { product_id, requested, available } => {
            assert_eq!(product_id, p1.id);
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(fx.stock_of(p1.id).await, 2);
    assert!(fx.orders.orders_for_customer(c1.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_c_unknown_customer_touches_nothing() {
    let fx = Fixture::new();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let err = fx
        .orders
        .place_order(request(CustomerId::new(404), &[(p1.id, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::NotFound { kind: EntityKind::Customer, id: 404 }
    ));
    assert_eq!(fx.stock_of(p1.id).await, 5);
}

#[tokio::test]
async fn scenario_d_concurrent_placements_never_oversell() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let c2 = fx.customers.register(new_customer("c2")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let store = fx.store.clone();
    let t1 = tokio::spawn({
        let store = store.clone();
        let req = request(c1.id, &[(p1.id, 3)]);
        async move { OrderService::new(store).place_order(req).await }
    });
    let t2 = tokio::spawn({
        let store = store.clone();
        let req = request(c2.id, &[(p1.id, 3)]);
        async move { OrderService::new(store).place_order(req).await }
    });

    let results = [t1.await.unwrap(), t2.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let stock_failures = results
        .iter()
        .filter(|r| matches!(r, Err(DomainError::InsufficientStock { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(stock_failures, 1);
    assert_eq!(fx.stock_of(p1.id).await, 2);
}

#[tokio::test]
async fn failure_at_a_later_line_rolls_back_earlier_decrements() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();
    let p2 = fx.products.add(new_product("gadget", 500, 1)).await.unwrap();

    // Line 1 would decrement p1, line 2 fails on p2's stock.
    let err = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 2), (p2.id, 5)]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InsufficientStock { .. }));

    assert_eq!(fx.stock_of(p1.id).await, 5);
    assert_eq!(fx.stock_of(p2.id).await, 1);
    assert!(fx.orders.orders_for_customer(c1.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_product_mid_list_aborts_the_whole_attempt() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let err = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 2), (ProductId::new(999), 1)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::NotFound { kind: EntityKind::Product, id: 999 }
    ));
    assert_eq!(fx.stock_of(p1.id).await, 5);
}

#[tokio::test]
async fn stock_is_conserved_across_many_placements() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 250, 20)).await.unwrap();

    let mut placed: u32 = 0;
    for quantity in [1_u32, 2, 3, 4, 5] {
        fx.orders
            .place_order(request(c1.id, &[(p1.id, quantity)]))
            .await
            .unwrap();
        placed += quantity;
    }

    let receipts = fx.orders.orders_for_customer(c1.id).await.unwrap();
    let ordered: u32 = receipts
        .iter()
        .flat_map(|r| r.items.iter())
        .map(|item| item.quantity)
        .sum();

    assert_eq!(ordered, placed);
    assert_eq!(fx.stock_of(p1.id).await, 20 - placed);
}

#[tokio::test]
async fn line_prices_are_frozen_against_later_repricing() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let receipt = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 2)]))
        .await
        .unwrap();
    assert_eq!(receipt.total.cents(), 2000);

    // Re-price the product after the fact.
    fx.products
        .update(p1.id, new_product("widget", 9900, 3))
        .await
        .unwrap();

    let stored = fx.orders.get_order(receipt.order_id).await.unwrap();
    assert_eq!(stored.items[0].unit_price.cents(), 1000);
    assert_eq!(stored.total.cents(), 2000);
}

#[tokio::test]
async fn receipts_survive_product_deletion() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();

    let receipt = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 1)]))
        .await
        .unwrap();

    fx.products.delete(p1.id).await.unwrap();

    let stored = fx.orders.get_order(receipt.order_id).await.unwrap();
    assert_eq!(stored.items[0].product_name, "widget");
    assert_eq!(stored.total.cents(), 1000);
}

#[tokio::test]
async fn receipts_for_a_customer_come_back_in_placement_order() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 100, 50)).await.unwrap();

    let mut ids = Vec::new();
    for quantity in 1..=3 {
        let receipt = fx
            .orders
            .place_order(request(c1.id, &[(p1.id, quantity)]))
            .await
            .unwrap();
        ids.push(receipt.order_id);
    }

    let receipts = fx.orders.orders_for_customer(c1.id).await.unwrap();
    let fetched: Vec<_> = receipts.iter().map(|r| r.order_id).collect();
    assert_eq!(fetched, ids);
}

#[tokio::test]
async fn a_multi_line_order_prices_each_line_independently() {
    let fx = Fixture::new();
    let c1 = fx.customers.register(new_customer("c1")).await.unwrap();
    let p1 = fx.products.add(new_product("widget", 1000, 5)).await.unwrap();
    let p2 = fx.products.add(new_product("gadget", 550, 5)).await.unwrap();

    let receipt = fx
        .orders
        .place_order(request(c1.id, &[(p1.id, 2), (p2.id, 3)]))
        .await
        .unwrap();

    assert_eq!(receipt.items.len(), 2);
    assert_eq!(receipt.items[0].product_id, p1.id);
    assert_eq!(receipt.items[1].product_id, p2.id);
    assert_eq!(receipt.total.cents(), 2 * 1000 + 3 * 550);
    assert_eq!(fx.stock_of(p1.id).await, 3);
    assert_eq!(fx.stock_of(p2.id).await, 2);
}
