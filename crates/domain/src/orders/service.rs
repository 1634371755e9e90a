//! The order-placement engine.

use std::time::Instant;

use common::{CustomerId, OrderId};
use store::{OrderItem, Store};

use crate::error::{DomainError, EntityKind};
use crate::validation;

use super::{OrderReceipt, PlaceOrderRequest};

/// Service running the transactional order-placement workflow.
///
/// Placement is a single atomic unit of work against the store: customer
/// lookup, per-line stock check and decrement, and the order insert either
/// all commit together or leave no trace.
pub struct OrderService<S> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order.
    ///
    /// Fails with `NotFound` if the customer or any product is missing, and
    /// with `InsufficientStock` if any line asks for more units than the
    /// product has. Any failure rolls back the whole attempt: no stock
    /// decrement from an earlier line survives and no order is created.
    #[tracing::instrument(
        skip(self, req),
        fields(customer_id = %req.customer_id, lines = req.items.len())
    )]
    pub async fn place_order(&self, req: PlaceOrderRequest) -> Result<OrderReceipt, DomainError> {
        validation::validate_place_order(&req)?;

        let started = Instant::now();
        let result = self.place_order_tx(&req).await;

        match &result {
            Ok(receipt) => {
                metrics::counter!("orders_placed_total").increment(1);
                metrics::histogram!("order_placement_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %receipt.order_id,
                    total_cents = receipt.total.cents(),
                    "order placed"
                );
            }
            Err(err) => {
                metrics::counter!("orders_rejected_total").increment(1);
                tracing::warn!(error = %err, "order placement failed");
            }
        }

        result
    }

    async fn place_order_tx(&self, req: &PlaceOrderRequest) -> Result<OrderReceipt, DomainError> {
        // Early returns drop the session, which discards every staged write.
        let mut tx = self.store.begin().await?;

        let customer = tx
            .find_customer(req.customer_id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Customer,
                id: req.customer_id.as_i64(),
            })?;

        let mut items = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let product = tx
                .find_product_for_update(line.product_id)
                .await?
                .ok_or(DomainError::NotFound {
                    kind: EntityKind::Product,
                    id: line.product_id.as_i64(),
                })?;

            if product.stock < line.quantity {
                return Err(DomainError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            tx.update_product_stock(product.id, product.stock - line.quantity)
                .await?;

            // Snapshot name and unit price now; the line item never changes
            // again, whatever happens to the product.
            items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }

        let order = tx.insert_order(customer.id, items).await?;
        tx.commit().await?;

        Ok(OrderReceipt::from_order(order))
    }

    /// Looks up a single order as a receipt.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<OrderReceipt, DomainError> {
        let order = self
            .store
            .find_order(id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Order,
                id: id.as_i64(),
            })?;
        Ok(OrderReceipt::from_order(order))
    }

    /// Returns all orders of a customer as receipts, ordered by placement
    /// time. Totals are recomputed from the stored line items.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderReceipt>, DomainError> {
        self.store
            .find_customer(customer_id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Customer,
                id: customer_id.as_i64(),
            })?;

        let orders = self.store.orders_by_customer(customer_id).await?;
        tracing::debug!(count = orders.len(), "fetched orders for customer");
        Ok(orders.into_iter().map(OrderReceipt::from_order).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};
    use store::{CustomerStore, MemoryStore, NewCustomer, NewProduct, ProductStore};

    use crate::orders::OrderLine;

    async fn seed(store: &MemoryStore) -> (CustomerId, ProductId) {
        let customer = store
            .insert_customer(NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: "+15551234".to_string(),
            })
            .await
            .unwrap();
        let product = store
            .insert_product(NewProduct {
                name: "widget".to_string(),
                price: Money::from_cents(1000),
                stock: 5,
            })
            .await
            .unwrap();
        (customer.id, product.id)
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

    #[tokio::test]
    async fn placing_an_order_decrements_stock_and_totals() {
        let store = MemoryStore::new();
        let (customer_id, product_id) = seed(&store).await;
        let service = OrderService::new(store.clone());

        let receipt = service
            .place_order(request(customer_id, &[(product_id, 3)]))
            .await
            .unwrap();

        assert_eq!(receipt.customer_id, customer_id);
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].product_name, "widget");
        assert_eq!(receipt.total.cents(), 3000);
        assert_eq!(store.find_product(product_id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn unknown_customer_fails_without_touching_stock() {
        let store = MemoryStore::new();
        let (_, product_id) = seed(&store).await;
        let service = OrderService::new(store.clone());

        let err = service
            .place_order(request(CustomerId::new(999), &[(product_id, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound { kind: EntityKind::Customer, id: 999 }
        ));
        assert_eq!(store.find_product(product_id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn insufficient_stock_reports_requested_and_available() {
        let store = MemoryStore::new();
        let (customer_id, product_id) = seed(&store).await;
        let service = OrderService::new(store.clone());

        let err = service
            .place_order(request(customer_id, &[(product_id, 8)]))
            .await
            .unwrap_err();

        match err {
            DomainError::InsufficientStock { product_id: p, requested, available } => {
                assert_eq!(p, product_id);
                assert_eq!(requested, 8);
                assert_eq!(available, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(store.find_product(product_id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn empty_item_list_is_rejected_before_the_transaction() {
        let store = MemoryStore::new();
        let (customer_id, _) = seed(&store).await;
        let service = OrderService::new(store);

        let err = service
            .place_order(request(customer_id, &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_lines_draw_from_the_same_stock() {
        let store = MemoryStore::new();
        let (customer_id, product_id) = seed(&store).await;
        let service = OrderService::new(store.clone());

        // 3 + 3 > 5: the second line must see the first line's decrement.
        let err = service
            .place_order(request(customer_id, &[(product_id, 3), (product_id, 3)]))
            .await
            .unwrap_err();

        match err {
            DomainError::InsufficientStock { requested, available, .. } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        // And the first line's decrement did not survive the rollback.
        assert_eq!(store.find_product(product_id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn orders_for_customer_requires_the_customer() {
        let store = MemoryStore::new();
        seed(&store).await;
        let service = OrderService::new(store);

        let err = service
            .orders_for_customer(CustomerId::new(42))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound { kind: EntityKind::Customer, id: 42 }
        ));
    }
}
