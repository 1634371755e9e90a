//! Record types persisted by the store.
//!
//! These are plain data structures; all behavior lives in the services that
//! operate on them through the store traits.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Globally unique.
    pub email: String,
    /// Globally unique.
    pub phone: String,
}

/// Fields for registering a customer or fully replacing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price; strictly positive.
    pub price: Money,
    /// Available units; never negative.
    pub stock: u32,
}

/// Fields for adding a product or fully replacing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: u32,
}

/// A placed order with its owned line items.
///
/// Orders are immutable after creation and are always loaded eagerly,
/// items included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Set by the store at persistence time (server clock).
    pub placed_at: DateTime<Utc>,
    /// Non-empty; kept in the sequence the caller supplied.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total amount of the order, always derived from the line items.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// One line of an order.
///
/// `product_name` and `unit_price` are snapshots captured at placement time
/// and never change afterwards, even if the product is re-priced or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// One row of the orders-per-customer report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOrderCount {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub order_count: u64,
}
