//! Order placement and retrieval.

mod service;

pub use service::OrderService;

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use serde::Serialize;
use store::Order;

/// One requested line of an order: which product, how many units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Input to [`OrderService::place_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    pub customer_id: CustomerId,
    /// Processed in the order given; duplicates of a product are allowed
    /// and each line sees the stock left by the lines before it.
    pub items: Vec<OrderLine>,
}

/// Response projection for a placed or fetched order.
///
/// The total is recomputed from the line items on every projection; it is
/// never read from stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<ReceiptLine>,
    pub total: Money,
}

/// One priced line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderReceipt {
    /// Projects a stored order into its receipt, field by field.
    pub fn from_order(order: Order) -> Self {
        let total = order.total();
        let items = order
            .items
            .into_iter()
            .map(|item| ReceiptLine {
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        Self {
            order_id: order.id,
            customer_id: order.customer_id,
            placed_at: order.placed_at,
            items,
            total,
        }
    }
}
