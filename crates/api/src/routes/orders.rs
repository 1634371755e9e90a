//! Order placement and retrieval endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, OrderId, ProductId};
use domain::{OrderLine, OrderReceipt, PlaceOrderRequest};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;

use super::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct OrderRequest {
    pub customer_id: i64,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: u32,
}

impl OrderRequest {
    fn into_place_order(self) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_id: CustomerId::new(self.customer_id),
            items: self
                .items
                .into_iter()
                .map(|item| OrderLine {
                    product_id: ProductId::new(item.product_id),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub placed_at: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

fn to_response(receipt: OrderReceipt) -> OrderResponse {
    let items = receipt
        .items
        .into_iter()
        .map(|item| OrderItemResponse {
            product_id: item.product_id.as_i64(),
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
        })
        .collect();

    OrderResponse {
        id: receipt.order_id.as_i64(),
        customer_id: receipt.customer_id.as_i64(),
        placed_at: receipt.placed_at.to_rfc3339(),
        items,
        total_cents: receipt.total.cents(),
    }
}

// -- Handlers --

/// POST /orders — place a new order.
#[tracing::instrument(skip(state, req))]
pub async fn place<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let receipt = state.orders.place_order(req.into_place_order()).await?;
    Ok((StatusCode::CREATED, Json(to_response(receipt))))
}

/// GET /orders/:id — look up an order.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let receipt = state.orders.get_order(OrderId::new(id)).await?;
    Ok(Json(to_response(receipt)))
}

/// GET /customers/:id/orders — all orders of one customer.
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let receipts = state
        .orders
        .orders_for_customer(CustomerId::new(id))
        .await?;
    Ok(Json(receipts.into_iter().map(to_response).collect()))
}
