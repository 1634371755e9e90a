//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use store::{NewProduct, Product, Store};

use crate::error::ApiError;

use super::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

impl ProductRequest {
    fn into_new(self) -> NewProduct {
        NewProduct {
            name: self.name,
            price: Money::from_cents(self.price_cents),
            stock: self.stock,
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

fn to_response(product: Product) -> ProductResponse {
    ProductResponse {
        id: product.id.as_i64(),
        name: product.name,
        price_cents: product.price.cents(),
        stock: product.stock,
    }
}

// -- Handlers --

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state.products.add(req.into_new()).await?;
    Ok((StatusCode::CREATED, Json(to_response(product))))
}

/// GET /products — list all products.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products.into_iter().map(to_response).collect()))
}

/// GET /products/:id — look up a product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.products.get(ProductId::new(id)).await?;
    Ok(Json(to_response(product)))
}

/// PUT /products/:id — fully replace a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .products
        .update(ProductId::new(id), req.into_new())
        .await?;
    Ok(Json(to_response(product)))
}

/// DELETE /products/:id — hard-delete a product.
#[tracing::instrument(skip(state))]
pub async fn remove<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.products.delete(ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
