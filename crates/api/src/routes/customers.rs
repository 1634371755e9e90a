//! Customer CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use serde::{Deserialize, Serialize};
use store::{Customer, NewCustomer, Store};

use crate::error::ApiError;

use super::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerRequest {
    fn into_new(self) -> NewCustomer {
        NewCustomer {
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn to_response(customer: Customer) -> CustomerResponse {
    CustomerResponse {
        id: customer.id.as_i64(),
        name: customer.name,
        email: customer.email,
        phone: customer.phone,
    }
}

// -- Handlers --

/// POST /customers — register a new customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let customer = state.customers.register(req.into_new()).await?;
    Ok((StatusCode::CREATED, Json(to_response(customer))))
}

/// GET /customers — list all customers.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state.customers.list().await?;
    Ok(Json(customers.into_iter().map(to_response).collect()))
}

/// GET /customers/:id — look up a customer.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.get(CustomerId::new(id)).await?;
    Ok(Json(to_response(customer)))
}

/// PUT /customers/:id — fully replace a customer's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state
        .customers
        .update(CustomerId::new(id), req.into_new())
        .await?;
    Ok(Json(to_response(customer)))
}
