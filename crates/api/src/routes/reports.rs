//! Reporting endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use store::{CustomerOrderCount, Store};

use crate::error::ApiError;

use super::AppState;

/// Default row count for the top-customers report.
const DEFAULT_TOP_LIMIT: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct TopCustomersParams {
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct OrderCountResponse {
    pub customer_id: i64,
    pub customer_name: String,
    pub order_count: u64,
}

fn to_response(row: CustomerOrderCount) -> OrderCountResponse {
    OrderCountResponse {
        customer_id: row.customer_id.as_i64(),
        customer_name: row.customer_name,
        order_count: row.order_count,
    }
}

/// GET /reports/orders-per-customer — order counts grouped by customer.
#[tracing::instrument(skip(state))]
pub async fn orders_per_customer<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderCountResponse>>, ApiError> {
    let rows = state.reports.order_count_per_customer().await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// GET /reports/top-customers?limit=n — customers ranked by order count.
#[tracing::instrument(skip(state))]
pub async fn top_customers<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<TopCustomersParams>,
) -> Result<Json<Vec<OrderCountResponse>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let rows = state.reports.top_customers(limit).await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}
