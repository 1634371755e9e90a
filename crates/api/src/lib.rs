//! HTTP API server for the order-management system.
//!
//! Exposes customer and product CRUD, transactional order placement, the
//! per-customer reports, and operational endpoints (`/health`, `/metrics`),
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::{CustomerService, OrderService, ProductService};
use metrics_exporter_prometheus::PrometheusHandle;
use reporting::ReportService;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the shared application state over the given store.
pub fn create_state<S: Store + Clone>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        customers: CustomerService::new(store.clone()),
        products: ProductService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        reports: ReportService::new(store),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/customers", post(routes::customers::create::<S>))
        .route("/customers", get(routes::customers::list::<S>))
        .route("/customers/{id}", get(routes::customers::get::<S>))
        .route("/customers/{id}", put(routes::customers::update::<S>))
        .route("/customers/{id}/orders", get(routes::orders::by_customer::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::remove::<S>))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/reports/orders-per-customer",
            get(routes::reports::orders_per_customer::<S>),
        )
        .route(
            "/reports/top-customers",
            get(routes::reports::top_customers::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
