//! HTTP route handlers.

pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod reports;

use domain::{CustomerService, OrderService, ProductService};
use reporting::ReportService;

/// Shared application state accessible from all handlers.
///
/// Each service holds its own handle to the same underlying store.
pub struct AppState<S> {
    pub customers: CustomerService<S>,
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
    pub reports: ReportService<S>,
}
