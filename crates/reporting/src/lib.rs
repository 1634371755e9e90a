//! Aggregation reports over the order store.
//!
//! Reports are read-only and observe committed state only: the store's
//! atomic commit discipline means a half-placed order is never visible
//! here, so counts can never include an order whose items are missing.

pub mod error;
pub mod service;

pub use error::{ReportingError, Result};
pub use service::ReportService;
pub use store::CustomerOrderCount;
