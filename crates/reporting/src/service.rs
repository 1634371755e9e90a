//! Report service over the order store.

use store::{CustomerOrderCount, OrderStore};

use crate::error::{ReportingError, Result};

/// Computes per-customer order statistics directly from the order store.
pub struct ReportService<S> {
    store: S,
}

impl<S: OrderStore> ReportService<S> {
    /// Creates a new report service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// One row per customer with at least one order, ordered by customer id
    /// ascending. Customers without orders are excluded by contract: the
    /// report answers who has ordered, not what every customer's count is.
    #[tracing::instrument(skip(self))]
    pub async fn order_count_per_customer(&self) -> Result<Vec<CustomerOrderCount>> {
        let rows = self.store.order_count_per_customer().await?;
        tracing::debug!(rows = rows.len(), "orders-per-customer report");
        Ok(rows)
    }

    /// The `limit` customers with the most orders, ordered by order count
    /// descending. Ties break on customer id ascending so the ranking is
    /// stable for a fixed snapshot of data.
    #[tracing::instrument(skip(self))]
    pub async fn top_customers(&self, limit: u32) -> Result<Vec<CustomerOrderCount>> {
        if limit == 0 {
            return Err(ReportingError::InvalidLimit);
        }
        let rows = self.store.top_customers(limit).await?;
        tracing::debug!(rows = rows.len(), limit, "top-customers report");
        Ok(rows)
    }
}
