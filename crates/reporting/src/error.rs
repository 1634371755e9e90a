//! Reporting error types.

use thiserror::Error;

/// Errors that can occur while producing a report.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// The requested row limit was zero.
    #[error("report limit must be at least 1")]
    InvalidLimit,

    /// An error occurred in the order store.
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;
