//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use reporting::ReportingError;

/// API-level error type that maps to HTTP responses.
///
/// Every response body carries a stable `code` alongside the human-readable
/// `error` message, so callers can branch without parsing message text.
#[derive(Debug)]
pub enum ApiError {
    /// Domain logic error.
    Domain(DomainError),
    /// Reporting error.
    Reporting(ReportingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Reporting(err) => reporting_error_to_response(err),
        };

        let body = serde_json::json!({ "code": code, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, &'static str, String) {
    match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        DomainError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, "INSUFFICIENT_STOCK", err.to_string())
        }
        DomainError::DuplicateValue { .. } => {
            (StatusCode::CONFLICT, "DUPLICATE_VALUE", err.to_string())
        }
        DomainError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
        }
        DomainError::Store(store_err) => {
            // Full context stays in the logs; callers get a generic message.
            tracing::error!(error = %store_err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "an unexpected error occurred".to_string(),
            )
        }
    }
}

fn reporting_error_to_response(err: ReportingError) -> (StatusCode, &'static str, String) {
    match &err {
        ReportingError::InvalidLimit => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
        }
        ReportingError::Store(store_err) => {
            tracing::error!(error = %store_err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "an unexpected error occurred".to_string(),
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        ApiError::Reporting(err)
    }
}
