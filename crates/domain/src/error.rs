//! Domain error taxonomy.

use common::ProductId;
use store::StoreError;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Kind of entity named by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Product,
    Order,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Customer => write!(f, "customer"),
            EntityKind::Product => write!(f, "product"),
            EntityKind::Order => write!(f, "order"),
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced customer, product, or order does not exist.
    #[error("{kind} not found with id {id}")]
    NotFound { kind: EntityKind, id: i64 },

    /// A product cannot cover the requested quantity.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A uniqueness constraint was violated.
    #[error("duplicate value for {field}")]
    DuplicateValue { field: &'static str },

    /// Input was rejected before reaching the store.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Unexpected store failure. Details are logged at the call site and
    /// never surfaced verbatim to callers.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { field } => DomainError::DuplicateValue { field },
            other => DomainError::Store(other),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}
