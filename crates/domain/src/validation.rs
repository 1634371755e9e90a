//! Explicit input validation.
//!
//! Every mutating operation validates its input with one of the functions
//! here before touching a store. Failures come back as a structured list of
//! field-level errors rather than a single opaque message.

use serde::Serialize;
use store::{NewCustomer, NewProduct};

use crate::orders::PlaceOrderRequest;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A non-empty list of field errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns the collected field errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

/// Validates customer registration/update input.
pub fn validate_customer(new: &NewCustomer) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if new.name.trim().is_empty() {
        errors.push("name", "name is mandatory");
    }
    if new.email.trim().is_empty() {
        errors.push("email", "email is mandatory");
    } else if !is_valid_email(&new.email) {
        errors.push("email", "email should be a valid address");
    }
    if new.phone.trim().is_empty() {
        errors.push("phone", "phone is mandatory");
    }

    errors.into_result()
}

/// Validates product creation/update input.
pub fn validate_product(new: &NewProduct) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if new.name.trim().is_empty() {
        errors.push("name", "product name is mandatory");
    }
    if !new.price.is_positive() {
        errors.push("price", "price must be greater than 0");
    }

    errors.into_result()
}

/// Validates an order-placement request: at least one line, every quantity
/// at least 1.
pub fn validate_place_order(req: &PlaceOrderRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if req.items.is_empty() {
        errors.push("items", "at least one product must be included in the order");
    }
    for (index, line) in req.items.iter().enumerate() {
        if line.quantity < 1 {
            errors.push(format!("items[{index}].quantity"), "quantity must be at least 1");
        }
    }

    errors.into_result()
}

/// Minimal syntactic email check: one `@` with a non-empty local part and a
/// domain containing a dot, no whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
