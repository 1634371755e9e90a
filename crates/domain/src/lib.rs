//! Domain services for the order-management system.
//!
//! The services here are generic over the store seam defined in the `store`
//! crate: [`OrderService`] runs the transactional order-placement workflow,
//! [`CustomerService`] and [`ProductService`] cover entity maintenance, and
//! [`validation`] holds the explicit per-input validators that run before
//! anything reaches a store.

pub mod customers;
pub mod error;
pub mod orders;
pub mod products;
pub mod validation;

pub use customers::CustomerService;
pub use error::{DomainError, EntityKind};
pub use orders::{OrderLine, OrderReceipt, OrderService, PlaceOrderRequest, ReceiptLine};
pub use products::ProductService;
pub use validation::{FieldError, ValidationErrors};
