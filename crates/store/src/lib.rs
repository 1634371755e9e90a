//! Persistence seam for the order-management system.
//!
//! The core depends on the traits in [`store`], never on a concrete backend:
//! - [`CustomerStore`], [`ProductStore`], [`OrderStore`] for per-entity access
//! - [`Store`] for opening a [`StoreTx`] transaction session, the atomic
//!   unit of work used by order placement
//!
//! Two backends implement the seam: [`MemoryStore`] for tests and local
//! development, and [`PostgresStore`] for production.

pub mod entities;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use entities::{
    Customer, CustomerOrderCount, NewCustomer, NewProduct, Order, OrderItem, Product,
};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{CustomerStore, OrderStore, ProductStore, Store, StoreTx};
