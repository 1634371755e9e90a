//! Customer registration and maintenance.

use common::CustomerId;
use store::{Customer, CustomerStore, NewCustomer};

use crate::error::{DomainError, EntityKind};
use crate::validation;

/// Service for customer CRUD.
pub struct CustomerService<S> {
    store: S,
}

impl<S: CustomerStore> CustomerService<S> {
    /// Creates a new customer service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new customer.
    #[tracing::instrument(skip(self, new))]
    pub async fn register(&self, new: NewCustomer) -> Result<Customer, DomainError> {
        validation::validate_customer(&new)?;

        let customer = self.store.insert_customer(new).await?;
        tracing::info!(customer_id = %customer.id, "registered customer");
        Ok(customer)
    }

    /// Fully replaces an existing customer's name, email, and phone.
    #[tracing::instrument(skip(self, new))]
    pub async fn update(&self, id: CustomerId, new: NewCustomer) -> Result<Customer, DomainError> {
        validation::validate_customer(&new)?;

        let customer = self
            .store
            .update_customer(id, new)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Customer,
                id: id.as_i64(),
            })?;
        tracing::info!(customer_id = %customer.id, "updated customer");
        Ok(customer)
    }

    /// Looks up a customer by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: CustomerId) -> Result<Customer, DomainError> {
        self.store
            .find_customer(id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Customer,
                id: id.as_i64(),
            })
    }

    /// Returns all customers.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Customer>, DomainError> {
        let customers = self.store.list_customers().await?;
        tracing::debug!(count = customers.len(), "listed customers");
        Ok(customers)
    }
}
