//! Catalog product maintenance.

use common::ProductId;
use store::{NewProduct, Product, ProductStore};

use crate::error::{DomainError, EntityKind};
use crate::validation;

/// Service for product CRUD.
///
/// Stock changes made here are plain catalog updates; decrements that
/// belong to order placement happen inside the placement transaction only.
pub struct ProductService<S> {
    store: S,
}

impl<S: ProductStore> ProductService<S> {
    /// Creates a new product service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a new product to the catalog.
    #[tracing::instrument(skip(self, new))]
    pub async fn add(&self, new: NewProduct) -> Result<Product, DomainError> {
        validation::validate_product(&new)?;

        let product = self.store.insert_product(new).await?;
        tracing::info!(product_id = %product.id, "added product");
        Ok(product)
    }

    /// Fully replaces an existing product's name, price, and stock.
    #[tracing::instrument(skip(self, new))]
    pub async fn update(&self, id: ProductId, new: NewProduct) -> Result<Product, DomainError> {
        validation::validate_product(&new)?;

        let product = self
            .store
            .update_product(id, new)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Product,
                id: id.as_i64(),
            })?;
        tracing::info!(product_id = %product.id, "updated product");
        Ok(product)
    }

    /// Looks up a product by id.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, DomainError> {
        self.store
            .find_product(id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: EntityKind::Product,
                id: id.as_i64(),
            })
    }

    /// Returns all products.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let products = self.store.list_products().await?;
        tracing::debug!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Hard-deletes a product.
    ///
    /// Historical orders are unaffected: their line items carry name and
    /// price snapshots taken at placement time.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), DomainError> {
        if !self.store.delete_product(id).await? {
            return Err(DomainError::NotFound {
                kind: EntityKind::Product,
                id: id.as_i64(),
            });
        }
        tracing::info!(product_id = %id, "deleted product");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;
    use store::MemoryStore;

    fn service() -> ProductService<MemoryStore> {
        ProductService::new(MemoryStore::new())
    }

    fn input(name: &str, price_cents: i64, stock: u32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            stock,
        }
    }

    #[tokio::test]
    async fn add_and_get() {
        let service = service();

        let widget = service.add(input("widget", 1000, 5)).await.unwrap();
        let fetched = service.get(widget.id).await.unwrap();
        assert_eq!(fetched, widget);
    }

    #[tokio::test]
    async fn add_rejects_non_positive_price() {
        let service = service();

        let err = service.add(input("widget", 0, 5)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_stock_is_allowed() {
        let service = service();
        let widget = service.add(input("widget", 1000, 0)).await.unwrap();
        assert_eq!(widget.stock, 0);
    }

    #[tokio::test]
    async fn delete_unknown_product_is_not_found() {
        let service = service();

        let err = service.delete(ProductId::new(3)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound { kind: EntityKind::Product, id: 3 }
        ));
    }

    #[tokio::test]
    async fn delete_removes_product() {
        let service = service();
        let widget = service.add(input("widget", 1000, 5)).await.unwrap();

        service.delete(widget.id).await.unwrap();

        assert!(matches!(
            service.get(widget.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
