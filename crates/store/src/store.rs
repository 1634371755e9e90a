use async_trait::async_trait;

use common::{CustomerId, OrderId, ProductId};

use crate::entities::{
    Customer, CustomerOrderCount, NewCustomer, NewProduct, Order, OrderItem, Product,
};
use crate::error::Result;

/// Access to customer records.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Persists a new customer, assigning its id.
    ///
    /// Fails with `Duplicate` if the email or phone is already taken.
    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer>;

    /// Fully replaces an existing customer's name, email, and phone.
    ///
    /// Returns `None` if no customer exists with the given id. Fails with
    /// `Duplicate` if the new email or phone collides with another customer.
    async fn update_customer(&self, id: CustomerId, new: NewCustomer) -> Result<Option<Customer>>;

    /// Looks up a customer by id.
    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Returns all customers, ordered by id.
    async fn list_customers(&self) -> Result<Vec<Customer>>;
}

/// Access to product records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product, assigning its id.
    async fn insert_product(&self, new: NewProduct) -> Result<Product>;

    /// Fully replaces an existing product's name, price, and stock.
    ///
    /// Returns `None` if no product exists with the given id.
    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Option<Product>>;

    /// Looks up a product by id.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Returns all products, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Hard-deletes a product.
    ///
    /// Returns `false` if no product exists with the given id. Historical
    /// order items are unaffected; they carry their own snapshots.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;
}

/// Access to placed orders, including the report aggregations.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up an order by id, items loaded eagerly.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns all orders of a customer, ordered by placement time then id.
    async fn orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// One row per customer with at least one order, ordered by customer id
    /// ascending. Customers with zero orders do not appear.
    async fn order_count_per_customer(&self) -> Result<Vec<CustomerOrderCount>>;

    /// The `limit` customers with the most orders, ordered by order count
    /// descending with customer id ascending as the tie-break.
    async fn top_customers(&self, limit: u32) -> Result<Vec<CustomerOrderCount>>;
}

/// Combined store seam with transactional order placement.
#[async_trait]
pub trait Store: CustomerStore + ProductStore + OrderStore {
    /// Opens a transaction session.
    ///
    /// Every read and write performed through the session belongs to one
    /// atomic unit of work: nothing is visible to other callers until
    /// [`StoreTx::commit`], and dropping the session without committing
    /// discards every staged write.
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

/// A transaction session used by the order-placement workflow.
///
/// Product rows read through [`find_product_for_update`] are held against
/// concurrent modification until the session commits or is dropped, so a
/// stock check followed by a decrement cannot lose an update to a
/// concurrent placement.
///
/// [`find_product_for_update`]: StoreTx::find_product_for_update
#[async_trait]
pub trait StoreTx: Send {
    /// Looks up a customer inside the transaction.
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>>;

    /// Looks up a product and acquires it for update.
    ///
    /// Reads performed later in the same session observe stock values
    /// written earlier in the session.
    async fn find_product_for_update(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Stages a new stock value for a product.
    async fn update_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()>;

    /// Stages a new order with its items, assigning its id and the
    /// server-clock placement timestamp.
    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Order>;

    /// Commits the session, making all staged writes visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rolls the session back explicitly.
    ///
    /// Equivalent to dropping the session; provided for call sites that
    /// want the rollback to be visible in the control flow.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
