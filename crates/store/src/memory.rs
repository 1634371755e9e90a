use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use common::{CustomerId, OrderId, ProductId};

use crate::entities::{
    Customer, CustomerOrderCount, NewCustomer, NewProduct, Order, OrderItem, Product,
};
use crate::error::{Result, StoreError};
use crate::store::{CustomerStore, OrderStore, ProductStore, Store, StoreTx};

#[derive(Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_customer_id: i64,
    next_product_id: i64,
    next_order_id: i64,
}

impl MemoryState {
    /// Returns the offending field if the email or phone is already taken
    /// by a customer other than `exclude`.
    fn duplicate_field(
        &self,
        new: &NewCustomer,
        exclude: Option<CustomerId>,
    ) -> Option<&'static str> {
        for customer in self.customers.values() {
            if Some(customer.id) == exclude {
                continue;
            }
            if customer.email == new.email {
                return Some("email");
            }
            if customer.phone == new.phone {
                return Some("phone");
            }
        }
        None
    }

    fn count_rows(&self) -> Vec<CustomerOrderCount> {
        let mut counts: BTreeMap<CustomerId, u64> = BTreeMap::new();
        for order in self.orders.values() {
            *counts.entry(order.customer_id).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter_map(|(customer_id, order_count)| {
                self.customers
                    .get(&customer_id)
                    .map(|customer| CustomerOrderCount {
                        customer_id,
                        customer_name: customer.name.clone(),
                        order_count,
                    })
            })
            .collect()
    }
}

/// In-memory store implementation for tests and local development.
///
/// All state lives behind a single `tokio::sync::Mutex`. A transaction
/// session holds the mutex for its whole lifetime, so sessions serialize:
/// the stock a session observes is always the latest committed value, and
/// its own writes are staged and applied atomically at commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer> {
        let mut state = self.state.lock().await;

        if let Some(field) = state.duplicate_field(&new, None) {
            return Err(StoreError::Duplicate { field });
        }

        state.next_customer_id += 1;
        let customer = Customer {
            id: CustomerId::new(state.next_customer_id),
            name: new.name,
            email: new.email,
            phone: new.phone,
        };
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(&self, id: CustomerId, new: NewCustomer) -> Result<Option<Customer>> {
        let mut state = self.state.lock().await;

        if !state.customers.contains_key(&id) {
            return Ok(None);
        }
        if let Some(field) = state.duplicate_field(&new, Some(id)) {
            return Err(StoreError::Duplicate { field });
        }

        let customer = Customer {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
        };
        state.customers.insert(id, customer.clone());
        Ok(Some(customer))
    }

    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.state.lock().await.customers.get(&id).cloned())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.state.lock().await.customers.values().cloned().collect())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        let mut state = self.state.lock().await;

        state.next_product_id += 1;
        let product = Product {
            id: ProductId::new(state.next_product_id),
            name: new.name,
            price: new.price,
            stock: new.stock,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Option<Product>> {
        let mut state = self.state.lock().await;

        if !state.products.contains_key(&id) {
            return Ok(None);
        }

        let product = Product {
            id,
            name: new.name,
            price: new.price,
            stock: new.stock,
        };
        state.products.insert(id, product.clone());
        Ok(Some(product))
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.state.lock().await.products.values().cloned().collect())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        Ok(self.state.lock().await.products.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| (order.placed_at, order.id));
        Ok(orders)
    }

    async fn order_count_per_customer(&self) -> Result<Vec<CustomerOrderCount>> {
        // count_rows iterates a BTreeMap, so rows come out ordered by
        // customer id ascending.
        Ok(self.state.lock().await.count_rows())
    }

    async fn top_customers(&self, limit: u32) -> Result<Vec<CustomerOrderCount>> {
        let mut rows = self.state.lock().await.count_rows();
        rows.sort_by(|a, b| {
            b.order_count
                .cmp(&a.order_count)
                .then(a.customer_id.cmp(&b.customer_id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTx {
            state: guard,
            stock_updates: HashMap::new(),
            pending_order: None,
        }))
    }
}

/// Transaction session over the in-memory store.
///
/// Holds the state mutex for its whole lifetime and stages writes locally;
/// commit applies them in one step, drop discards them.
struct MemoryTx {
    state: OwnedMutexGuard<MemoryState>,
    stock_updates: HashMap<ProductId, u32>,
    pending_order: Option<Order>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.state.customers.get(&id).cloned())
    }

    async fn find_product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        let mut product = match self.state.products.get(&id) {
            Some(product) => product.clone(),
            None => return Ok(None),
        };
        // Overlay stock staged earlier in this session.
        if let Some(&stock) = self.stock_updates.get(&id) {
            product.stock = stock;
        }
        Ok(Some(product))
    }

    async fn update_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        self.stock_updates.insert(id, stock);
        Ok(())
    }

    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Order> {
        // Ids are consumed even if the session never commits, matching how
        // a database sequence behaves.
        self.state.next_order_id += 1;
        let order = Order {
            id: OrderId::new(self.state.next_order_id),
            customer_id,
            placed_at: Utc::now(),
            items,
        };
        self.pending_order = Some(order.clone());
        Ok(order)
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let stock_updates = std::mem::take(&mut self.stock_updates);
        for (id, stock) in stock_updates {
            if let Some(product) = self.state.products.get_mut(&id) {
                product.stock = stock;
            }
        }
        if let Some(order) = self.pending_order.take() {
            self.state.orders.insert(order.id, order);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Staged writes die with the session.
        Ok(())
    }
}
