use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use common::{CustomerId, Money, OrderId, ProductId};

use crate::entities::{
    Customer, CustomerOrderCount, NewCustomer, NewProduct, Order, OrderItem, Product,
};
use crate::error::{Result, StoreError};
use crate::store::{CustomerStore, OrderStore, ProductStore, Store, StoreTx};

/// PostgreSQL-backed store implementation.
///
/// Order placement uses `SELECT ... FOR UPDATE` row locks: a product row
/// read for update stays locked until the transaction commits or rolls
/// back, so concurrent placements against the same product serialize and
/// the stock check always runs against the latest committed value.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        tracing::debug!("connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer> {
        Ok(Customer {
            id: CustomerId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get::<i32, _>("stock")? as u32,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            product_id: ProductId::new(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    fn row_to_count(row: &PgRow) -> Result<CustomerOrderCount> {
        Ok(CustomerOrderCount {
            customer_id: CustomerId::new(row.try_get("id")?),
            customer_name: row.try_get("name")?,
            order_count: row.try_get::<i64, _>("order_count")? as u64,
        })
    }

    async fn items_for_orders(&self, order_ids: &[i64]) -> Result<Vec<(OrderId, OrderItem)>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, product_name, quantity, unit_price_cents
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id ASC, id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let order_id = OrderId::new(row.try_get("order_id")?);
                Ok((order_id, Self::row_to_item(&row)?))
            })
            .collect()
    }
}

/// Maps unique-constraint violations on the customers table to the
/// offending field; everything else passes through as a database error.
fn map_customer_conflict(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("customers_email_key") => return StoreError::Duplicate { field: "email" },
            Some("customers_phone_key") => return StoreError::Duplicate { field: "phone" },
            _ => {}
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn insert_customer(&self, new: NewCustomer) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(map_customer_conflict)?;

        Self::row_to_customer(&row)
    }

    async fn update_customer(&self, id: CustomerId, new: NewCustomer) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, email = $3, phone = $4
            WHERE id = $1
            RETURNING id, name, email, phone
            "#,
        )
        .bind(id.as_i64())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_customer_conflict)?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, email, phone FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT id, name, email, phone FROM customers ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_customer).collect()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents, stock)
            VALUES ($1, $2, $3)
            RETURNING id, name, price_cents, stock
            "#,
        )
        .bind(&new.name)
        .bind(new.price.cents())
        .bind(new.stock as i32)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(&row)
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, price_cents = $3, stock = $4
            WHERE id = $1
            RETURNING id, name, price_cents, stock
            "#,
        )
        .bind(id.as_i64())
        .bind(&new.name)
        .bind(new.price.cents())
        .bind(new.stock as i32)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price_cents, stock FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, price_cents, stock FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, customer_id, placed_at FROM orders WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_id: i64 = row.try_get("id")?;
        let items = self
            .items_for_orders(&[order_id])
            .await?
            .into_iter()
            .map(|(_, item)| item)
            .collect();

        Ok(Some(Order {
            id: OrderId::new(order_id),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            placed_at: row.try_get::<DateTime<Utc>, _>("placed_at")?,
            items,
        }))
    }

    async fn orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, placed_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY placed_at ASC, id ASC
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(Order {
                id: OrderId::new(row.try_get("id")?),
                customer_id: CustomerId::new(row.try_get("customer_id")?),
                placed_at: row.try_get::<DateTime<Utc>, _>("placed_at")?,
                items: Vec::new(),
            });
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();
        for (order_id, item) in self.items_for_orders(&order_ids).await? {
            if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
                order.items.push(item);
            }
        }

        Ok(orders)
    }

    async fn order_count_per_customer(&self) -> Result<Vec<CustomerOrderCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, COUNT(*) AS order_count
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            GROUP BY c.id, c.name
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_count).collect()
    }

    async fn top_customers(&self, limit: u32) -> Result<Vec<CustomerOrderCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, COUNT(*) AS order_count
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            GROUP BY c.id, c.name
            ORDER BY order_count DESC, c.id ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_count).collect()
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }
}

/// Transaction session over a PostgreSQL connection.
///
/// Dropping the session without committing rolls the transaction back
/// (sqlx's drop behavior), releasing every row lock it holds.
struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn find_customer(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, email, phone FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(PostgresStore::row_to_customer).transpose()
    }

    async fn find_product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, price_cents, stock FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(PostgresStore::row_to_product).transpose()
    }

    async fn update_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        sqlx::query("UPDATE products SET stock = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(stock as i32)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id)
            VALUES ($1)
            RETURNING id, placed_at
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await?;

        let order_id: i64 = row.try_get("id")?;
        let placed_at: DateTime<Utc> = row.try_get("placed_at")?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id.as_i64())
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(Order {
            id: OrderId::new(order_id),
            customer_id,
            placed_at,
            items,
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
