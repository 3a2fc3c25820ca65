//! Postgres-backed store implementations.
//!
//! Line items, payment results, and carts are embedded JSONB documents, the
//! same shape the domain types serialize to. Stock decrement is a conditional
//! UPDATE so the check and the write are one statement.

use super::{AccountStore, CatalogStore, OrderStore, StoreError};
use crate::domain::aggregates::{Account, CartLine, Order, OrderStatus, PaymentMethod, Product, Role};
use crate::domain::value_objects::{Money, Quantity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    currency: String,
    category: Option<String>,
    images: Vec<String>,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Money::new(row.price, &row.currency),
            category: row.category,
            images: row.images,
            stock: Quantity::new(row.stock.max(0) as u32),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn fetch(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, currency, category, images, stock, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(product.price.currency())
        .bind(&product.category)
        .bind(&product.images)
        .bind(product.stock.value() as i32)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET name = $2, description = $3, price = $4, currency = $5, category = $6, \
             images = $7, stock = $8, updated_at = NOW() WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(product.price.currency())
        .bind(&product.category)
        .bind(&product.images)
        .bind(product.stock.value() as i32)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn decrement_stock(&self, id: Uuid, qty: u32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1 AND stock >= $2",
        )
        .bind(id)
        .bind(qty as i32)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgAccounts {
    pool: PgPool,
}

impl PgAccounts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    cart: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, StoreError> {
        let role = match row.role.as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            other => return Err(StoreError::Corrupt(format!("unknown role {other:?}"))),
        };
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            cart: serde_json::from_value(row.cart)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccounts {
    async fn fetch(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn save_cart(&self, account_id: Uuid, cart: &[CartLine]) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET cart = $2, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .bind(serde_json::to_value(cart)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, account_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET cart = '[]'::jsonb, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgOrders {
    pool: PgPool,
}

impl PgOrders {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    account_id: Uuid,
    items: serde_json::Value,
    total_amount: Decimal,
    currency: String,
    shipping_address: String,
    payment_method: String,
    payment_result: Option<serde_json::Value>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let payment_method = match row.payment_method.as_str() {
            "COD" => PaymentMethod::CashOnDelivery,
            "ONLINE" => PaymentMethod::OnlineGateway,
            other => return Err(StoreError::Corrupt(format!("unknown payment method {other:?}"))),
        };
        let status = match row.status.as_str() {
            "Pending" => OrderStatus::Pending,
            "Processing" => OrderStatus::Processing,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            "Cancelled" => OrderStatus::Cancelled,
            other => return Err(StoreError::Corrupt(format!("unknown order status {other:?}"))),
        };
        Ok(Order {
            id: row.id,
            account_id: row.account_id,
            items: serde_json::from_value(row.items)?,
            total_amount: Money::new(row.total_amount, &row.currency),
            shipping_address: row.shipping_address,
            payment_method,
            payment_result: row.payment_result.map(serde_json::from_value).transpose()?,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrders {
    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, account_id, items, total_amount, currency, shipping_address, \
             payment_method, payment_result, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(order.id)
        .bind(order.account_id)
        .bind(serde_json::to_value(&order.items)?)
        .bind(order.total_amount.amount())
        .bind(order.total_amount.currency())
        .bind(&order.shipping_address)
        .bind(order.payment_method.as_str())
        .bind(order.payment_result.as_ref().map(serde_json::to_value).transpose()?)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_result = $2, status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.payment_result.as_ref().map(serde_json::to_value).transpose()?)
        .bind(order.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn for_account(&self, account_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE account_id = $1 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Order::try_from).collect()
    }
}
