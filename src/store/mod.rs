//! Persistence traits for the catalog, account, and order stores.
//!
//! The order flow depends on these seams only; production wires the Postgres
//! implementations, tests the in-memory ones. Stock decrement is exposed as an
//! explicit atomic capability of the catalog store ("decrement iff current
//! stock covers the request") so concurrent checkouts cannot jointly
//! oversell a product.

pub mod memory;
pub mod postgres;

use crate::domain::aggregates::{Account, CartLine, Order, Product};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored document malformed: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
    async fn insert(&self, product: &Product) -> Result<(), StoreError>;
    /// Returns false when the product no longer exists.
    async fn update(&self, product: &Product) -> Result<bool, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Atomically removes `qty` units iff current stock covers them.
    /// Returns false (and changes nothing) otherwise.
    async fn decrement_stock(&self, id: Uuid, qty: u32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    /// Replaces the account's cart wholesale. Returns false when the account
    /// does not exist.
    async fn save_cart(&self, account_id: Uuid, cart: &[CartLine]) -> Result<bool, StoreError>;
    async fn clear_cart(&self, account_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;
    async fn update(&self, order: &Order) -> Result<bool, StoreError>;
    /// Most recent first.
    async fn for_account(&self, account_id: Uuid) -> Result<Vec<Order>, StoreError>;
    /// Most recent first.
    async fn all(&self) -> Result<Vec<Order>, StoreError>;
}
