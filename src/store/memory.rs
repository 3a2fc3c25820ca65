//! In-memory store implementations backing the test suite.

use super::{AccountStore, CatalogStore, OrderStore, StoreError};
use crate::domain::aggregates::{Account, CartLine, Order, Product};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn fetch(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        self.products.lock().unwrap().insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let mut products = self.products.lock().unwrap();
        match products.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.products.lock().unwrap().remove(&id).is_some())
    }

    async fn decrement_stock(&self, id: Uuid, qty: u32) -> Result<bool, StoreError> {
        // Check and write under one lock acquisition; this is the whole point
        // of the capability.
        let mut products = self.products.lock().unwrap();
        let Some(product) = products.get_mut(&id) else {
            return Ok(false);
        };
        Ok(product.decrement_stock(qty).is_ok())
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, account: Account) {
        self.accounts.lock().unwrap().insert(account.id, account);
    }
}

#[async_trait]
impl AccountStore for MemoryAccounts {
    async fn fetch(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn save_cart(&self, account_id: Uuid, cart: &[CartLine]) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&account_id) {
            Some(account) => {
                account.cart = cart.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_cart(&self, account_id: Uuid) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(&account_id) {
            account.clear_cart();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl MemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn fetch(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<bool, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn for_account(&self, account_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.account_id == account_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.lock().unwrap().values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
