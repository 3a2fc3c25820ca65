//! Product aggregate

use crate::domain::value_objects::{Money, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry. Admin CRUD mutates everything; the order flow only ever
/// decrements `stock`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub stock: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
        category: Option<String>,
        images: Vec<String>,
        stock: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            price,
            category,
            images,
            stock: Quantity::new(stock),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        !self.stock.is_zero()
    }

    /// Removes `qty` units, refusing to drive stock negative.
    pub fn decrement_stock(&mut self, qty: u32) -> Result<(), ProductError> {
        self.stock = self.stock.subtract(qty).ok_or(ProductError::InsufficientStock)?;
        self.touch();
        Ok(())
    }

    pub fn add_stock(&mut self, qty: u32) {
        self.stock = self.stock.add(qty);
        self.touch();
    }

    pub fn update_price(&mut self, new_price: Money) {
        self.price = new_price;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone)]
pub enum ProductError {
    InsufficientStock,
}
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Insufficient stock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_stock_decrement() {
        let mut p = Product::new("Ring", None, Money::new(Decimal::new(500, 0), "INR"), None, vec![], 3);
        p.decrement_stock(2).unwrap();
        assert_eq!(p.stock.value(), 1);
        assert!(p.decrement_stock(2).is_err());
        assert_eq!(p.stock.value(), 1); // untouched on failure
    }
}
