//! Account aggregate with the embedded cart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// One cart entry. The cart is owned exclusively by its account; lines for
/// the same product are merged rather than duplicated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub cart: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            cart: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn add_to_cart(&mut self, product_id: Uuid, quantity: u32) {
        if let Some(line) = self.cart.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += quantity;
        } else {
            self.cart.push(CartLine { product_id, quantity });
        }
        self.touch();
    }

    pub fn remove_from_cart(&mut self, product_id: Uuid) {
        self.cart.retain(|l| l.product_id != product_id);
        self.touch();
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_merges_lines_per_product() {
        let mut account = Account::new("Asha", "asha@example.com", Role::User);
        let p = Uuid::new_v4();
        account.add_to_cart(p, 2);
        account.add_to_cart(p, 1);
        assert_eq!(account.cart.len(), 1);
        assert_eq!(account.cart[0].quantity, 3);
    }

    #[test]
    fn test_cart_remove_and_clear() {
        let mut account = Account::new("Asha", "asha@example.com", Role::User);
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        account.add_to_cart(p1, 1);
        account.add_to_cart(p2, 4);
        account.remove_from_cart(p1);
        assert_eq!(account.cart.len(), 1);
        account.clear_cart();
        assert!(account.cart.is_empty());
    }
}
