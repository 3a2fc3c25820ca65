//! Order aggregate

use crate::domain::value_objects::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line item is frozen at order creation; later cart or catalog changes
/// never touch it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    CashOnDelivery,
    #[serde(rename = "ONLINE")]
    OnlineGateway,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "COD",
            Self::OnlineGateway => "ONLINE",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// The forward transition table. The admin status endpoint deliberately
    /// does NOT consult this: any state is reachable from any other there,
    /// matching the storefront's observed behavior.
    pub fn is_legal_transition(from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (from, to),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

/// Gateway identifiers for an online payment. `gateway_order_id` is known
/// from order creation; the payment id and signature arrive only with a
/// verified confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub gateway_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub account_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<PaymentResult>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a Pending order. `gateway_order_id` is supplied for online
    /// payments, where the remote order already exists at this point.
    pub fn place(
        account_id: Uuid,
        items: Vec<LineItem>,
        total_amount: Money,
        shipping_address: String,
        payment_method: PaymentMethod,
        gateway_order_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            items,
            total_amount,
            shipping_address,
            payment_method,
            payment_result: gateway_order_id.map(|id| PaymentResult {
                gateway_order_id: id,
                gateway_payment_id: None,
                signature: None,
            }),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records the verified gateway identifiers and moves the order to
    /// Processing. Only called after the signature check has passed.
    pub fn confirm_payment(
        &mut self,
        gateway_order_id: impl Into<String>,
        gateway_payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) {
        self.payment_result = Some(PaymentResult {
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: Some(gateway_payment_id.into()),
            signature: Some(signature.into()),
        });
        self.status = OrderStatus::Processing;
        self.touch();
    }

    /// Unconditional status update; no transition guard.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn order(method: PaymentMethod, gateway_order_id: Option<String>) -> Order {
        Order::place(
            Uuid::new_v4(),
            vec![LineItem { product_id: Uuid::new_v4(), quantity: 2 }],
            Money::new(Decimal::new(1000, 0), "INR"),
            "12 Marine Drive, Mumbai".into(),
            method,
            gateway_order_id,
        )
    }

    #[test]
    fn test_cod_order_has_no_payment_result() {
        let o = order(PaymentMethod::CashOnDelivery, None);
        assert_eq!(o.status, OrderStatus::Pending);
        assert!(o.payment_result.is_none());
    }

    #[test]
    fn test_confirm_payment_records_all_identifiers() {
        let mut o = order(PaymentMethod::OnlineGateway, Some("order_abc".into()));
        o.confirm_payment("order_abc", "pay_xyz", "deadbeef");
        assert_eq!(o.status, OrderStatus::Processing);
        let result = o.payment_result.unwrap();
        assert_eq!(result.gateway_order_id, "order_abc");
        assert_eq!(result.gateway_payment_id.as_deref(), Some("pay_xyz"));
        assert_eq!(result.signature.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        assert!(OrderStatus::is_legal_transition(Pending, Processing));
        assert!(OrderStatus::is_legal_transition(Processing, Shipped));
        assert!(OrderStatus::is_legal_transition(Shipped, Delivered));
        assert!(!OrderStatus::is_legal_transition(Delivered, Pending));
        assert!(!OrderStatus::is_legal_transition(Cancelled, Shipped));
    }

    #[test]
    fn test_set_status_is_unguarded() {
        // The admin surface allows any jump, legal-looking or not.
        let mut o = order(PaymentMethod::CashOnDelivery, None);
        o.set_status(OrderStatus::Delivered);
        o.set_status(OrderStatus::Pending);
        assert_eq!(o.status, OrderStatus::Pending);
    }
}
