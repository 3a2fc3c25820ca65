//! Domain events published on the message bus

use crate::domain::aggregates::{OrderStatus, PaymentMethod};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed {
        order_id: Uuid,
        account_id: Uuid,
        total: Decimal,
        payment_method: PaymentMethod,
    },
    PaymentConfirmed {
        order_id: Uuid,
        gateway_payment_id: String,
    },
    StatusChanged {
        order_id: Uuid,
        status: OrderStatus,
    },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "orders.placed",
            Self::PaymentConfirmed { .. } => "orders.payment_confirmed",
            Self::StatusChanged { .. } => "orders.status_changed",
        }
    }
}
