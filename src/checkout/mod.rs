//! Order flow engine.
//!
//! Orchestrates the checkout sequence: line-item validation against the
//! catalog, per-item stock decrement, total computation, order persistence,
//! gateway order creation for online payments, confirmation signature
//! verification, and cart clearing.
//!
//! Stock decrement is atomic per line item (the catalog store refuses to go
//! below zero) but the call as a whole is not all-or-nothing: a failure on
//! line N leaves lines 1..N decremented. There is no compensating rollback,
//! and `place_order` is not idempotent.

use crate::bus::EventBus;
use crate::domain::aggregates::{Account, LineItem, Order, OrderStatus, PaymentMethod, Product};
use crate::domain::events::OrderEvent;
use crate::domain::value_objects::{Money, MoneyError};
use crate::gateway::{signature, GatewayCredentials, GatewayError, PaymentGateway, RemoteOrder};
use crate::store::{AccountStore, CatalogStore, OrderStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Shipping address is required")]
    MissingAddress,
    #[error("Quantity must be positive")]
    InvalidQuantity,
    #[error("Product not found")]
    ProductNotFound,
    #[error("Order not found")]
    OrderNotFound,
    #[error("{0} out of stock")]
    OutOfStock(String),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("catalog price currency does not match the configured currency")]
    Currency(#[from] MoneyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result of `place_order`. `remote_order` is present for online payments;
/// the client needs it to drive the gateway's payment UI.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order: Order,
    pub remote_order: Option<RemoteOrder>,
}

/// An order with referenced product (and, for admins, account) data joined
/// in, the shape the listing endpoints return.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountProfile>,
    pub items: Vec<LineItemView>,
    pub total_amount: Money,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_result: Option<crate::domain::aggregates::PaymentResult>,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct LineItemView {
    /// None when the product was deleted from the catalog after the order
    /// was placed; the order itself is immutable.
    pub product: Option<Product>,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self { id: account.id, name: account.name.clone(), email: account.email.clone() }
    }
}

pub struct OrderFlowEngine {
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    credentials: GatewayCredentials,
    currency: String,
    bus: Arc<EventBus>,
}

impl OrderFlowEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        accounts: Arc<dyn AccountStore>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        credentials: GatewayCredentials,
        currency: impl Into<String>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            catalog,
            accounts,
            orders,
            gateway,
            credentials,
            currency: currency.into(),
            bus,
        }
    }

    /// Places an order for `account_id`.
    ///
    /// COD orders are persisted Pending and the cart is cleared right away.
    /// Online orders additionally get a provider-side order; the cart stays
    /// populated until the payment is verified, so an abandoned payment
    /// leaves the cart intact.
    pub async fn place_order(
        &self,
        account_id: Uuid,
        items: Vec<LineItem>,
        shipping_address: String,
        payment_method: PaymentMethod,
    ) -> Result<PlacedOrder, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if shipping_address.trim().is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        let mut total = Money::zero(&self.currency);
        for line in &items {
            if line.quantity == 0 {
                return Err(CheckoutError::InvalidQuantity);
            }
            let product = self
                .catalog
                .fetch(line.product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound)?;
            // Decrement is atomic per item; earlier lines stay decremented
            // when a later one fails.
            if !self.catalog.decrement_stock(line.product_id, line.quantity).await? {
                return Err(CheckoutError::OutOfStock(product.name));
            }
            total = total.add(&product.price.multiply(line.quantity))?;
        }

        let (order, remote_order) = match payment_method {
            PaymentMethod::CashOnDelivery => {
                let order = Order::place(
                    account_id,
                    items,
                    total,
                    shipping_address,
                    PaymentMethod::CashOnDelivery,
                    None,
                );
                self.orders.insert(&order).await?;
                self.accounts.clear_cart(account_id).await?;
                (order, None)
            }
            PaymentMethod::OnlineGateway => {
                let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
                let remote = self
                    .gateway
                    .create_remote_order(total.to_minor_units(), total.currency(), &receipt)
                    .await?;
                let order = Order::place(
                    account_id,
                    items,
                    total,
                    shipping_address,
                    PaymentMethod::OnlineGateway,
                    Some(remote.id.clone()),
                );
                self.orders.insert(&order).await?;
                // Cart is left populated until verification succeeds.
                (order, Some(remote))
            }
        };

        self.bus
            .publish(&OrderEvent::Placed {
                order_id: order.id,
                account_id,
                total: order.total_amount.amount(),
                payment_method,
            })
            .await;
        Ok(PlacedOrder { order, remote_order })
    }

    /// Verifies a gateway payment confirmation.
    ///
    /// The signature check runs first and a mismatch changes no state at
    /// all. On success the order records all three gateway identifiers,
    /// moves Pending -> Processing, and the owning cart is cleared.
    pub async fn verify_payment(
        &self,
        order_id: Uuid,
        gateway_payment_id: &str,
        gateway_order_id: &str,
        supplied_signature: &str,
    ) -> Result<Order, CheckoutError> {
        if !signature::verify(
            &self.credentials.key_secret,
            gateway_order_id,
            gateway_payment_id,
            supplied_signature,
        ) {
            return Err(CheckoutError::PaymentVerificationFailed);
        }

        let mut order = self.orders.fetch(order_id).await?.ok_or(CheckoutError::OrderNotFound)?;
        order.confirm_payment(gateway_order_id, gateway_payment_id, supplied_signature);
        self.orders.update(&order).await?;
        self.accounts.clear_cart(order.account_id).await?;

        self.bus
            .publish(&OrderEvent::PaymentConfirmed {
                order_id: order.id,
                gateway_payment_id: gateway_payment_id.to_string(),
            })
            .await;
        Ok(order)
    }

    /// The account's orders, most recent first, product data joined in.
    pub async fn orders_for_account(&self, account_id: Uuid) -> Result<Vec<OrderView>, CheckoutError> {
        let orders = self.orders.for_account(account_id).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.join_items(&order).await?;
            views.push(self.view(order, items, None));
        }
        Ok(views)
    }

    /// Every order in the store with account and product data joined in.
    pub async fn all_orders(&self) -> Result<Vec<OrderView>, CheckoutError> {
        let orders = self.orders.all().await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.join_items(&order).await?;
            let account = self
                .accounts
                .fetch(order.account_id)
                .await?
                .as_ref()
                .map(AccountProfile::from);
            views.push(self.view(order, items, account));
        }
        Ok(views)
    }

    /// Admin status update. Deliberately unguarded: any of the five states
    /// can be set from any other.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let mut order = self.orders.fetch(order_id).await?.ok_or(CheckoutError::OrderNotFound)?;
        order.set_status(status);
        self.orders.update(&order).await?;
        self.bus
            .publish(&OrderEvent::StatusChanged { order_id: order.id, status })
            .await;
        Ok(order)
    }

    async fn join_items(&self, order: &Order) -> Result<Vec<LineItemView>, CheckoutError> {
        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            let product = self.catalog.fetch(line.product_id).await?;
            items.push(LineItemView { product, quantity: line.quantity });
        }
        Ok(items)
    }

    fn view(&self, order: Order, items: Vec<LineItemView>, account: Option<AccountProfile>) -> OrderView {
        OrderView {
            id: order.id,
            account,
            items,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_result: order.payment_result,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
