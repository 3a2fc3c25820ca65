//! Request handlers.

use super::auth::{AdminUser, AuthUser};
use super::{ApiError, AppState};
use crate::checkout::OrderView;
use crate::domain::aggregates::{LineItem, Order, OrderStatus, PaymentMethod, Product};
use crate::domain::value_objects::Money;
use crate::gateway::RemoteOrder;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<LineItem>,
    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    message: String,
    order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_order: Option<RemoteOrder>,
}

pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let placed = state
        .engine
        .place_order(user.account_id, req.items, req.shipping_address, req.payment_method)
        .await?;
    let message = match req.payment_method {
        PaymentMethod::CashOnDelivery => "Order placed successfully",
        PaymentMethod::OnlineGateway => "Payment gateway order created",
    };
    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: message.to_string(),
            order: placed.order,
            remote_order: placed.remote_order,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Uuid,
    pub payment_id: String,
    pub remote_order_id: String,
    pub signature: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    message: String,
    order: Order,
}

pub async fn verify_payment(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .engine
        .verify_payment(req.order_id, &req.payment_id, &req.remote_order_id, &req.signature)
        .await?;
    Ok(Json(OrderResponse { message: "Payment verified successfully".to_string(), order }))
}

pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    Ok(Json(state.engine.orders_for_account(user.account_id).await?))
}

pub async fn all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    Ok(Json(state.engine.all_orders().await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.engine.update_status(order_id, req.status).await?;
    Ok(Json(OrderResponse { message: "Order status updated".to_string(), order }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
}

impl ProductPayload {
    fn checked(self) -> Result<Self, ApiError> {
        self.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
        if self.price < Decimal::ZERO {
            return Err(ApiError::Validation("Price must not be negative".into()));
        }
        Ok(self)
    }
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .catalog
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let payload = payload.checked()?;
    let product = Product::new(
        payload.name,
        payload.description,
        Money::new(payload.price, &state.currency),
        payload.category,
        payload.images,
        payload.stock,
    );
    state.catalog.insert(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, ApiError> {
    let payload = payload.checked()?;
    let mut product = state
        .catalog
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    product.name = payload.name;
    product.description = payload.description;
    product.update_price(Money::new(payload.price, &state.currency));
    product.category = payload.category;
    product.images = payload.images;
    product.stock = crate::domain::value_objects::Quantity::new(payload.stock);
    state.catalog.update(&product).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.catalog.delete(id).await? {
        return Err(ApiError::NotFound("Product not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CartLineView {
    pub product: Option<Product>,
    pub quantity: u32,
}

async fn populated_cart(state: &AppState, account_id: Uuid) -> Result<Vec<CartLineView>, ApiError> {
    let account = state
        .accounts
        .fetch(account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    let mut lines = Vec::with_capacity(account.cart.len());
    for line in &account.cart {
        let product = state.catalog.fetch(line.product_id).await?;
        lines.push(CartLineView { product, quantity: line.quantity });
    }
    Ok(lines)
}

pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    Ok(Json(populated_cart(&state, user.account_id).await?))
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    body: Option<Json<AddToCartRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let quantity = body.map(|Json(b)| b.quantity).unwrap_or(1);
    if quantity == 0 {
        return Err(ApiError::Validation("Quantity must be positive".into()));
    }
    let mut account = state
        .accounts
        .fetch(user.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    state
        .catalog
        .fetch(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    account.add_to_cart(product_id, quantity);
    state.accounts.save_cart(user.account_id, &account.cart).await?;
    Ok(Json(serde_json::json!({"message": "Added to cart"})))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<CartLineView>>, ApiError> {
    let mut account = state
        .accounts
        .fetch(user.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;
    account.remove_from_cart(product_id);
    state.accounts.save_cart(user.account_id, &account.cart).await?;
    populated_cart(&state, user.account_id).await.map(Json)
}
