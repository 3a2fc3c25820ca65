//! HTTP surface: router, shared state, error mapping.

pub mod auth;
pub mod handlers;

use crate::checkout::{CheckoutError, OrderFlowEngine};
use crate::store::{AccountStore, CatalogStore, StoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<OrderFlowEngine>,
    pub catalog: Arc<dyn CatalogStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub currency: String,
    pub auth_secret: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async {
                Json(serde_json::json!({"status": "healthy", "service": "atelier-commerce"}))
            }),
        )
        .route("/api/v1/products", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/api/v1/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/api/v1/cart", get(handlers::get_cart))
        .route("/api/v1/cart/add/:product_id", post(handlers::add_to_cart))
        .route("/api/v1/cart/remove/:product_id", delete(handlers::remove_from_cart))
        .route("/api/v1/orders", post(handlers::place_order).get(handlers::all_orders))
        .route("/api/v1/orders/verify-payment", post(handlers::verify_payment))
        .route("/api/v1/orders/my", get(handlers::my_orders))
        .route("/api/v1/orders/:id/status", put(handlers::update_order_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(serde_json::json!({"message": message}))).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match &e {
            CheckoutError::EmptyCart
            | CheckoutError::MissingAddress
            | CheckoutError::InvalidQuantity
            | CheckoutError::OutOfStock(_)
            | CheckoutError::PaymentVerificationFailed => ApiError::Validation(e.to_string()),
            CheckoutError::ProductNotFound | CheckoutError::OrderNotFound => {
                ApiError::NotFound(e.to_string())
            }
            CheckoutError::Currency(_) | CheckoutError::Store(_) | CheckoutError::Gateway(_) => {
                tracing::error!(error = %e, "checkout failed");
                ApiError::Internal
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "store operation failed");
        ApiError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::auth::issue_token;
    use super::*;
    use crate::bus::EventBus;
    use crate::domain::aggregates::{Account, OrderStatus, Product, Role};
    use crate::domain::value_objects::Money;
    use crate::gateway::{signature, GatewayCredentials, GatewayError, PaymentGateway, RemoteOrder};
    use crate::store::memory::{MemoryAccounts, MemoryCatalog, MemoryOrders};
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use tower::ServiceExt;
    use uuid::Uuid;

    const AUTH_SECRET: &str = "test-auth-secret";
    const GATEWAY_SECRET: &str = "test-gateway-secret";

    struct StubGateway;

    #[async_trait::async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_remote_order(
            &self,
            amount: i64,
            currency: &str,
            receipt: &str,
        ) -> Result<RemoteOrder, GatewayError> {
            Ok(RemoteOrder {
                id: "order_stub1".to_string(),
                amount,
                currency: currency.to_string(),
                receipt: receipt.to_string(),
                status: Some("created".to_string()),
            })
        }
    }

    struct TestApp {
        state: AppState,
        catalog: Arc<MemoryCatalog>,
        accounts: Arc<MemoryAccounts>,
        user: Account,
        admin: Account,
        product: Product,
    }

    async fn test_app() -> TestApp {
        let catalog = Arc::new(MemoryCatalog::new());
        let accounts = Arc::new(MemoryAccounts::new());
        let orders = Arc::new(MemoryOrders::new());
        let engine = Arc::new(OrderFlowEngine::new(
            catalog.clone(),
            accounts.clone(),
            orders.clone(),
            Arc::new(StubGateway),
            GatewayCredentials { key_id: "key_test".into(), key_secret: GATEWAY_SECRET.into() },
            "INR",
            Arc::new(EventBus::disabled()),
        ));
        let state = AppState {
            engine,
            catalog: catalog.clone(),
            accounts: accounts.clone(),
            currency: "INR".to_string(),
            auth_secret: AUTH_SECRET.to_string(),
        };

        let product = Product::new(
            "Gold Ring",
            None,
            Money::new(Decimal::new(500, 0), "INR"),
            Some("rings".to_string()),
            vec![],
            3,
        );
        catalog.insert(&product).await.unwrap();

        let mut user = Account::new("Asha", "asha@example.com", Role::User);
        user.add_to_cart(product.id, 2);
        accounts.seed(user.clone());
        let admin = Account::new("Meera", "meera@example.com", Role::Admin);
        accounts.seed(admin.clone());

        TestApp { state, catalog, accounts, user, admin, product }
    }

    fn bearer(account: &Account) -> String {
        format!("Bearer {}", issue_token(account.id, account.role, AUTH_SECRET))
    }

    fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_place_cod_order_via_api() {
        let app = test_app().await;
        let auth = bearer(&app.user);
        let req = json_request(
            "POST",
            "/api/v1/orders",
            Some(&auth),
            serde_json::json!({
                "items": [{"product": app.product.id, "quantity": 2}],
                "shippingAddress": "12 Marine Drive, Mumbai",
                "paymentMethod": "COD",
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["order"]["status"], "Pending");
        assert!(body["order"].get("paymentResult").is_none());

        assert_eq!(app.catalog.fetch(app.product.id).await.unwrap().unwrap().stock.value(), 1);
        assert!(app.accounts.fetch(app.user.id).await.unwrap().unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_stock_is_400_with_product_name() {
        let app = test_app().await;
        let auth = bearer(&app.user);
        let req = json_request(
            "POST",
            "/api/v1/orders",
            Some(&auth),
            serde_json::json!({
                "items": [{"product": app.product.id, "quantity": 5}],
                "shippingAddress": "addr",
                "paymentMethod": "COD",
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Gold Ring out of stock");
    }

    #[tokio::test]
    async fn test_online_order_then_verify_payment() {
        let app = test_app().await;
        let auth = bearer(&app.user);
        let req = json_request(
            "POST",
            "/api/v1/orders",
            Some(&auth),
            serde_json::json!({
                "items": [{"product": app.product.id, "quantity": 2}],
                "shippingAddress": "addr",
                "paymentMethod": "ONLINE",
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let order_id = body["order"]["id"].as_str().unwrap().to_string();
        let remote_id = body["remoteOrder"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["remoteOrder"]["amount"], 100_000);

        // a bad signature is rejected and the order stays Pending
        let req = json_request(
            "POST",
            "/api/v1/orders/verify-payment",
            Some(&auth),
            serde_json::json!({
                "orderId": order_id,
                "paymentId": "pay_123",
                "remoteOrderId": remote_id,
                "signature": "deadbeef",
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let sig = signature::expected(GATEWAY_SECRET, &remote_id, "pay_123").unwrap();
        let req = json_request(
            "POST",
            "/api/v1/orders/verify-payment",
            Some(&auth),
            serde_json::json!({
                "orderId": order_id,
                "paymentId": "pay_123",
                "remoteOrderId": remote_id,
                "signature": sig,
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["order"]["status"], "Processing");
        assert!(app.accounts.fetch(app.user.id).await.unwrap().unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_auth_and_role_rejections() {
        let app = test_app().await;

        // no token
        let req = Request::builder().method("GET").uri("/api/v1/orders/my").body(Body::empty()).unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // user hitting an admin endpoint
        let auth = bearer(&app.user);
        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/orders")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // admin is allowed
        let auth = bearer(&app.admin);
        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/orders")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_status_update_accepts_any_state() {
        let app = test_app().await;
        let user_auth = bearer(&app.user);
        let req = json_request(
            "POST",
            "/api/v1/orders",
            Some(&user_auth),
            serde_json::json!({
                "items": [{"product": app.product.id, "quantity": 1}],
                "shippingAddress": "addr",
                "paymentMethod": "COD",
            }),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        let body = body_json(response).await;
        let order_id = body["order"]["id"].as_str().unwrap().to_string();

        let admin_auth = bearer(&app.admin);
        for status in [OrderStatus::Delivered, OrderStatus::Pending] {
            let req = json_request(
                "PUT",
                &format!("/api/v1/orders/{order_id}/status"),
                Some(&admin_auth),
                serde_json::json!({"status": status.as_str()}),
            );
            let response = router(app.state.clone()).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["order"]["status"], status.as_str());
        }
    }

    #[tokio::test]
    async fn test_cart_endpoints() {
        let app = test_app().await;
        let auth = bearer(&app.user);

        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/cart")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["product"]["name"], "Gold Ring");
        assert_eq!(body[0]["quantity"], 2);

        let req = json_request(
            "POST",
            &format!("/api/v1/cart/add/{}", app.product.id),
            Some(&auth),
            serde_json::json!({"quantity": 1}),
        );
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.accounts.fetch(app.user.id).await.unwrap().unwrap().cart[0].quantity, 3);

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/cart/remove/{}", app.product.id))
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.accounts.fetch(app.user.id).await.unwrap().unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_product_admin_crud() {
        let app = test_app().await;
        let admin_auth = bearer(&app.admin);
        let user_auth = bearer(&app.user);

        let payload = serde_json::json!({
            "name": "Silver Chain",
            "price": "250",
            "stock": 10,
        });
        let req = json_request("POST", "/api/v1/products", Some(&user_auth), payload.clone());
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let req = json_request("POST", "/api/v1/products", Some(&admin_auth), payload);
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let id = body["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .method("GET")
            .uri(format!("/api/v1/products/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/products/{id}"))
            .header(header::AUTHORIZATION, &admin_auth)
            .body(Body::empty())
            .unwrap();
        let response = router(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(app.catalog.fetch(Uuid::parse_str(&id).unwrap()).await.unwrap().is_none());
    }
}
