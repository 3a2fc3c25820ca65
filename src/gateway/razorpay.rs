//! Razorpay orders API client.

use super::{GatewayCredentials, GatewayError, PaymentGateway, RemoteOrder};
use async_trait::async_trait;
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

pub struct RazorpayGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: GatewayCredentials,
}

impl RazorpayGateway {
    pub fn new(credentials: GatewayCredentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: GatewayCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_remote_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RemoteOrder, GatewayError> {
        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .json(&CreateOrderBody { amount, currency, receipt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status: status.as_u16(), body });
        }
        Ok(response.json().await?)
    }
}
