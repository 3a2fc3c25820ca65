//! Process configuration, read once at startup.

use crate::gateway::GatewayCredentials;
use anyhow::Context;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub nats_url: Option<String>,
    /// HS256 secret the auth collaborator signs bearer tokens with.
    pub auth_secret: String,
    /// Single-currency deployment; every price and total carries this code.
    pub currency: String,
    pub gateway: GatewayCredentials,
    pub gateway_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()).parse()?,
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            nats_url: std::env::var("NATS_URL").ok(),
            auth_secret: std::env::var("AUTH_SECRET").context("AUTH_SECRET is required")?,
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            gateway: GatewayCredentials {
                key_id: std::env::var("GATEWAY_KEY_ID").context("GATEWAY_KEY_ID is required")?,
                key_secret: std::env::var("GATEWAY_KEY_SECRET")
                    .context("GATEWAY_KEY_SECRET is required")?,
            },
            gateway_base_url: std::env::var("GATEWAY_URL")
                .unwrap_or_else(|_| crate::gateway::razorpay::DEFAULT_BASE_URL.to_string()),
        })
    }
}
