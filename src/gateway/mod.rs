//! Payment gateway boundary.
//!
//! The gateway is an untrusted external collaborator: it creates a remote
//! payment order before the customer pays, and later the client relays a
//! signed confirmation back to us. Only the keyed-hash check in [`signature`]
//! decides whether that confirmation is genuine.

pub mod razorpay;
pub mod signature;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable gateway credentials, injected at construction time. The secret
/// doubles as the HMAC key for confirmation signatures.
#[derive(Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

impl std::fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// The provider-side order record, handed back to the client so it can drive
/// the gateway's payment UI.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway rejected order creation: {status} {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a provider-side order for `amount` minor units.
    async fn create_remote_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RemoteOrder, GatewayError>;
}
