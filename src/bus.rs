//! Best-effort domain event publication over NATS.
//!
//! Publication never fails an order: a dead broker degrades to a warning and
//! the flow carries on. Without a configured broker events are only traced.

use crate::domain::events::OrderEvent;

pub struct EventBus {
    nats: Option<async_nats::Client>,
    subject_prefix: String,
}

impl EventBus {
    pub fn new(nats: Option<async_nats::Client>, subject_prefix: impl Into<String>) -> Self {
        Self { nats, subject_prefix: subject_prefix.into() }
    }

    pub fn disabled() -> Self {
        Self::new(None, "commerce")
    }

    pub async fn publish(&self, event: &OrderEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode event");
                return;
            }
        };
        match &self.nats {
            Some(client) => {
                let subject = format!("{}.{}", self.subject_prefix, event.subject());
                if let Err(e) = client.publish(subject, payload.into()).await {
                    tracing::warn!(error = %e, "failed to publish event");
                }
            }
            None => tracing::debug!(subject = event.subject(), "event (bus disabled)"),
        }
    }
}
