//! Notification fan-out for alert lifecycle events
//!
//! The store publishes through the [`NotificationSink`] trait so the core
//! has no dependency on a specific transport. Sinks swallow and log their
//! own delivery failures; a dead webhook must never abort an evaluation
//! cycle.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{error, info, trace};

use super::AlertRecord;

/// Alert lifecycle event delivered to subscribers.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    Created(AlertRecord),
    Resolved(AlertRecord),
}

impl AlertEvent {
    pub fn record(&self) -> &AlertRecord {
        match self {
            AlertEvent::Created(record) | AlertEvent::Resolved(record) => record,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AlertEvent::Created(_) => "created",
            AlertEvent::Resolved(_) => "resolved",
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: &AlertEvent);
}

/// In-process fan-out over a tokio broadcast channel.
///
/// Slow subscribers may lag and drop events; that is acceptable, the alert
/// store remains the source of truth.
pub struct BroadcastSink {
    sender: broadcast::Sender<AlertEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl NotificationSink for BroadcastSink {
    async fn publish(&self, event: &AlertEvent) {
        // A send error just means there are no subscribers right now.
        match self.sender.send(event.clone()) {
            Ok(receivers) => trace!("published alert event to {receivers} receivers"),
            Err(_) => trace!("no receivers for alert event"),
        }
    }
}

/// Posts alert lifecycle events to an HTTP webhook as JSON.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn publish(&self, event: &AlertEvent) {
        let record = event.record();

        let payload = json!({
            "event": event.name(),
            "alert": record,
            "timestamp": Utc::now().to_rfc3339(),
        });

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("sent {} webhook for alert {}", event.name(), record.id);
                } else {
                    error!("alert webhook failed with status: {}", response.status());
                }
            }
            Err(e) => {
                error!("failed to send alert webhook: {e}");
            }
        }
    }
}
