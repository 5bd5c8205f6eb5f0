//! Fan-out of change events to WebSocket clients.
//!
//! [`ChangeFeed`] subscribes to the [`EventBus`](policydesk_events::EventBus)
//! and forwards every [`ChangeEvent`] to all connected dashboards as a JSON
//! text frame. Clients that still poll are unaffected.

use std::sync::Arc;

use axum::extract::ws::Message;
use policydesk_events::bus::FEED_RESYNC;
use policydesk_events::ChangeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct ChangeFeed {
    ws_manager: Arc<WsManager>,
}

impl ChangeFeed {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Forward events until the bus is dropped.
    ///
    /// When the receiver lags, the skipped events are gone, so clients get
    /// a `feed.resync` event telling them to refetch.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change feed lagged, asking clients to resync");
                    self.forward(&ChangeEvent::new(FEED_RESYNC)).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, change feed shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &ChangeEvent) {
        match serde_json::to_string(event) {
            Ok(text) => {
                let delivered = self.ws_manager.broadcast(Message::Text(text.into())).await;
                tracing::debug!(event_type = %event.event_type, delivered, "Change event forwarded");
            }
            Err(e) => {
                tracing::error!(event_type = %event.event_type, error = %e, "Failed to encode change event");
            }
        }
    }
}
