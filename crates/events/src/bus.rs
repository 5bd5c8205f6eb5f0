//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Delivery is best effort: events published with no subscribers are
//! dropped, and slow subscribers observe `RecvError::Lagged`.

use chrono::{DateTime, Utc};
use policydesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const POLICY_CREATED: &str = "policy.created";
pub const POLICY_UPDATED: &str = "policy.updated";
pub const POLICY_DELETED: &str = "policy.deleted";
pub const POLICY_RENEWED: &str = "policy.renewed";
pub const POLICY_FOLLOWUP_CHANGED: &str = "policy.followup_changed";
pub const SMS_LOG_CREATED: &str = "sms_log.created";
pub const SMS_LOG_READ: &str = "sms_log.read";
/// Published when the business date rolls over and every bucket may shift.
pub const BUSINESS_DATE_CHANGED: &str = "dashboard.date_changed";
/// Sent to subscribers that missed events; they should refetch everything.
pub const FEED_RESYNC: &str = "feed.resync";

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A change to a stored record.
///
/// Serialized as-is into WebSocket text frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Dot-separated event name, e.g. `"policy.renewed"`.
    pub event_type: String,

    /// Id of the changed row, when the event concerns a single row.
    pub source_entity_id: Option<DbId>,

    /// Id of the user that made the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_user_id: Option<DbId>,

    /// Event-specific data, usually the changed row.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create an event with an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_id: DbId) -> Self {
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Serialize `payload` into the event. Unserializable values leave it empty.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => self.payload = value,
            Err(e) => {
                tracing::warn!(event_type = %self.event_type, error = %e, "Dropping event payload");
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use policydesk_events::bus::{ChangeEvent, EventBus, POLICY_CREATED};
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
/// bus.publish(ChangeEvent::new(POLICY_CREATED).with_source(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(
            event_type = %event.event_type,
            source_entity_id = ?event.source_entity_id,
            "Publishing change event",
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn subscriber_receives_enriched_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            ChangeEvent::new(POLICY_RENEWED)
                .with_source(42)
                .with_actor(7)
                .with_payload(&serde_json::json!({"plate": "KCB 123A"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, POLICY_RENEWED);
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["plate"], "KCB 123A");
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ChangeEvent::new(SMS_LOG_CREATED));

        assert_eq!(rx1.recv().await.unwrap().event_type, SMS_LOG_CREATED);
        assert_eq!(rx2.recv().await.unwrap().event_type, SMS_LOG_CREATED);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(ChangeEvent::new(POLICY_UPDATED).with_source(id));
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().source_entity_id, Some(3));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        EventBus::default().publish(ChangeEvent::new(POLICY_DELETED));
    }

    #[test]
    fn actor_is_omitted_from_the_wire_when_absent() {
        let json = serde_json::to_value(ChangeEvent::new(POLICY_CREATED).with_source(1)).unwrap();
        assert!(json.get("actor_user_id").is_none());
        assert_eq!(json["source_entity_id"], 1);
        assert!(json["timestamp"].is_string());
    }
}
