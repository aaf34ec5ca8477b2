//! Broadcast hub for [`InventoryEvent`]s.
//!
//! The reconciler publishes after a pass commits; [`EventPersistence`]
//! and any in-process listener subscribe. One `Arc<EventBus>` is shared
//! by both sides.
//!
//! [`EventPersistence`]: crate::EventPersistence

use chrono::{DateTime, Utc};
use roomcat_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event names published by the reconciliation pipeline.
pub mod event_types {
    /// Availability must be regenerated for RFCs whose membership grew.
    pub const AVAILABILITY_REGENERATE: &str = "room_product.availability_regenerate";

    /// Prices must be recalculated for RFCs whose bundle or membership changed.
    pub const PRICING_RECALCULATE: &str = "room_product.pricing_recalculate";

    /// A reconciliation pass committed; payload is the pass report.
    pub const PASS_COMPLETED: &str = "rfc.pass_completed";
}

/// A change to one hotel's room inventory that downstream services act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEvent {
    /// One of [`event_types`].
    pub event_type: String,
    pub hotel_id: DbId,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// Event-specific data; always a JSON object.
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl InventoryEvent {
    pub fn new(event_type: impl Into<String>, hotel_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            hotel_id,
            source_entity_type: None,
            source_entity_id: None,
            payload: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    /// Record which entity the event is about (`"hotel"`, `"room_product"`).
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Room product ids listed under `room_product_ids` in the payload.
    pub fn room_product_ids(&self) -> Vec<DbId> {
        self.payload
            .get("room_product_ids")
            .and_then(serde_json::Value::as_array)
            .map(|ids| ids.iter().filter_map(serde_json::Value::as_i64).collect())
            .unwrap_or_default()
    }
}

/// Events buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 1024;

/// Fan-out bus: every subscriber sees every event published after it
/// subscribed.
pub struct EventBus {
    sender: broadcast::Sender<InventoryEvent>,
}

impl EventBus {
    /// A bus buffering `capacity` events. Receivers that fall further
    /// behind get `RecvError::Lagged` and skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to current subscribers and return how many there were.
    ///
    /// With no subscribers the event is dropped; publishing never fails
    /// the caller.
    pub fn publish(&self, event: InventoryEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(
                    event_type = %event.event_type,
                    hotel_id = event.hotel_id,
                    "No subscribers, inventory event dropped"
                );
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}
