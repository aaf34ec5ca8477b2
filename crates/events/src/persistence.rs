//! Writes every bus event to `inventory_events`, where the availability
//! and pricing workers poll for pending work.

use roomcat_core::types::DbId;
use roomcat_db::repositories::InventoryEventRepo;
use roomcat_db::DbPool;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::bus::InventoryEvent;

pub struct EventPersistence;

impl EventPersistence {
    /// Drain `receiver` into the database until every sender is gone.
    ///
    /// A failed insert is logged and the loop moves on; the pass that
    /// produced the event has already committed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<InventoryEvent>) {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Inventory event writer fell behind, events lost");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match Self::persist(&pool, &event).await {
                Ok(id) => tracing::debug!(
                    event_id = id,
                    event_type = %event.event_type,
                    hotel_id = event.hotel_id,
                    "Inventory event stored"
                ),
                Err(e) => tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    hotel_id = event.hotel_id,
                    "Failed to store inventory event"
                ),
            }
        }
        tracing::info!("Inventory event writer stopped");
    }

    pub async fn persist(pool: &DbPool, event: &InventoryEvent) -> Result<DbId, sqlx::Error> {
        InventoryEventRepo::insert(
            pool,
            &event.event_type,
            Some(event.hotel_id),
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            &event.payload,
        )
        .await
    }
}
