//! Repository for the `inventory_events` table.

use roomcat_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::InventoryEventRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, event_type, hotel_id, source_entity_type, source_entity_id, payload, created_at";

/// Provides read/write operations for persisted inventory events.
pub struct InventoryEventRepo;

impl InventoryEventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        hotel_id: Option<DbId>,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO inventory_events \
                (event_type, hotel_id, source_entity_type, source_entity_id, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(hotel_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Events of one type for a hotel, oldest first.
    pub async fn list_by_type(
        pool: &PgPool,
        hotel_id: DbId,
        event_type: &str,
    ) -> Result<Vec<InventoryEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory_events
             WHERE hotel_id = $1 AND event_type = $2
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, InventoryEventRow>(&query)
            .bind(hotel_id)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }
}
