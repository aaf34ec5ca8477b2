//! Cross-type mapping resync for a whole hotel.

use roomcat_core::rfc::{plan_mapping_sync, PassPhase, ProductType, TypedAssignment};
use roomcat_core::types::DbId;
use roomcat_db::models::assignment::TypedAssignmentRow;
use roomcat_db::repositories::{AssignedUnitRepo, ProductMappingRepo};
use sqlx::PgConnection;

use crate::error::{persistence, ReconcileError};

const PHASE: PassPhase = PassPhase::Mapping;

/// Rows written by one mapping resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSyncOutcome {
    pub inserted: u64,
    pub deleted: u64,
}

/// Bring `room_product_mappings` in line with the hotel's current
/// assignments. Writes nothing when they already agree.
pub async fn sync_mappings(
    conn: &mut PgConnection,
    hotel_id: DbId,
) -> Result<MappingSyncOutcome, ReconcileError> {
    let assignments = AssignedUnitRepo::list_typed(conn, hotel_id)
        .await
        .map_err(persistence(PHASE))?
        .into_iter()
        .map(typed)
        .collect::<Result<Vec<_>, _>>()?;

    let persisted = ProductMappingRepo::list_for_hotel(conn, hotel_id)
        .await
        .map_err(persistence(PHASE))?;

    let diff = plan_mapping_sync(&assignments, persisted.iter().map(|row| row.pair()));
    if diff.is_empty() {
        tracing::debug!(hotel_id, "Mappings already in sync");
        return Ok(MappingSyncOutcome::default());
    }

    let deleted = ProductMappingRepo::delete_pairs(conn, hotel_id, &diff.to_delete)
        .await
        .map_err(persistence(PHASE))?;
    let inserted = ProductMappingRepo::insert_many(conn, hotel_id, &diff.to_insert)
        .await
        .map_err(persistence(PHASE))?;

    tracing::info!(hotel_id, inserted, deleted, "Resynced cross-type mappings");
    Ok(MappingSyncOutcome { inserted, deleted })
}

fn typed(row: TypedAssignmentRow) -> Result<TypedAssignment, ReconcileError> {
    Ok(TypedAssignment {
        room_unit_id: row.room_unit_id,
        room_product_id: row.room_product_id,
        product_type: ProductType::from_str_value(&row.product_type)?,
    })
}
