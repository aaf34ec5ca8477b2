//! Average-space recomputation for RFCs whose membership changed.

use std::collections::HashMap;

use roomcat_core::rfc::{plan_space_updates, PassPhase};
use roomcat_core::types::DbId;
use roomcat_db::repositories::{AssignedUnitRepo, RoomProductRepo};
use sqlx::PgConnection;

use crate::error::{persistence, ReconcileError};

const PHASE: PassPhase = PassPhase::Aggregating;

/// Recompute `average_space` for `product_ids` from their current members
/// and store the values that changed. Returns the `(id, value)` pairs written.
pub async fn sync_average_spaces(
    conn: &mut PgConnection,
    product_ids: &[DbId],
) -> Result<Vec<(DbId, i32)>, ReconcileError> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut member_spaces: HashMap<DbId, Vec<f64>> = HashMap::new();
    for row in AssignedUnitRepo::list_member_spaces(conn, product_ids)
        .await
        .map_err(persistence(PHASE))?
    {
        if let Some(space) = row.space {
            member_spaces.entry(row.room_product_id).or_default().push(space);
        }
    }

    let current: HashMap<DbId, i32> = RoomProductRepo::list_average_spaces(conn, product_ids)
        .await
        .map_err(persistence(PHASE))?
        .into_iter()
        .collect();

    let updates = plan_space_updates(product_ids, &member_spaces, &current);
    RoomProductRepo::update_average_spaces(conn, &updates)
        .await
        .map_err(persistence(PHASE))?;

    for (room_product_id, average_space) in &updates {
        tracing::debug!(room_product_id, average_space, "Updated average space");
    }
    Ok(updates)
}
