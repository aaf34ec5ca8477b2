//! Derived cluster-to-RFC mapping rows.

use roomcat_core::rfc::MappingPair;
use roomcat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `room_product_mappings` table.
///
/// `room_product_id` is the cluster product (MRFC/ERFC),
/// `related_room_product_id` the RFC.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomProductMapping {
    pub id: DbId,
    pub hotel_id: DbId,
    pub room_product_id: DbId,
    pub related_room_product_id: DbId,
    pub created_at: Timestamp,
}

impl RoomProductMapping {
    pub fn pair(&self) -> MappingPair {
        MappingPair {
            cluster_product_id: self.room_product_id,
            rfc_id: self.related_room_product_id,
        }
    }
}
