//! Room unit model. Room units are owned by the property-management sync;
//! the reconciliation pass reads them and only writes `feature_signature`
//! and `changed`.

use roomcat_core::rfc::FeatureQuantity;
use roomcat_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `room_units` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomUnit {
    pub id: DbId,
    pub hotel_id: DbId,
    pub room_number: String,
    pub space: Option<f64>,
    pub feature_signature: Option<String>,
    /// Dirty flag set by the sync, cleared once a pass has processed the unit.
    pub changed: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `room_unit_retail_features` table.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct RoomUnitFeature {
    pub room_unit_id: DbId,
    pub retail_feature_id: DbId,
    pub quantity: i32,
}

impl From<RoomUnitFeature> for FeatureQuantity {
    fn from(row: RoomUnitFeature) -> Self {
        FeatureQuantity::new(row.retail_feature_id, row.quantity)
    }
}

/// DTO for creating a room unit together with its feature bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomUnit {
    pub hotel_id: DbId,
    pub room_number: String,
    pub space: Option<f64>,
    pub features: Vec<FeatureQuantity>,
}
