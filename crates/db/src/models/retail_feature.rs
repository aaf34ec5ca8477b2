//! Per-product retail feature rows (the RFC's feature bundle).

use roomcat_core::rfc::FeatureQuantity;
use roomcat_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `room_product_retail_features` table.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct RoomProductRetailFeature {
    pub id: DbId,
    pub hotel_id: DbId,
    pub room_product_id: DbId,
    pub retail_feature_id: DbId,
    pub quantity: i32,
}

impl From<RoomProductRetailFeature> for FeatureQuantity {
    fn from(row: RoomProductRetailFeature) -> Self {
        FeatureQuantity::new(row.retail_feature_id, row.quantity)
    }
}
