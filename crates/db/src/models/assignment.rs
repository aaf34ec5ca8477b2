//! Room-unit-to-product assignment edges.

use roomcat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `room_product_assigned_units` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomProductAssignedUnit {
    pub id: DbId,
    pub hotel_id: DbId,
    pub room_product_id: DbId,
    pub room_unit_id: DbId,
    pub created_at: Timestamp,
}

/// An assignment joined with its product's type.
#[derive(Debug, Clone, FromRow)]
pub struct TypedAssignmentRow {
    pub room_unit_id: DbId,
    pub room_product_id: DbId,
    pub product_type: String,
}

/// A member room unit's space, keyed by product.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct MemberSpace {
    pub room_product_id: DbId,
    pub space: Option<f64>,
}
