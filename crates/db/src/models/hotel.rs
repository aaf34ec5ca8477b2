//! Hotel entity model and DTOs.

use roomcat_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hotels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hotel {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new hotel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHotel {
    pub code: String,
    pub name: String,
}
