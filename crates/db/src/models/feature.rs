//! Hotel feature catalogs: retail features (signature building blocks) and
//! standard features (replicated onto new RFCs).

use roomcat_core::rfc::CatalogFeature;
use roomcat_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hotel_retail_features` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HotelRetailFeature {
    pub id: DbId,
    pub hotel_id: DbId,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<HotelRetailFeature> for CatalogFeature {
    fn from(row: HotelRetailFeature) -> Self {
        CatalogFeature {
            id: row.id,
            code: row.code,
        }
    }
}

/// A row from the `hotel_standard_features` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HotelStandardFeature {
    pub id: DbId,
    pub hotel_id: DbId,
    pub code: String,
    pub name: String,
    pub created_at: Timestamp,
}

/// DTO for creating either kind of hotel feature.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHotelFeature {
    pub hotel_id: DbId,
    pub code: String,
    pub name: String,
}
