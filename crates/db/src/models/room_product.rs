//! Room product model and DTOs.

use roomcat_core::error::CoreError;
use roomcat_core::rfc::{NewRfcDefaults, ProductType};
use roomcat_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `room_products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomProduct {
    pub id: DbId,
    pub hotel_id: DbId,
    pub code: String,
    pub name: String,
    /// One of `RFC`, `MRFC`, `ERFC`.
    pub product_type: String,
    /// Only meaningful for RFCs.
    pub feature_signature: Option<String>,
    pub status: String,
    pub allocation_setting: String,
    pub base_price_mode: String,
    pub distribution_channels: Vec<String>,
    pub number_of_bedrooms: i32,
    pub average_space: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoomProduct {
    /// Parse the stored product type.
    pub fn kind(&self) -> Result<ProductType, CoreError> {
        ProductType::from_str_value(&self.product_type)
    }
}

/// DTO for inserting a room product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomProduct {
    pub hotel_id: DbId,
    pub code: String,
    pub name: String,
    pub product_type: ProductType,
    pub feature_signature: Option<String>,
    pub status: String,
    pub allocation_setting: String,
    pub base_price_mode: String,
    pub distribution_channels: Vec<String>,
    pub number_of_bedrooms: i32,
}

impl CreateRoomProduct {
    /// An engine-created RFC: named after its code, with the given defaults.
    pub fn rfc(hotel_id: DbId, code: &str, signature: &str, defaults: &NewRfcDefaults) -> Self {
        Self {
            hotel_id,
            code: code.to_string(),
            name: code.to_string(),
            product_type: ProductType::Rfc,
            feature_signature: Some(signature.to_string()),
            status: defaults.status.as_str().to_string(),
            allocation_setting: defaults.allocation_setting.as_str().to_string(),
            base_price_mode: defaults.base_price_mode.as_str().to_string(),
            distribution_channels: defaults.distribution_channels.clone(),
            number_of_bedrooms: defaults.number_of_bedrooms,
        }
    }

    /// A cluster-type product (MRFC/ERFC). These are authored by other
    /// subsystems; the constructor exists for seeding and tests.
    pub fn cluster(hotel_id: DbId, product_type: ProductType, code: &str) -> Self {
        let defaults = NewRfcDefaults::default();
        Self {
            hotel_id,
            code: code.to_string(),
            name: code.to_string(),
            product_type,
            feature_signature: None,
            status: defaults.status.as_str().to_string(),
            allocation_setting: defaults.allocation_setting.as_str().to_string(),
            base_price_mode: defaults.base_price_mode.as_str().to_string(),
            distribution_channels: defaults.distribution_channels,
            number_of_bedrooms: defaults.number_of_bedrooms,
        }
    }
}
