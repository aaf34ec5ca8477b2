//! Room product vocabulary: product types, lifecycle status, and the
//! settings a freshly created RFC starts with.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TYPE_RFC: &str = "RFC";
pub const TYPE_MRFC: &str = "MRFC";
pub const TYPE_ERFC: &str = "ERFC";

/// All valid product type strings.
pub const VALID_PRODUCT_TYPES: &[&str] = &[TYPE_RFC, TYPE_MRFC, TYPE_ERFC];

// ---------------------------------------------------------------------------
// ProductType
// ---------------------------------------------------------------------------

/// Kind of room product.
///
/// `Rfc` is the elementary type (exactly one feature signature). `Mrfc` and
/// `Erfc` are cluster types owned by other subsystems; the reconciliation
/// engine only reads their assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    Rfc,
    Mrfc,
    Erfc,
}

impl ProductType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TYPE_RFC => Ok(Self::Rfc),
            TYPE_MRFC => Ok(Self::Mrfc),
            TYPE_ERFC => Ok(Self::Erfc),
            _ => Err(CoreError::Validation(format!(
                "Invalid product type '{s}'. Must be one of: {}",
                VALID_PRODUCT_TYPES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value. Also used as the code prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rfc => TYPE_RFC,
            Self::Mrfc => TYPE_MRFC,
            Self::Erfc => TYPE_ERFC,
        }
    }

    /// Cluster types aggregate many room units and are orthogonal to RFC
    /// assignment.
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Mrfc | Self::Erfc)
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle and settings enums
// ---------------------------------------------------------------------------

/// Room product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Draft,
    Active,
    Inactive,
    Deleted,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Deleted => "DELETED",
        }
    }
}

/// How selling a product draws down inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationSetting {
    /// Selling the product deducts from the cluster products sharing its units.
    DeductFromClusterInventory,
    Independent,
}

impl AllocationSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeductFromClusterInventory => "DEDUCT_FROM_CLUSTER_INVENTORY",
            Self::Independent => "INDEPENDENT",
        }
    }
}

/// How the product's base price is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasePriceMode {
    FeatureBased,
    Fixed,
}

impl BasePriceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeatureBased => "FEATURE_BASED",
            Self::Fixed => "FIXED",
        }
    }
}

pub const CHANNEL_SALES_ENGINE: &str = "SALES_ENGINE";
pub const CHANNEL_VOICE: &str = "VOICE";

// ---------------------------------------------------------------------------
// NewRfcDefaults
// ---------------------------------------------------------------------------

/// Settings applied to every RFC the engine creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRfcDefaults {
    pub status: ProductStatus,
    pub allocation_setting: AllocationSetting,
    pub base_price_mode: BasePriceMode,
    pub distribution_channels: Vec<String>,
    pub number_of_bedrooms: i32,
}

impl Default for NewRfcDefaults {
    fn default() -> Self {
        Self {
            status: ProductStatus::Draft,
            allocation_setting: AllocationSetting::DeductFromClusterInventory,
            base_price_mode: BasePriceMode::FeatureBased,
            distribution_channels: vec![CHANNEL_SALES_ENGINE.to_string(), CHANNEL_VOICE.to_string()],
            number_of_bedrooms: 1,
        }
    }
}
