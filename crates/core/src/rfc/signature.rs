//! Feature signature builder.
//!
//! A signature is the canonical string form of a feature bundle:
//! `"{code};{quantity}"` for every catalog feature present with a positive
//! quantity, in catalog order, joined by commas. Two room units or products
//! are feature-equivalent iff their signatures are equal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// One (feature, quantity) pair attached to a room unit or room product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct FeatureQuantity {
    pub feature_id: DbId,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

impl FeatureQuantity {
    pub fn new(feature_id: DbId, quantity: i32) -> Self {
        Self {
            feature_id,
            quantity,
        }
    }
}

/// An active retail feature of a hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFeature {
    pub id: DbId,
    pub code: String,
}

/// Result of canonicalizing a feature bundle against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFeatures {
    pub signature: String,
    /// Qualifying features in catalog order. This is the representative
    /// bundle written to `room_product_retail_features`.
    pub features: Vec<FeatureQuantity>,
}

/// The hotel's active feature catalog in its stable order.
///
/// The caller supplies the features already sorted (creation time, then
/// code); the catalog never reorders them.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    features: Vec<CatalogFeature>,
}

impl FeatureCatalog {
    pub fn new(features: Vec<CatalogFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Canonicalize a bundle: validate quantities, drop zero quantities and
    /// features outside the catalog, and order the rest by catalog position.
    ///
    /// Listing the same feature twice is rejected.
    pub fn canonicalize(&self, bundle: &[FeatureQuantity]) -> Result<CanonicalFeatures, CoreError> {
        let mut by_feature: HashMap<DbId, i32> = HashMap::with_capacity(bundle.len());
        for entry in bundle {
            entry.validate().map_err(|e| {
                CoreError::Validation(format!("feature {}: {e}", entry.feature_id))
            })?;
            if by_feature.insert(entry.feature_id, entry.quantity).is_some() {
                return Err(CoreError::Validation(format!(
                    "feature {} listed more than once",
                    entry.feature_id
                )));
            }
        }

        let mut parts = Vec::new();
        let mut features = Vec::new();
        for feature in &self.features {
            match by_feature.get(&feature.id) {
                Some(&quantity) if quantity > 0 => {
                    parts.push(format!("{};{}", feature.code, quantity));
                    features.push(FeatureQuantity::new(feature.id, quantity));
                }
                _ => {}
            }
        }

        Ok(CanonicalFeatures {
            signature: parts.join(","),
            features,
        })
    }

    /// Signature only; see [`FeatureCatalog::canonicalize`].
    pub fn signature(&self, bundle: &[FeatureQuantity]) -> Result<String, CoreError> {
        self.canonicalize(bundle).map(|c| c.signature)
    }
}
