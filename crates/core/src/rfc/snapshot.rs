//! Pre-loaded input of one reconciliation pass.

use serde::{Deserialize, Serialize};

use crate::rfc::signature::{FeatureCatalog, FeatureQuantity};
use crate::types::DbId;

/// A room unit flagged `changed`, with its current feature bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedUnit {
    pub id: DbId,
    pub features: Vec<FeatureQuantity>,
}

/// An active RFC as persisted at pass start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfcRecord {
    pub id: DbId,
    pub code: String,
    pub feature_signature: Option<String>,
    pub retail_features: Vec<FeatureQuantity>,
}

/// Everything the planner reads, loaded inside the pass transaction.
#[derive(Debug, Clone)]
pub struct PassSnapshot {
    pub hotel_id: DbId,
    pub catalog: FeatureCatalog,
    pub changed_units: Vec<ChangedUnit>,
    /// Active RFCs of the hotel.
    pub rfcs: Vec<RfcRecord>,
    /// `(room_unit_id, rfc_id)` for every assignment to an active RFC.
    pub rfc_assignments: Vec<(DbId, DbId)>,
    /// Highest RFC code number ever issued for the hotel, tombstones included.
    pub max_code_number: u32,
}
