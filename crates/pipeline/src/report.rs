//! Summary of one committed reconciliation pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use roomcat_core::rfc::ScenarioKind;
use roomcat_core::types::DbId;
use serde::Serialize;
use uuid::Uuid;

/// What a pass did, logged on completion and published as
/// `rfc.pass_completed`.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub hotel_id: DbId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Room units whose dirty flag was cleared.
    pub changed_units: usize,
    pub groups: usize,
    pub scenarios: BTreeMap<ScenarioKind, usize>,
    pub created_rfc_ids: Vec<DbId>,
    pub retargeted_rfc_ids: Vec<DbId>,
    pub deleted_rfc_ids: Vec<DbId>,
    /// RFCs whose retail-feature rows were corrected in place.
    pub corrected_rfc_ids: Vec<DbId>,
    pub assignments_moved: usize,
    pub cascade_rows_deleted: u64,
    pub mappings_inserted: u64,
    pub mappings_deleted: u64,
    pub spaces_updated: usize,
    /// RFCs whose membership grew; availability is regenerated for these.
    pub availability_product_ids: Vec<DbId>,
    /// Surviving RFCs whose bundle or membership changed.
    pub pricing_product_ids: Vec<DbId>,
    pub conflicting_assignments: usize,
    pub duplicate_signatures: usize,
    /// Deleted RFCs that had several members when the pass started.
    pub multi_member_deletions: usize,
}

impl PassReport {
    pub(crate) fn new(hotel_id: DbId, started_at: DateTime<Utc>) -> Self {
        Self {
            pass_id: Uuid::now_v7(),
            hotel_id,
            started_at,
            finished_at: started_at,
            changed_units: 0,
            groups: 0,
            scenarios: BTreeMap::new(),
            created_rfc_ids: Vec::new(),
            retargeted_rfc_ids: Vec::new(),
            deleted_rfc_ids: Vec::new(),
            corrected_rfc_ids: Vec::new(),
            assignments_moved: 0,
            cascade_rows_deleted: 0,
            mappings_inserted: 0,
            mappings_deleted: 0,
            spaces_updated: 0,
            availability_product_ids: Vec::new(),
            pricing_product_ids: Vec::new(),
            conflicting_assignments: 0,
            duplicate_signatures: 0,
            multi_member_deletions: 0,
        }
    }

    /// `true` when the pass wrote nothing at all.
    pub fn is_noop(&self) -> bool {
        self.changed_units == 0
            && self.created_rfc_ids.is_empty()
            && self.retargeted_rfc_ids.is_empty()
            && self.deleted_rfc_ids.is_empty()
            && self.corrected_rfc_ids.is_empty()
            && self.assignments_moved == 0
            && self.mappings_inserted == 0
            && self.mappings_deleted == 0
            && self.spaces_updated == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
