//! Cross-type mapping computation.
//!
//! A `(cluster product, RFC)` mapping row exists iff at least one room unit
//! is assigned to both. The table is a pure function of assignment state:
//! every pass recomputes the expected set and diffs it against storage.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::diff::{diff_sets, SetDiff};
use crate::rfc::product::ProductType;
use crate::types::DbId;

/// One assignment edge together with the type of its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedAssignment {
    pub room_unit_id: DbId,
    pub room_product_id: DbId,
    pub product_type: ProductType,
}

/// Key of a `room_product_mappings` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MappingPair {
    pub cluster_product_id: DbId,
    pub rfc_id: DbId,
}

/// Every `(cluster, rfc)` pair that shares at least one room unit.
pub fn expected_mappings(assignments: &[TypedAssignment]) -> BTreeSet<MappingPair> {
    #[derive(Default)]
    struct UnitProducts {
        clusters: BTreeSet<DbId>,
        rfcs: BTreeSet<DbId>,
    }

    let mut by_unit: BTreeMap<DbId, UnitProducts> = BTreeMap::new();
    for edge in assignments {
        let entry = by_unit.entry(edge.room_unit_id).or_default();
        if edge.product_type.is_cluster() {
            entry.clusters.insert(edge.room_product_id);
        } else {
            entry.rfcs.insert(edge.room_product_id);
        }
    }

    let mut expected = BTreeSet::new();
    for products in by_unit.values() {
        for &cluster_product_id in &products.clusters {
            for &rfc_id in &products.rfcs {
                expected.insert(MappingPair {
                    cluster_product_id,
                    rfc_id,
                });
            }
        }
    }
    expected
}

/// Writes needed to bring the persisted mappings in line with assignments.
pub fn plan_mapping_sync(
    assignments: &[TypedAssignment],
    persisted: impl IntoIterator<Item = MappingPair>,
) -> SetDiff<MappingPair> {
    let actual: BTreeSet<MappingPair> = persisted.into_iter().collect();
    diff_sets(&expected_mappings(assignments), &actual)
}
