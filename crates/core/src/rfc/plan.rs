//! Pass planner: turns a [`PassSnapshot`] into the minimal set of catalog
//! writes that converge RFCs with the current room-unit feature data.
//!
//! Groups are reconciled strictly in sequence. Each one sees the ownership
//! moves, new codes, and signature changes decided by the groups before it.
//! The resulting [`PassPlan`] is storage-agnostic; the pipeline crate applies
//! it inside a single transaction.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::diff::{diff_keyed, DiffStatus};
use crate::error::CoreError;
use crate::rfc::classify::{classify, Scenario, ScenarioKind};
use crate::rfc::code::CodeSequence;
use crate::rfc::group::{group_by_signature, SignatureGroup, UnitSignature};
use crate::rfc::ownership::{OwnershipIndex, ProductRef};
use crate::rfc::product::ProductType;
use crate::rfc::signature::FeatureQuantity;
use crate::rfc::snapshot::PassSnapshot;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// An RFC to create. `key` is its index in [`PassPlan::creations`] and the
/// payload of the matching [`ProductRef::New`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRfc {
    pub key: usize,
    pub code: String,
    pub signature: String,
    pub features: Vec<FeatureQuantity>,
}

/// In-place signature change of an existing RFC (UPDATE_EXISTING).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfcRetarget {
    pub rfc_id: DbId,
    pub previous_signature: Option<String>,
    pub signature: String,
    /// Full replacement bundle for the RFC's retail-feature rows.
    pub features: Vec<FeatureQuantity>,
    /// Features the RFC no longer carries; their rate adjustments go too.
    pub removed_feature_ids: Vec<DbId>,
}

/// Row-level correction of a matched RFC's retail features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetailFeatureSync {
    pub rfc_id: DbId,
    pub inserts: Vec<FeatureQuantity>,
    pub updates: Vec<FeatureQuantity>,
    pub removed_feature_ids: Vec<DbId>,
}

/// One assignment edge change: delete `(unit, from)` if any, insert
/// `(unit, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssignmentMove {
    pub room_unit_id: DbId,
    pub from: Option<ProductRef>,
    pub to: ProductRef,
}

/// Outcome of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDecision {
    pub signature: String,
    pub unit_ids: Vec<DbId>,
    pub scenario: Scenario,
    pub target: ProductRef,
}

/// The complete set of writes for one pass, in application order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassPlan {
    pub hotel_id: DbId,
    #[serde(skip)]
    pub unit_signatures: Vec<UnitSignature>,
    pub decisions: Vec<GroupDecision>,
    pub creations: Vec<NewRfc>,
    pub retargets: Vec<RfcRetarget>,
    pub feature_syncs: Vec<RetailFeatureSync>,
    pub moves: Vec<AssignmentMove>,
    /// RFCs emptied by this pass; cascade-deleted after the moves.
    pub deletions: Vec<DbId>,
    /// Surviving RFCs that gained at least one unit.
    pub grown: BTreeSet<ProductRef>,
    /// Surviving RFCs that gained or lost units.
    pub membership_changed: BTreeSet<ProductRef>,
    /// Surviving RFCs whose signature or retail-feature rows changed.
    pub bundle_changed: BTreeSet<ProductRef>,
    /// `(room_unit_id, rfc_id)` rows ignored because the unit already had a
    /// lower-id active RFC.
    pub conflicting_assignments: Vec<(DbId, DbId)>,
    /// `(signature, rfc_id)` of active RFCs shadowed by a lower-id RFC with
    /// the same signature.
    pub duplicate_signatures: Vec<(String, DbId)>,
    /// `(rfc_id, members_at_pass_start)` of deleted RFCs that had more than
    /// one member when the pass started and were emptied within it.
    pub multi_member_deletions: Vec<(DbId, usize)>,
}

impl PassPlan {
    /// Room units processed by this pass (their dirty flag gets cleared).
    pub fn processed_unit_ids(&self) -> Vec<DbId> {
        self.unit_signatures.iter().map(|s| s.room_unit_id).collect()
    }

    /// `true` when the plan contains no catalog writes.
    pub fn is_noop(&self) -> bool {
        self.creations.is_empty()
            && self.retargets.is_empty()
            && self.feature_syncs.is_empty()
            && self.moves.is_empty()
            && self.deletions.is_empty()
    }

    /// Number of groups per scenario.
    pub fn scenario_counts(&self) -> BTreeMap<ScenarioKind, usize> {
        let mut counts = BTreeMap::new();
        for decision in &self.decisions {
            *counts.entry(decision.scenario.kind()).or_insert(0) += 1;
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Plan one pass.
///
/// Fails with [`CoreError::Validation`] on malformed feature data and with
/// [`CoreError::Internal`] if the result would leave an active RFC without
/// members.
pub fn plan_pass(snapshot: &PassSnapshot) -> Result<PassPlan, CoreError> {
    let (groups, unit_signatures) =
        group_by_signature(&snapshot.catalog, &snapshot.changed_units)?;

    let mut planner = Planner::new(snapshot);
    for group in &groups {
        planner.reconcile_group(group);
    }

    let mut plan = planner.finish()?;
    plan.unit_signatures = unit_signatures;
    Ok(plan)
}

struct Planner {
    ownership: OwnershipIndex,
    by_signature: HashMap<String, ProductRef>,
    signature_of: HashMap<DbId, Option<String>>,
    retail_features: HashMap<DbId, Vec<FeatureQuantity>>,
    codes: CodeSequence,
    deletion_candidates: BTreeSet<ProductRef>,
    initial_member_counts: HashMap<DbId, usize>,
    plan: PassPlan,
}

impl Planner {
    fn new(snapshot: &PassSnapshot) -> Self {
        let (ownership, conflicting_assignments) =
            OwnershipIndex::from_assignments(snapshot.rfc_assignments.iter().copied());

        let mut rfcs: Vec<_> = snapshot.rfcs.iter().collect();
        rfcs.sort_unstable_by_key(|r| r.id);

        let mut by_signature = HashMap::with_capacity(rfcs.len());
        let mut duplicate_signatures = Vec::new();
        for rfc in &rfcs {
            if let Some(signature) = &rfc.feature_signature {
                if by_signature.contains_key(signature) {
                    duplicate_signatures.push((signature.clone(), rfc.id));
                } else {
                    by_signature.insert(signature.clone(), ProductRef::Existing(rfc.id));
                }
            }
        }

        let initial_member_counts = rfcs
            .iter()
            .map(|r| (r.id, ownership.member_count(ProductRef::Existing(r.id))))
            .collect();

        Self {
            ownership,
            by_signature,
            signature_of: rfcs
                .iter()
                .map(|r| (r.id, r.feature_signature.clone()))
                .collect(),
            retail_features: rfcs
                .iter()
                .map(|r| (r.id, r.retail_features.clone()))
                .collect(),
            codes: CodeSequence::after(ProductType::Rfc, snapshot.max_code_number),
            deletion_candidates: BTreeSet::new(),
            initial_member_counts,
            plan: PassPlan {
                hotel_id: snapshot.hotel_id,
                conflicting_assignments,
                duplicate_signatures,
                ..PassPlan::default()
            },
        }
    }

    fn reconcile_group(&mut self, group: &SignatureGroup) {
        let scenario = classify(group, &self.by_signature, &self.ownership);

        let target = match scenario {
            Scenario::MatchedExisting { rfc } => {
                if let Some(rfc_id) = rfc.existing_id() {
                    self.sync_retail_features(rfc_id, &group.features);
                }
                rfc
            }
            Scenario::NewClean | Scenario::SplitOrMerge => self.create_rfc(group),
            Scenario::UpdateExisting { rfc_id } => {
                self.retarget_rfc(rfc_id, group);
                ProductRef::Existing(rfc_id)
            }
        };

        self.move_units(group, target);

        self.plan.decisions.push(GroupDecision {
            signature: group.signature.clone(),
            unit_ids: group.unit_ids.iter().copied().collect(),
            scenario,
            target,
        });
    }

    fn create_rfc(&mut self, group: &SignatureGroup) -> ProductRef {
        let key = self.plan.creations.len();
        let target = ProductRef::New(key);

        self.plan.creations.push(NewRfc {
            key,
            code: self.codes.next_code(),
            signature: group.signature.clone(),
            features: group.features.clone(),
        });
        self.by_signature.insert(group.signature.clone(), target);
        self.plan.bundle_changed.insert(target);
        target
    }

    fn retarget_rfc(&mut self, rfc_id: DbId, group: &SignatureGroup) {
        let this = ProductRef::Existing(rfc_id);
        let previous_signature = self.signature_of.get(&rfc_id).cloned().flatten();

        if let Some(previous) = &previous_signature {
            if self.by_signature.get(previous) == Some(&this) {
                self.by_signature.remove(previous);
            }
        }
        self.by_signature.insert(group.signature.clone(), this);
        self.signature_of
            .insert(rfc_id, Some(group.signature.clone()));

        let kept: BTreeSet<DbId> = group.features.iter().map(|f| f.feature_id).collect();
        let removed_feature_ids = self
            .retail_features
            .get(&rfc_id)
            .map(|old| {
                old.iter()
                    .map(|f| f.feature_id)
                    .filter(|id| !kept.contains(id))
                    .collect()
            })
            .unwrap_or_default();
        self.retail_features.insert(rfc_id, group.features.clone());

        self.plan.retargets.push(RfcRetarget {
            rfc_id,
            previous_signature,
            signature: group.signature.clone(),
            features: group.features.clone(),
            removed_feature_ids,
        });
        self.plan.bundle_changed.insert(this);
    }

    fn sync_retail_features(&mut self, rfc_id: DbId, features: &[FeatureQuantity]) {
        let expected: BTreeMap<DbId, i32> =
            features.iter().map(|f| (f.feature_id, f.quantity)).collect();
        let actual: BTreeMap<DbId, i32> = self
            .retail_features
            .get(&rfc_id)
            .map(|rows| rows.iter().map(|f| (f.feature_id, f.quantity)).collect())
            .unwrap_or_default();

        let changes = diff_keyed(&expected, &actual);
        if changes.is_empty() {
            return;
        }

        let mut sync = RetailFeatureSync {
            rfc_id,
            inserts: Vec::new(),
            updates: Vec::new(),
            removed_feature_ids: Vec::new(),
        };
        for change in changes {
            match (change.status, change.value) {
                (DiffStatus::Added, Some(quantity)) => {
                    sync.inserts.push(FeatureQuantity::new(change.key, quantity));
                }
                (DiffStatus::Changed, Some(quantity)) => {
                    sync.updates.push(FeatureQuantity::new(change.key, quantity));
                }
                (DiffStatus::Removed, _) => sync.removed_feature_ids.push(change.key),
                _ => {}
            }
        }

        self.retail_features.insert(rfc_id, features.to_vec());
        self.plan.feature_syncs.push(sync);
        self.plan.bundle_changed.insert(ProductRef::Existing(rfc_id));
    }

    fn move_units(&mut self, group: &SignatureGroup, target: ProductRef) {
        for &unit in &group.unit_ids {
            if self.ownership.owner_of(unit) == Some(target) {
                continue;
            }
            let from = self.ownership.assign(unit, target);

            self.plan.moves.push(AssignmentMove {
                room_unit_id: unit,
                from,
                to: target,
            });
            self.plan.grown.insert(target);
            self.plan.membership_changed.insert(target);

            if let Some(previous) = from {
                self.plan.membership_changed.insert(previous);
                // The move took the previous owner's last member.
                if self.ownership.member_count(previous) == 0 {
                    self.deletion_candidates.insert(previous);
                }
            }
        }
    }

    fn finish(mut self) -> Result<PassPlan, CoreError> {
        let mut deleted = BTreeSet::new();
        for candidate in &self.deletion_candidates {
            // A later group may have refilled a matched RFC.
            if self.ownership.member_count(*candidate) > 0 {
                continue;
            }
            match candidate {
                ProductRef::Existing(id) => {
                    deleted.insert(*candidate);
                    self.plan.deletions.push(*id);
                    let initial = self.initial_member_counts.get(id).copied().unwrap_or(0);
                    if initial > 1 {
                        self.plan.multi_member_deletions.push((*id, initial));
                    }
                }
                ProductRef::New(key) => {
                    return Err(CoreError::Internal(format!(
                        "RFC created in this pass (key {key}) lost all members"
                    )));
                }
            }
        }

        for set in [
            &mut self.plan.grown,
            &mut self.plan.membership_changed,
            &mut self.plan.bundle_changed,
        ] {
            set.retain(|product| !deleted.contains(product));
        }

        for product in &self.plan.membership_changed {
            if self.ownership.member_count(*product) == 0 {
                return Err(CoreError::Internal(format!(
                    "RFC {product} would be left active without assigned units"
                )));
            }
        }

        Ok(self.plan)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::rfc::signature::{CatalogFeature, FeatureCatalog};
    use crate::rfc::snapshot::{ChangedUnit, RfcRecord};

    const WIFI: DbId = 1;
    const POOL: DbId = 2;

    fn catalog() -> FeatureCatalog {
        FeatureCatalog::new(vec![
            CatalogFeature { id: WIFI, code: "WIFI".into() },
            CatalogFeature { id: POOL, code: "POOL".into() },
        ])
    }

    fn unit(id: DbId, features: &[(DbId, i32)]) -> ChangedUnit {
        ChangedUnit {
            id,
            features: features
                .iter()
                .map(|&(f, q)| FeatureQuantity::new(f, q))
                .collect(),
        }
    }

    fn rfc(id: DbId, code: &str, signature: &str, features: &[(DbId, i32)]) -> RfcRecord {
        RfcRecord {
            id,
            code: code.to_string(),
            feature_signature: Some(signature.to_string()),
            retail_features: features
                .iter()
                .map(|&(f, q)| FeatureQuantity::new(f, q))
                .collect(),
        }
    }

    fn snapshot(
        changed_units: Vec<ChangedUnit>,
        rfcs: Vec<RfcRecord>,
        rfc_assignments: Vec<(DbId, DbId)>,
        max_code_number: u32,
    ) -> PassSnapshot {
        PassSnapshot {
            hotel_id: 1,
            catalog: catalog(),
            changed_units,
            rfcs,
            rfc_assignments,
            max_code_number,
        }
    }

    #[test]
    fn empty_change_set_is_a_noop_plan() {
        let plan = plan_pass(&snapshot(vec![], vec![], vec![], 0)).unwrap();
        assert!(plan.is_noop());
        assert!(plan.decisions.is_empty());
        assert!(plan.processed_unit_ids().is_empty());
    }

    #[test]
    fn new_clean_groups_get_contiguous_codes() {
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(WIFI, 1)]), unit(2, &[(POOL, 1)])],
            vec![],
            vec![],
            3,
        ))
        .unwrap();

        let codes: Vec<_> = plan.creations.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["RFC004", "RFC005"]);
        assert_eq!(plan.moves.len(), 2);
        assert!(plan.moves.iter().all(|m| m.from.is_none()));
        assert_eq!(plan.scenario_counts()[&ScenarioKind::NewClean], 2);
    }

    #[test]
    fn update_existing_keeps_id_and_reports_removed_features() {
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(POOL, 1)]), unit(2, &[(POOL, 1)])],
            vec![rfc(10, "RFC001", "WIFI;1", &[(WIFI, 1)])],
            vec![(1, 10), (2, 10)],
            1,
        ))
        .unwrap();

        assert!(plan.creations.is_empty());
        assert!(plan.moves.is_empty());
        assert_eq!(plan.retargets.len(), 1);
        let retarget = &plan.retargets[0];
        assert_eq!(retarget.rfc_id, 10);
        assert_eq!(retarget.previous_signature.as_deref(), Some("WIFI;1"));
        assert_eq!(retarget.signature, "POOL;1");
        assert_eq!(retarget.removed_feature_ids, vec![WIFI]);
        assert!(plan.bundle_changed.contains(&ProductRef::Existing(10)));
        assert!(plan.deletions.is_empty());
    }

    #[test]
    fn matched_existing_moves_units_and_deletes_emptied_owner() {
        let plan = plan_pass(&snapshot(
            vec![unit(4, &[(POOL, 1)])],
            vec![
                rfc(30, "RFC003", "WIFI;1", &[(WIFI, 1)]),
                rfc(40, "RFC004", "POOL;1", &[(POOL, 1)]),
            ],
            vec![(4, 30), (5, 40)],
            4,
        ))
        .unwrap();

        assert_eq!(
            plan.moves,
            vec![AssignmentMove {
                room_unit_id: 4,
                from: Some(ProductRef::Existing(30)),
                to: ProductRef::Existing(40),
            }]
        );
        assert_eq!(plan.deletions, vec![30]);
        assert!(plan.grown.contains(&ProductRef::Existing(40)));
        assert!(!plan.membership_changed.contains(&ProductRef::Existing(30)));
        assert!(plan.feature_syncs.is_empty());
    }

    #[test]
    fn rfc_emptied_from_several_members_is_deleted_and_recorded() {
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(POOL, 1)]), unit(2, &[(POOL, 1)])],
            vec![
                rfc(10, "RFC001", "WIFI;1", &[(WIFI, 1)]),
                rfc(20, "RFC002", "POOL;1", &[(POOL, 1)]),
            ],
            vec![(1, 10), (2, 10), (3, 20)],
            2,
        ))
        .unwrap();

        assert_matches!(
            plan.decisions[0].scenario,
            Scenario::MatchedExisting { rfc: ProductRef::Existing(20) }
        );
        assert_eq!(plan.deletions, vec![10]);
        assert_eq!(plan.multi_member_deletions, vec![(10, 2)]);
    }

    #[test]
    fn single_member_deletion_is_not_recorded_as_drift() {
        let plan = plan_pass(&snapshot(
            vec![unit(4, &[(POOL, 1)])],
            vec![
                rfc(30, "RFC003", "WIFI;1", &[(WIFI, 1)]),
                rfc(40, "RFC004", "POOL;1", &[(POOL, 1)]),
            ],
            vec![(4, 30), (5, 40)],
            4,
        ))
        .unwrap();

        assert_eq!(plan.deletions, vec![30]);
        assert!(plan.multi_member_deletions.is_empty());
    }

    #[test]
    fn matched_existing_corrects_drifted_retail_feature_rows() {
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(WIFI, 2), (POOL, 1)])],
            vec![rfc(10, "RFC001", "WIFI;2,POOL;1", &[(WIFI, 1)])],
            vec![(1, 10)],
            1,
        ))
        .unwrap();

        assert_eq!(plan.feature_syncs.len(), 1);
        let sync = &plan.feature_syncs[0];
        assert_eq!(sync.updates, vec![FeatureQuantity::new(WIFI, 2)]);
        assert_eq!(sync.inserts, vec![FeatureQuantity::new(POOL, 1)]);
        assert!(sync.removed_feature_ids.is_empty());
    }

    #[test]
    fn two_member_rfc_split_in_two_is_retargeted_not_deleted() {
        // Units 1 and 2 both leave RFC 10 for different new signatures. The
        // first group splits, the second finds RFC 10 holding exactly unit 2.
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(POOL, 1)]), unit(2, &[(WIFI, 2)])],
            vec![rfc(10, "RFC001", "WIFI;1", &[(WIFI, 1)])],
            vec![(1, 10), (2, 10)],
            1,
        ))
        .unwrap();

        let kinds: Vec<_> = plan.decisions.iter().map(|d| d.scenario.kind()).collect();
        assert_eq!(
            kinds,
            vec![ScenarioKind::SplitOrMerge, ScenarioKind::UpdateExisting]
        );
        assert!(plan.deletions.is_empty());
        assert_eq!(plan.creations.len(), 1);
        assert_eq!(plan.retargets[0].rfc_id, 10);
        assert_eq!(plan.retargets[0].signature, "WIFI;2");
    }

    #[test]
    fn merge_deletes_every_single_member_owner() {
        let plan = plan_pass(&snapshot(
            vec![unit(1, &[(POOL, 1)]), unit(2, &[(POOL, 1)])],
            vec![
                rfc(10, "RFC001", "WIFI;1", &[(WIFI, 1)]),
                rfc(20, "RFC002", "WIFI;2", &[(WIFI, 2)]),
            ],
            vec![(1, 10), (2, 20)],
            2,
        ))
        .unwrap();

        assert_eq!(plan.decisions[0].scenario, Scenario::SplitOrMerge);
        assert_eq!(plan.creations[0].code, "RFC003");
        assert_eq!(plan.deletions, vec![10, 20]);
    }

    #[test]
    fn duplicate_active_signatures_resolve_to_lowest_id() {
        let plan = plan_pass(&snapshot(
            vec![unit(9, &[(WIFI, 1)])],
            vec![
                rfc(12, "RFC002", "WIFI;1", &[(WIFI, 1)]),
                rfc(11, "RFC001", "WIFI;1", &[(WIFI, 1)]),
            ],
            vec![(1, 11), (2, 12)],
            2,
        ))
        .unwrap();

        assert_eq!(plan.duplicate_signatures, vec![("WIFI;1".to_string(), 12)]);
        assert_eq!(plan.decisions[0].target, ProductRef::Existing(11));
    }

    #[test]
    fn invalid_quantity_aborts_planning() {
        let err = plan_pass(&snapshot(vec![unit(1, &[(WIFI, -1)])], vec![], vec![], 0))
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }
}
