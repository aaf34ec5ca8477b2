//! In-memory inventory used to exercise whole passes without a database.
//!
//! Applies a [`PassPlan`] with the same step order as the Postgres pipeline
//! and counts every row it writes, so pass-level properties (idempotence,
//! no orphans, mapping minimality) can be checked directly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::CoreError;
use crate::rfc::code::max_code_number;
use crate::rfc::mapping::{plan_mapping_sync, MappingPair, TypedAssignment};
use crate::rfc::ownership::ProductRef;
use crate::rfc::plan::{plan_pass, PassPlan};
use crate::rfc::product::ProductType;
use crate::rfc::signature::{FeatureCatalog, FeatureQuantity};
use crate::rfc::snapshot::{ChangedUnit, PassSnapshot, RfcRecord};
use crate::rfc::space::plan_space_updates;
use crate::types::DbId;

#[derive(Debug, Clone)]
pub(crate) struct UnitRow {
    pub features: Vec<FeatureQuantity>,
    pub space: f64,
    pub changed: bool,
    pub signature: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProductRow {
    pub code: String,
    pub product_type: ProductType,
    pub signature: Option<String>,
    pub retail: BTreeMap<DbId, i32>,
    pub average_space: i32,
    pub deleted: bool,
}

#[derive(Debug)]
pub(crate) struct InventoryState {
    catalog: FeatureCatalog,
    pub units: BTreeMap<DbId, UnitRow>,
    pub products: BTreeMap<DbId, ProductRow>,
    pub assignments: BTreeSet<(DbId, DbId)>,
    pub mappings: BTreeSet<MappingPair>,
    next_id: DbId,
    pub writes: usize,
}

impl InventoryState {
    pub fn new(catalog: FeatureCatalog) -> Self {
        Self {
            catalog,
            units: BTreeMap::new(),
            products: BTreeMap::new(),
            assignments: BTreeSet::new(),
            mappings: BTreeSet::new(),
            next_id: 1000,
            writes: 0,
        }
    }

    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    // -- Fixture builders ---------------------------------------------------

    /// Add a room unit as the property-management sync would: dirty.
    pub fn add_unit(&mut self, id: DbId, features: &[(DbId, i32)], space: f64) {
        self.units.insert(
            id,
            UnitRow {
                features: to_bundle(features),
                space,
                changed: true,
                signature: None,
            },
        );
    }

    pub fn set_features(&mut self, id: DbId, features: &[(DbId, i32)]) {
        let unit = self.units.get_mut(&id).expect("unit exists");
        unit.features = to_bundle(features);
        unit.changed = true;
    }

    /// Insert an already reconciled RFC owning `units`.
    pub fn add_rfc(&mut self, code: &str, features: &[(DbId, i32)], units: &[DbId]) -> DbId {
        let signature = self
            .catalog
            .signature(&to_bundle(features))
            .expect("valid fixture bundle");
        let id = self.add_product(ProductType::Rfc, code, Some(signature.clone()));
        let product = self.products.get_mut(&id).expect("just inserted");
        product.retail = features.iter().copied().collect();
        for &unit in units {
            self.assignments.insert((unit, id));
            let row = self.units.get_mut(&unit).expect("unit exists");
            row.changed = false;
            row.signature = Some(signature.clone());
        }
        id
    }

    pub fn add_product(&mut self, product_type: ProductType, code: &str, signature: Option<String>) -> DbId {
        let id = self.allocate_id();
        self.products.insert(
            id,
            ProductRow {
                code: code.to_string(),
                product_type,
                signature,
                retail: BTreeMap::new(),
                average_space: 0,
                deleted: false,
            },
        );
        id
    }

    // -- Queries ------------------------------------------------------------

    pub fn members(&self, product_id: DbId) -> BTreeSet<DbId> {
        self.assignments
            .iter()
            .filter(|(_, p)| *p == product_id)
            .map(|(u, _)| *u)
            .collect()
    }

    pub fn active_rfcs(&self) -> Vec<(DbId, &ProductRow)> {
        self.products
            .iter()
            .filter(|(_, p)| !p.deleted && p.product_type == ProductType::Rfc)
            .map(|(id, p)| (*id, p))
            .collect()
    }

    pub fn rfc_owning(&self, unit: DbId) -> Option<DbId> {
        self.assignments
            .iter()
            .filter(|(u, _)| *u == unit)
            .map(|(_, p)| *p)
            .find(|p| {
                self.products
                    .get(p)
                    .is_some_and(|row| !row.deleted && row.product_type == ProductType::Rfc)
            })
    }

    fn typed_assignments(&self) -> Vec<TypedAssignment> {
        self.assignments
            .iter()
            .filter_map(|&(unit, product)| {
                let row = self.products.get(&product)?;
                (!row.deleted).then_some(TypedAssignment {
                    room_unit_id: unit,
                    room_product_id: product,
                    product_type: row.product_type,
                })
            })
            .collect()
    }

    // -- Pass ---------------------------------------------------------------

    pub fn snapshot(&self) -> PassSnapshot {
        let changed_units = self
            .units
            .iter()
            .filter(|(_, u)| u.changed)
            .map(|(id, u)| ChangedUnit {
                id: *id,
                features: u.features.clone(),
            })
            .collect();

        let rfcs = self
            .active_rfcs()
            .into_iter()
            .map(|(id, p)| RfcRecord {
                id,
                code: p.code.clone(),
                feature_signature: p.signature.clone(),
                retail_features: p
                    .retail
                    .iter()
                    .map(|(&f, &q)| FeatureQuantity::new(f, q))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let active: BTreeSet<DbId> = rfcs.iter().map(|r| r.id).collect();
        let rfc_assignments = self
            .assignments
            .iter()
            .filter(|(_, p)| active.contains(p))
            .copied()
            .collect();

        let max_code_number = max_code_number(
            ProductType::Rfc,
            self.products
                .values()
                .filter(|p| p.product_type == ProductType::Rfc)
                .map(|p| p.code.as_str()),
        );

        PassSnapshot {
            hotel_id: 1,
            catalog: self.catalog.clone(),
            changed_units,
            rfcs,
            rfc_assignments,
            max_code_number,
        }
    }

    /// Plan and apply one full pass, returning the plan.
    pub fn run_pass(&mut self) -> Result<PassPlan, CoreError> {
        let plan = plan_pass(&self.snapshot())?;
        let created = self.apply(&plan);

        let resolve = |r: ProductRef| match r {
            ProductRef::Existing(id) => id,
            ProductRef::New(key) => created[key],
        };

        // Mapping
        let diff = plan_mapping_sync(&self.typed_assignments(), self.mappings.iter().copied());
        for pair in &diff.to_delete {
            self.mappings.remove(pair);
        }
        self.mappings.extend(diff.to_insert.iter().copied());
        self.writes += diff.to_insert.len() + diff.to_delete.len();

        // Aggregating
        let targets: Vec<DbId> = plan.membership_changed.iter().map(|r| resolve(*r)).collect();
        let mut member_spaces: HashMap<DbId, Vec<f64>> = HashMap::new();
        for &(unit, product) in &self.assignments {
            if targets.contains(&product) {
                member_spaces
                    .entry(product)
                    .or_default()
                    .push(self.units[&unit].space);
            }
        }
        let current = targets
            .iter()
            .map(|id| (*id, self.products[id].average_space))
            .collect();
        for (id, value) in plan_space_updates(&targets, &member_spaces, &current) {
            self.products.get_mut(&id).expect("target exists").average_space = value;
            self.writes += 1;
        }

        Ok(plan)
    }

    /// Apply the catalog writes of a plan; returns ids of created RFCs by key.
    fn apply(&mut self, plan: &PassPlan) -> Vec<DbId> {
        let mut created = Vec::with_capacity(plan.creations.len());
        for creation in &plan.creations {
            let id = self.add_product(ProductType::Rfc, &creation.code, Some(creation.signature.clone()));
            self.products.get_mut(&id).expect("just inserted").retail = creation
                .features
                .iter()
                .map(|f| (f.feature_id, f.quantity))
                .collect();
            created.push(id);
            self.writes += 1;
        }
        let resolve = |r: ProductRef| match r {
            ProductRef::Existing(id) => id,
            ProductRef::New(key) => created[key],
        };

        for retarget in &plan.retargets {
            let row = self.products.get_mut(&retarget.rfc_id).expect("retarget exists");
            row.signature = Some(retarget.signature.clone());
            row.retail = retarget
                .features
                .iter()
                .map(|f| (f.feature_id, f.quantity))
                .collect();
            self.writes += 1;
        }

        for sync in &plan.feature_syncs {
            let row = self.products.get_mut(&sync.rfc_id).expect("sync exists");
            for f in sync.inserts.iter().chain(&sync.updates) {
                row.retail.insert(f.feature_id, f.quantity);
            }
            for id in &sync.removed_feature_ids {
                row.retail.remove(id);
            }
            self.writes += sync.inserts.len() + sync.updates.len() + sync.removed_feature_ids.len();
        }

        for mv in &plan.moves {
            if let Some(from) = mv.from {
                self.assignments.remove(&(mv.room_unit_id, resolve(from)));
            }
            self.assignments.insert((mv.room_unit_id, resolve(mv.to)));
            self.writes += 1;
        }

        for id in &plan.deletions {
            self.assignments.retain(|(_, p)| p != id);
            self.mappings
                .retain(|m| m.cluster_product_id != *id && m.rfc_id != *id);
            let row = self.products.get_mut(id).expect("deletion exists");
            row.deleted = true;
            self.writes += 1;
        }

        for sig in &plan.unit_signatures {
            let unit = self.units.get_mut(&sig.room_unit_id).expect("unit exists");
            unit.signature = Some(sig.signature.clone());
            unit.changed = false;
            self.writes += 1;
        }

        created
    }
}

fn to_bundle(features: &[(DbId, i32)]) -> Vec<FeatureQuantity> {
    features
        .iter()
        .map(|&(f, q)| FeatureQuantity::new(f, q))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::classify::ScenarioKind;
    use crate::rfc::mapping::expected_mappings;
    use crate::rfc::signature::CatalogFeature;

    const WIFI: DbId = 1;
    const POOL: DbId = 2;
    const BALCONY: DbId = 3;

    fn state() -> InventoryState {
        InventoryState::new(FeatureCatalog::new(vec![
            CatalogFeature { id: WIFI, code: "WIFI".into() },
            CatalogFeature { id: POOL, code: "POOL".into() },
            CatalogFeature { id: BALCONY, code: "BALCONY".into() },
        ]))
    }

    fn assert_catalog_invariants(state: &InventoryState) {
        let rfcs = state.active_rfcs();

        let mut signatures = BTreeSet::new();
        for (id, row) in &rfcs {
            let signature = row.signature.clone().unwrap_or_default();
            assert!(signatures.insert(signature), "RFC {id} duplicates a signature");
            assert!(!state.members(*id).is_empty(), "RFC {id} has no members");
        }

        let expected = expected_mappings(&state.typed_assignments());
        assert_eq!(state.mappings, expected, "mapping table drifted");
    }

    #[test]
    fn second_pass_without_changes_writes_nothing() {
        let mut state = state();
        state.add_unit(1, &[(WIFI, 1)], 20.0);
        state.add_unit(2, &[(WIFI, 1), (POOL, 1)], 25.0);
        let cluster = state.add_product(ProductType::Mrfc, "MRFC001", None);
        state.assignments.insert((1, cluster));

        state.run_pass().unwrap();
        assert!(state.writes > 0);
        assert_catalog_invariants(&state);

        state.writes = 0;
        let plan = state.run_pass().unwrap();
        assert!(plan.decisions.is_empty());
        assert_eq!(state.writes, 0);
    }

    #[test]
    fn average_space_of_new_rfc() {
        let mut state = state();
        state.add_unit(1, &[(WIFI, 1)], 20.0);
        state.add_unit(2, &[(WIFI, 1)], 25.0);
        state.add_unit(3, &[(WIFI, 1)], 30.0);

        state.run_pass().unwrap();
        let (_, rfc) = state.active_rfcs()[0];
        assert_eq!(rfc.average_space, 25);
    }

    #[test]
    fn soft_deleted_codes_still_advance_the_sequence() {
        let mut state = state();
        state.add_unit(1, &[(WIFI, 1)], 0.0);
        state.add_unit(2, &[(POOL, 1)], 0.0);
        state.add_rfc("RFC001", &[(WIFI, 1)], &[1]);
        state.add_rfc("RFC003", &[(POOL, 1)], &[2]);
        let deleted = state.add_product(ProductType::Rfc, "RFC002", Some("BALCONY;1".into()));
        state.products.get_mut(&deleted).unwrap().deleted = true;

        state.add_unit(3, &[(BALCONY, 2)], 0.0);
        let plan = state.run_pass().unwrap();

        assert_eq!(plan.creations.len(), 1);
        assert_eq!(plan.creations[0].code, "RFC004");
    }

    #[test]
    fn pure_signature_change_keeps_rfc_identity() {
        let mut state = state();
        state.add_unit(1, &[(WIFI, 1)], 20.0);
        state.add_unit(2, &[(WIFI, 1)], 20.0);
        let r1 = state.add_rfc("RFC001", &[(WIFI, 1)], &[1, 2]);

        state.set_features(1, &[(WIFI, 1), (POOL, 1)]);
        state.set_features(2, &[(WIFI, 1), (POOL, 1)]);
        let plan = state.run_pass().unwrap();

        assert_eq!(plan.decisions[0].scenario.kind(), ScenarioKind::UpdateExisting);
        let row = &state.products[&r1];
        assert!(!row.deleted);
        assert_eq!(row.code, "RFC001");
        assert_eq!(row.signature.as_deref(), Some("WIFI;1,POOL;1"));
        assert_eq!(state.members(r1), BTreeSet::from([1, 2]));
        assert_eq!(state.active_rfcs().len(), 1);
        assert_catalog_invariants(&state);
    }

    #[test]
    fn one_unit_leaving_a_larger_rfc_splits_off() {
        let mut state = state();
        for id in [1, 2, 3] {
            state.add_unit(id, &[(WIFI, 1)], 20.0);
        }
        let r1 = state.add_rfc("RFC001", &[(WIFI, 1)], &[1, 2, 3]);

        state.set_features(1, &[(POOL, 1)]);
        let plan = state.run_pass().unwrap();

        assert_eq!(plan.decisions[0].scenario.kind(), ScenarioKind::SplitOrMerge);
        let r2 = state.rfc_owning(1).unwrap();
        assert_ne!(r2, r1);
        assert_eq!(state.products[&r2].signature.as_deref(), Some("POOL;1"));
        assert_eq!(state.products[&r2].code, "RFC002");
        assert_eq!(state.members(r2), BTreeSet::from([1]));
        assert_eq!(state.members(r1), BTreeSet::from([2, 3]));
        assert!(!state.products[&r1].deleted);
        assert_catalog_invariants(&state);
    }

    #[test]
    fn single_unit_rfc_is_deleted_when_its_unit_joins_another() {
        let mut state = state();
        state.add_unit(4, &[(WIFI, 1)], 20.0);
        state.add_unit(5, &[(POOL, 1)], 30.0);
        let r3 = state.add_rfc("RFC003", &[(WIFI, 1)], &[4]);
        let r4 = state.add_rfc("RFC004", &[(POOL, 1)], &[5]);
        let cluster = state.add_product(ProductType::Erfc, "ERFC001", None);
        state.assignments.insert((4, cluster));
        state.mappings.insert(MappingPair {
            cluster_product_id: cluster,
            rfc_id: r3,
        });

        state.set_features(4, &[(POOL, 1)]);
        let plan = state.run_pass().unwrap();

        assert_eq!(plan.deletions, vec![r3]);
        assert!(state.products[&r3].deleted);
        assert!(state.members(r3).is_empty());
        assert_eq!(state.members(r4), BTreeSet::from([4, 5]));
        assert_eq!(state.products[&r4].average_space, 25);
        assert_eq!(
            state.mappings,
            BTreeSet::from([MappingPair {
                cluster_product_id: cluster,
                rfc_id: r4,
            }])
        );
        assert_catalog_invariants(&state);
    }

    #[test]
    fn reshuffled_hotel_converges_to_a_consistent_catalog() {
        let mut state = state();
        for id in 1..=6 {
            state.add_unit(id, &[(WIFI, 1)], 10.0 + id as f64);
        }
        let cluster = state.add_product(ProductType::Mrfc, "MRFC001", None);
        for id in 1..=6 {
            state.assignments.insert((id, cluster));
        }
        state.run_pass().unwrap();
        assert_catalog_invariants(&state);

        state.set_features(1, &[(POOL, 1)]);
        state.set_features(2, &[(POOL, 1)]);
        state.set_features(3, &[(BALCONY, 1)]);
        state.set_features(4, &[(WIFI, 2)]);
        state.run_pass().unwrap();
        assert_catalog_invariants(&state);

        state.set_features(1, &[(WIFI, 1)]);
        state.set_features(3, &[(WIFI, 1)]);
        state.set_features(4, &[(WIFI, 1)]);
        state.run_pass().unwrap();
        assert_catalog_invariants(&state);

        let codes: Vec<_> = state.products.values().map(|p| p.code.clone()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "codes must never be reused");
    }
}
