//! Room Feature Combination (RFC) reconciliation.
//!
//! Pure pieces of the engine, leaf-first:
//!
//! - [`signature`] -- canonical feature signatures.
//! - [`code`] -- sequential catalog codes.
//! - [`group`] -- bucketing of changed room units by signature.
//! - [`ownership`] -- the per-pass `ownerOf` index.
//! - [`classify`] -- scenario classification of one group.
//! - [`plan`] -- sequential planning of a whole pass.
//! - [`mapping`] -- cluster/RFC mapping recomputation.
//! - [`space`] -- average space aggregation.

pub mod classify;
pub mod code;
pub mod group;
pub mod mapping;
pub mod ownership;
pub mod phase;
pub mod plan;
pub mod product;
pub mod signature;
pub mod snapshot;
pub mod space;

#[cfg(test)]
mod memory;

pub use classify::{classify, Scenario, ScenarioKind};
pub use code::{format_code, max_code_number, parse_code_number, CodeSequence};
pub use group::{group_by_signature, SignatureGroup, UnitSignature};
pub use mapping::{expected_mappings, plan_mapping_sync, MappingPair, TypedAssignment};
pub use ownership::{OwnershipIndex, ProductRef};
pub use phase::PassPhase;
pub use plan::{
    plan_pass, AssignmentMove, GroupDecision, NewRfc, PassPlan, RetailFeatureSync, RfcRetarget,
};
pub use product::{NewRfcDefaults, ProductStatus, ProductType};
pub use signature::{CanonicalFeatures, CatalogFeature, FeatureCatalog, FeatureQuantity};
pub use snapshot::{ChangedUnit, PassSnapshot, RfcRecord};
pub use space::{average_space, plan_space_updates};
