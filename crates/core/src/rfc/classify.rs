//! Scenario classifier.
//!
//! Decides, for one signature group, how the catalog has to change:
//!
//! 1. `MatchedExisting` -- an active RFC already carries the signature.
//! 2. `NewClean` -- none of the group's units is owned by an RFC.
//! 3. `UpdateExisting` -- exactly one previous owner whose whole membership
//!    is the group; the RFC is retargeted in place and keeps its id.
//! 4. `SplitOrMerge` -- anything else; a new RFC is created and units move
//!    onto it from their previous owners.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::rfc::group::SignatureGroup;
use crate::rfc::ownership::{OwnershipIndex, ProductRef};
use crate::types::DbId;

/// Reconciliation scenario for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    MatchedExisting { rfc: ProductRef },
    NewClean,
    UpdateExisting { rfc_id: DbId },
    SplitOrMerge,
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Self::MatchedExisting { .. } => ScenarioKind::MatchedExisting,
            Self::NewClean => ScenarioKind::NewClean,
            Self::UpdateExisting { .. } => ScenarioKind::UpdateExisting,
            Self::SplitOrMerge => ScenarioKind::SplitOrMerge,
        }
    }
}

/// Payload-free scenario tag, used for reporting and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioKind {
    MatchedExisting,
    NewClean,
    UpdateExisting,
    SplitOrMerge,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchedExisting => "MATCHED_EXISTING",
            Self::NewClean => "NEW_CLEAN",
            Self::UpdateExisting => "UPDATE_EXISTING",
            Self::SplitOrMerge => "SPLIT_OR_MERGE",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one group.
///
/// `by_signature` maps the signature of every active RFC (as of this point
/// in the pass) to that RFC. `ownership` must already reflect the moves of
/// earlier groups in the same pass.
pub fn classify(
    group: &SignatureGroup,
    by_signature: &HashMap<String, ProductRef>,
    ownership: &OwnershipIndex,
) -> Scenario {
    if let Some(&rfc) = by_signature.get(&group.signature) {
        return Scenario::MatchedExisting { rfc };
    }

    let candidates: BTreeSet<ProductRef> = group
        .unit_ids
        .iter()
        .filter_map(|&unit| ownership.owner_of(unit))
        .collect();

    if candidates.is_empty() {
        return Scenario::NewClean;
    }

    if candidates.len() == 1 {
        if let Some(&ProductRef::Existing(rfc_id)) = candidates.first() {
            if ownership.members(ProductRef::Existing(rfc_id)) == group.unit_ids {
                return Scenario::UpdateExisting { rfc_id };
            }
        }
    }

    Scenario::SplitOrMerge
}
