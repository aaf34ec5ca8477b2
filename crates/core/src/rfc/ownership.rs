//! Per-pass RFC ownership index.
//!
//! Built once from persisted assignment rows at the start of a pass, then
//! mutated in memory as groups are reconciled so later groups see the moves
//! decided by earlier ones. Storage is never consulted mid-pass.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::types::DbId;

/// Reference to an RFC that either exists in storage or is created by the
/// current pass (identified by its position in the plan's creation list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProductRef {
    Existing(DbId),
    New(usize),
}

impl ProductRef {
    pub fn existing_id(self) -> Option<DbId> {
        match self {
            Self::Existing(id) => Some(id),
            Self::New(_) => None,
        }
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "#{id}"),
            Self::New(key) => write!(f, "new[{key}]"),
        }
    }
}

/// `ownerOf` plus the reverse membership view.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    owner_of: HashMap<DbId, ProductRef>,
    members: HashMap<ProductRef, BTreeSet<DbId>>,
}

impl OwnershipIndex {
    /// Build from `(room_unit_id, rfc_id)` rows of active RFCs.
    ///
    /// RFC assignment is exclusive; if storage has drifted and a unit appears
    /// twice, the lowest RFC id wins and the unit's other rows are returned
    /// so the caller can report them.
    pub fn from_assignments(rows: impl IntoIterator<Item = (DbId, DbId)>) -> (Self, Vec<(DbId, DbId)>) {
        let mut sorted: Vec<(DbId, DbId)> = rows.into_iter().collect();
        sorted.sort_unstable_by_key(|&(unit, rfc)| (unit, rfc));

        let mut index = Self::default();
        let mut conflicts = Vec::new();
        for (unit, rfc) in sorted {
            if index.owner_of.contains_key(&unit) {
                conflicts.push((unit, rfc));
                continue;
            }
            index.insert(unit, ProductRef::Existing(rfc));
        }
        (index, conflicts)
    }

    fn insert(&mut self, unit: DbId, product: ProductRef) {
        self.owner_of.insert(unit, product);
        self.members.entry(product).or_default().insert(unit);
    }

    pub fn owner_of(&self, unit: DbId) -> Option<ProductRef> {
        self.owner_of.get(&unit).copied()
    }

    /// Current members of a product; empty when it owns nothing.
    pub fn members(&self, product: ProductRef) -> BTreeSet<DbId> {
        self.members.get(&product).cloned().unwrap_or_default()
    }

    pub fn member_count(&self, product: ProductRef) -> usize {
        self.members.get(&product).map_or(0, BTreeSet::len)
    }

    /// Point `unit` at `product`, returning the previous owner (if any and
    /// different). Reassigning to the current owner is a no-op.
    pub fn assign(&mut self, unit: DbId, product: ProductRef) -> Option<ProductRef> {
        let previous = self.owner_of(unit);
        if previous == Some(product) {
            return None;
        }
        if let Some(prev) = previous {
            if let Some(set) = self.members.get_mut(&prev) {
                set.remove(&unit);
            }
        }
        self.insert(unit, product);
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_owner_and_membership_views() {
        let (index, conflicts) = OwnershipIndex::from_assignments([(1, 100), (2, 100), (3, 200)]);
        assert!(conflicts.is_empty());
        assert_eq!(index.owner_of(1), Some(ProductRef::Existing(100)));
        assert_eq!(index.owner_of(4), None);
        assert_eq!(index.member_count(ProductRef::Existing(100)), 2);
        assert_eq!(
            index.members(ProductRef::Existing(200)),
            BTreeSet::from([3])
        );
    }

    #[test]
    fn duplicate_rfc_assignment_keeps_lowest_rfc() {
        let (index, conflicts) = OwnershipIndex::from_assignments([(1, 300), (1, 100)]);
        assert_eq!(index.owner_of(1), Some(ProductRef::Existing(100)));
        assert_eq!(conflicts, vec![(1, 300)]);
    }

    #[test]
    fn assign_moves_unit_between_products() {
        let (mut index, _) = OwnershipIndex::from_assignments([(1, 100), (2, 100)]);
        let previous = index.assign(1, ProductRef::New(0));
        assert_eq!(previous, Some(ProductRef::Existing(100)));
        assert_eq!(index.member_count(ProductRef::Existing(100)), 1);
        assert_eq!(index.members(ProductRef::New(0)), BTreeSet::from([1]));
    }

    #[test]
    fn assign_to_current_owner_is_noop() {
        let (mut index, _) = OwnershipIndex::from_assignments([(1, 100)]);
        assert_eq!(index.assign(1, ProductRef::Existing(100)), None);
        assert_eq!(index.member_count(ProductRef::Existing(100)), 1);
    }
}
