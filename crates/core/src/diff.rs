//! Diff-based set reconciliation helpers.
//!
//! Derived tables (cross-type mappings, per-product feature rows) are never
//! appended to blindly. The caller computes the expected set, loads the
//! actual set, and writes only the difference:
//!
//! - delete `actual \ expected`
//! - insert `expected \ actual`
//! - for keyed values, update keys present on both sides with different values

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The status of an item in a diff comparison.
///
/// - `Added`     -- present only in the expected side.
/// - `Removed`   -- present only in the actual (persisted) side.
/// - `Changed`   -- present in both sides but with different values.
/// - `Unchanged` -- present in both sides with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes needed to turn the actual set into the expected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    pub to_insert: Vec<T>,
    pub to_delete: Vec<T>,
}

impl<T> SetDiff<T> {
    /// `true` when both sides already agree.
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// Compare an expected set against the persisted one.
///
/// Output order follows the `Ord` of `T`, so repeated runs over the same
/// input produce identical write batches.
pub fn diff_sets<T: Ord + Clone>(expected: &BTreeSet<T>, actual: &BTreeSet<T>) -> SetDiff<T> {
    SetDiff {
        to_insert: expected.difference(actual).cloned().collect(),
        to_delete: actual.difference(expected).cloned().collect(),
    }
}

/// One key of a keyed diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedChange<K, V> {
    pub key: K,
    pub status: DiffStatus,
    /// The expected value; `None` for [`DiffStatus::Removed`].
    pub value: Option<V>,
}

/// Compare two key/value maps and classify every key.
///
/// Unchanged keys are omitted; the result only lists work to do.
pub fn diff_keyed<K, V>(
    expected: &BTreeMap<K, V>,
    actual: &BTreeMap<K, V>,
) -> Vec<KeyedChange<K, V>>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    let mut changes = Vec::new();

    for (key, value) in expected {
        let status = match actual.get(key) {
            None => DiffStatus::Added,
            Some(current) if current != value => DiffStatus::Changed,
            Some(_) => DiffStatus::Unchanged,
        };
        if status != DiffStatus::Unchanged {
            changes.push(KeyedChange {
                key: key.clone(),
                status,
                value: Some(value.clone()),
            });
        }
    }

    for key in actual.keys() {
        if !expected.contains_key(key) {
            changes.push(KeyedChange {
                key: key.clone(),
                status: DiffStatus::Removed,
                value: None,
            });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_returns_correct_strings() {
        assert_eq!(DiffStatus::Added.as_str(), "added");
        assert_eq!(DiffStatus::Removed.as_str(), "removed");
        assert_eq!(DiffStatus::Changed.as_str(), "changed");
        assert_eq!(DiffStatus::Unchanged.as_str(), "unchanged");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", DiffStatus::Added), "added");
        assert_eq!(format!("{}", DiffStatus::Changed), "changed");
    }

    #[test]
    fn diff_sets_inserts_missing_and_deletes_extra() {
        let expected: BTreeSet<i64> = [1, 2, 3].into_iter().collect();
        let actual: BTreeSet<i64> = [2, 3, 4, 5].into_iter().collect();

        let diff = diff_sets(&expected, &actual);
        assert_eq!(diff.to_insert, vec![1]);
        assert_eq!(diff.to_delete, vec![4, 5]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn diff_sets_equal_sets_is_empty() {
        let set: BTreeSet<(i64, i64)> = [(1, 10), (2, 20)].into_iter().collect();
        assert!(diff_sets(&set, &set).is_empty());
    }

    #[test]
    fn diff_keyed_classifies_each_key() {
        let expected: BTreeMap<i64, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
        let actual: BTreeMap<i64, i32> = [(2, 2), (3, 1), (4, 1)].into_iter().collect();

        let changes = diff_keyed(&expected, &actual);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].key, 1);
        assert_eq!(changes[0].status, DiffStatus::Added);
        assert_eq!(changes[1].key, 3);
        assert_eq!(changes[1].status, DiffStatus::Changed);
        assert_eq!(changes[1].value, Some(3));
        assert_eq!(changes[2].key, 4);
        assert_eq!(changes[2].status, DiffStatus::Removed);
        assert_eq!(changes[2].value, None);
    }

    #[test]
    fn diff_keyed_identical_maps_yield_nothing() {
        let map: BTreeMap<i64, i32> = [(1, 2)].into_iter().collect();
        assert!(diff_keyed(&map, &map).is_empty());
    }
}
