//! Grouping of changed room units by feature signature.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;
use crate::rfc::signature::{FeatureCatalog, FeatureQuantity};
use crate::rfc::snapshot::ChangedUnit;
use crate::types::DbId;

/// Changed room units that share one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureGroup {
    pub signature: String,
    /// Representative bundle (identical for every member by construction).
    pub features: Vec<FeatureQuantity>,
    pub unit_ids: BTreeSet<DbId>,
}

/// Signature computed for one changed unit, persisted back onto the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSignature {
    pub room_unit_id: DbId,
    pub signature: String,
}

/// Canonicalize every changed unit and bucket them by signature.
///
/// Groups come back in ascending signature order so a pass over the same
/// input always reconciles groups in the same sequence.
pub fn group_by_signature(
    catalog: &FeatureCatalog,
    units: &[ChangedUnit],
) -> Result<(Vec<SignatureGroup>, Vec<UnitSignature>), CoreError> {
    let mut groups: BTreeMap<String, SignatureGroup> = BTreeMap::new();
    let mut signatures = Vec::with_capacity(units.len());

    for unit in units {
        let canonical = catalog.canonicalize(&unit.features).map_err(|e| match e {
            CoreError::Validation(msg) => {
                CoreError::Validation(format!("room unit {}: {msg}", unit.id))
            }
            other => other,
        })?;

        signatures.push(UnitSignature {
            room_unit_id: unit.id,
            signature: canonical.signature.clone(),
        });

        groups
            .entry(canonical.signature.clone())
            .or_insert_with(|| SignatureGroup {
                signature: canonical.signature,
                features: canonical.features,
                unit_ids: BTreeSet::new(),
            })
            .unit_ids
            .insert(unit.id);
    }

    Ok((groups.into_values().collect(), signatures))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::rfc::signature::CatalogFeature;

    fn catalog() -> FeatureCatalog {
        FeatureCatalog::new(vec![
            CatalogFeature { id: 1, code: "WIFI".into() },
            CatalogFeature { id: 2, code: "POOL".into() },
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

    #[test]
    fn units_with_equal_bundles_share_a_group() {
        let units = [
            unit(1, &[(1, 1)]),
            unit(2, &[(2, 1), (1, 1)]),
            unit(3, &[(1, 1), (2, 1)]),
        ];
        let (groups, signatures) = group_by_signature(&catalog(), &units).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].signature, "WIFI;1");
        assert_eq!(groups[0].unit_ids, BTreeSet::from([1]));
        assert_eq!(groups[1].signature, "WIFI;1,POOL;1");
        assert_eq!(groups[1].unit_ids, BTreeSet::from([2, 3]));
        assert_eq!(signatures.len(), 3);
        assert_eq!(signatures[1].signature, "WIFI;1,POOL;1");
    }

    #[test]
    fn featureless_units_form_the_empty_signature_group() {
        let (groups, _) = group_by_signature(&catalog(), &[unit(7, &[])]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].signature, "");
        assert!(groups[0].features.is_empty());
    }

    #[test]
    fn validation_error_names_the_room_unit() {
        let err = group_by_signature(&catalog(), &[unit(9, &[(1, -2)])]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.starts_with("room unit 9"));
    }
}
