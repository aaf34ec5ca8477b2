//! Average physical size of an RFC's member room units.

use std::collections::HashMap;

use crate::types::DbId;

/// Rounded mean of the positive spaces; 0 when none is positive.
pub fn average_space(spaces: &[f64]) -> i32 {
    let positive: Vec<f64> = spaces.iter().copied().filter(|s| *s > 0.0).collect();
    if positive.is_empty() {
        return 0;
    }
    let mean = positive.iter().sum::<f64>() / positive.len() as f64;
    mean.round() as i32
}

/// New `average_space` values for `product_ids`, skipping products whose
/// stored value is already correct.
///
/// `member_spaces` holds the spaces of each product's current members;
/// products missing from it have no members and average to 0.
pub fn plan_space_updates(
    product_ids: &[DbId],
    member_spaces: &HashMap<DbId, Vec<f64>>,
    current: &HashMap<DbId, i32>,
) -> Vec<(DbId, i32)> {
    product_ids
        .iter()
        .filter_map(|id| {
            let value = member_spaces
                .get(id)
                .map_or(0, |spaces| average_space(spaces));
            (current.get(id) != Some(&value)).then_some((*id, value))
        })
        .collect()
}
