use std::collections::BTreeSet;

use anchorages_core::AnchorageId;

use crate::AnchorageSet;

/// Merges anchorages whose centroids lie within the merge radius of each other until no such
/// pair remains, returns the number of merges.
///
/// Every surviving anchorage is re-examined after it absorbs a neighbour, as its centroid moves.
pub fn compact(set: &mut AnchorageSet) -> usize {
    let mut worklist: BTreeSet<AnchorageId> = set.ids().collect();
    let mut merges = 0;

    while let Some(id) = worklist.pop_first() {
        let Some(centroid) = set.get(id).map(|a| a.coordinates()) else {
            continue;
        };
        let Some(neighbour) = set.closest(centroid, Some(id)) else {
            continue;
        };
        if let Some(survivor) = set.merge(id, neighbour) {
            merges += 1;
            worklist.insert(survivor);
        }
    }

    merges
}
