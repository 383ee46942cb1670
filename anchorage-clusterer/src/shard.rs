use std::collections::BTreeSet;

use anchorages_core::{Anchorage, AnchorageId, Coordinates, DwellPoint, METERS_PER_DEGREE};
use itertools::Itertools;
use tracing::debug;

use crate::{AnchorageClusterer, AnchorageSet, Clustering, compact};

/// Shard cells span this many merge radii, so most clusters fall inside a single shard.
const SHARD_CELL_RADII: f64 = 64.0;

/// Dwell points and prior anchorages of one spatial shard.
#[derive(Debug, Clone, Default)]
pub struct Shard {
    pub dwell_points: Vec<DwellPoint>,
    pub prior: Vec<Anchorage>,
    next_id: Option<AnchorageId>,
}

impl Shard {
    pub fn new(dwell_points: Vec<DwellPoint>, prior: Vec<Anchorage>) -> Self {
        Self {
            dwell_points,
            prior,
            next_id: None,
        }
    }
}

pub fn prior_ids(prior: &[Anchorage]) -> BTreeSet<AnchorageId> {
    prior.iter().map(|a| a.id).collect()
}

impl AnchorageClusterer {
    /// Splits the input into `num_shards` spatially disjoint shards.
    pub fn partition(&self, dwell_points: Vec<DwellPoint>, prior: Vec<Anchorage>) -> Vec<Shard> {
        let num_shards = self.config().num_shards.max(1);
        let cell_degrees = self.config().merge_radius * SHARD_CELL_RADII / METERS_PER_DEGREE;
        let next_id = prior.iter().map(|a| a.id.next()).max();

        let mut shards = (0..num_shards)
            .map(|_| Shard {
                next_id,
                ..Default::default()
            })
            .collect::<Vec<_>>();

        for point in dwell_points {
            let shard = shard_of(point.coordinates(), cell_degrees, num_shards);
            shards[shard].dwell_points.push(point);
        }
        for anchorage in prior {
            let shard = shard_of(anchorage.coordinates(), cell_degrees, num_shards);
            shards[shard].prior.push(anchorage);
        }

        shards
    }

    /// Assignment and compaction of a single shard, without discarding small anchorages.
    pub fn cluster_shard(&self, shard: Shard) -> Clustering {
        let mut set = AnchorageSet::with_prior(self.config(), shard.prior);
        if let Some(next_id) = shard.next_id {
            set.reserve_ids_below(next_id);
        }
        self.assign_and_compact(set, shard.dwell_points).into_clustering()
    }

    /// Combines shard results into one set.
    ///
    /// Prior anchorages keep their ids. An anchorage started in one shard within the merge radius
    /// of a prior anchorage from another shard is folded into that prior anchorage, the remaining
    /// ones are renumbered in coordinate order. The combined set is then compacted across shard
    /// borders and filtered. The result does not depend on the order of `partials`.
    pub fn reconcile(
        &self,
        partials: Vec<Clustering>,
        prior_ids: &BTreeSet<AnchorageId>,
    ) -> Clustering {
        let mut set = AnchorageSet::new(self.config());
        let mut fresh = Vec::new();
        let mut kept = Vec::new();

        for partial in partials {
            set.add_stats(partial.stats);
            for anchorage in partial.anchorages {
                if prior_ids.contains(&anchorage.id) {
                    kept.push(anchorage);
                } else {
                    fresh.push(anchorage);
                }
            }
        }

        let mut next_id = prior_ids
            .last()
            .map(|id| id.next())
            .unwrap_or(AnchorageId::new(1));

        for anchorage in kept.into_iter().sorted_by_key(|a| a.id) {
            set.insert(anchorage);
        }

        let fresh = fresh.into_iter().sorted_by(|a, b| {
            a.latitude
                .total_cmp(&b.latitude)
                .then(a.longitude.total_cmp(&b.longitude))
                .then(a.point_count.cmp(&b.point_count))
                .then(a.vessels.cmp(&b.vessels))
        });
        for mut anchorage in fresh {
            let prior = set.closest_where(anchorage.coordinates(), |id| prior_ids.contains(&id));
            if let Some(prior) = prior {
                set.fold_into(prior, anchorage);
                continue;
            }
            anchorage.id = next_id;
            next_id = next_id.next();
            set.insert(anchorage);
        }

        let merges = compact(&mut set);
        debug!("reconciled {} anchorages after {merges} merges", set.len());

        self.finish(set)
    }
}

fn shard_of(coordinates: Coordinates, cell_degrees: f64, num_shards: usize) -> usize {
    let lat = ((coordinates.latitude + 90.0) / cell_degrees).floor() as i64;
    let lon = ((coordinates.longitude + 180.0) / cell_degrees).floor() as i64;
    (lat.wrapping_mul(31).wrapping_add(lon)).rem_euclid(num_shards as i64) as usize
}
