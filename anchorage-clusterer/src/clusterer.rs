use std::collections::{BTreeMap, HashMap};

use anchorages_core::{
    Anchorage, AnchorageId, Coordinates, CoreResult, DwellPoint, Error, GeoGrid, PipelineConfig,
    RunStats, error::error::ClusterMergeConflictSnafu,
};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::compact;

/// Result of a clustering pass, ordered by anchorage id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    pub anchorages: Vec<Anchorage>,
    pub stats: RunStats,
}

#[derive(Debug)]
struct Candidate {
    id: AnchorageId,
    distance: f64,
}

/// The anchorages of an ongoing pass and the grid indexing their centroids.
///
/// An anchorage stays indexed at the position it had when it was last indexed until its centroid
/// drifts more than the drift threshold away, queries widen their radius accordingly.
#[derive(Debug)]
pub struct AnchorageSet {
    anchorages: BTreeMap<AnchorageId, Anchorage>,
    indexed_at: HashMap<AnchorageId, Coordinates>,
    grid: GeoGrid<AnchorageId>,
    merge_radius: f64,
    drift_threshold: f64,
    next_id: AnchorageId,
    stats: RunStats,
}

impl AnchorageSet {
    pub fn new(config: &PipelineConfig) -> Self {
        let merge_radius = config.merge_radius;
        let drift_threshold = config.anchorage_drift_threshold;
        Self {
            anchorages: BTreeMap::new(),
            indexed_at: HashMap::new(),
            grid: GeoGrid::for_radius(merge_radius + drift_threshold),
            merge_radius,
            drift_threshold,
            next_id: AnchorageId::new(1),
            stats: RunStats::default(),
        }
    }

    /// Seeds the set with anchorages from a previous run, keeping their ids.
    pub fn with_prior(config: &PipelineConfig, prior: Vec<Anchorage>) -> Self {
        let mut set = Self::new(config);
        for anchorage in prior {
            set.insert(anchorage);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.anchorages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchorages.is_empty()
    }

    pub fn get(&self, id: AnchorageId) -> Option<&Anchorage> {
        self.anchorages.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AnchorageId> + '_ {
        self.anchorages.keys().copied()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Ensures that newly created anchorages get an id of at least `id`.
    pub fn reserve_ids_below(&mut self, id: AnchorageId) {
        self.next_id = self.next_id.max(id);
    }

    pub fn add_stats(&mut self, stats: RunStats) {
        self.stats += stats;
    }

    /// Adds `anchorage` under its own id, replacing any anchorage with the same id.
    pub fn insert(&mut self, anchorage: Anchorage) {
        let id = anchorage.id;
        self.next_id = self.next_id.max(id.next());
        self.index(id, anchorage.coordinates());
        self.anchorages.insert(id, anchorage);
    }

    pub fn remove(&mut self, id: AnchorageId) -> Option<Anchorage> {
        self.grid.remove(&id);
        self.indexed_at.remove(&id);
        self.anchorages.remove(&id)
    }

    /// Adds the point to the nearest anchorage within the merge radius, or starts a new one.
    pub fn assign(&mut self, point: &DwellPoint) -> CoreResult<AnchorageId> {
        let coordinates = point.coordinates();
        coordinates.validate()?;

        let nearest = self
            .closest(coordinates, None)
            .and_then(|id| self.anchorages.get_mut(&id));

        match nearest {
            Some(anchorage) => {
                anchorage.absorb(point);
                let id = anchorage.id;
                let centroid = anchorage.coordinates();
                self.refresh_index(id, centroid);
                Ok(id)
            }
            None => {
                let id = self.next_id;
                self.insert(Anchorage::from_dwell_point(id, point));
                Ok(id)
            }
        }
    }

    /// Nearest anchorage within the merge radius of `coordinates`, ties go to the lowest id.
    pub fn closest(
        &mut self,
        coordinates: Coordinates,
        exclude: Option<AnchorageId>,
    ) -> Option<AnchorageId> {
        self.closest_where(coordinates, |id| Some(id) != exclude)
    }

    /// Like [AnchorageSet::closest], restricted to the anchorages accepted by `filter`.
    pub fn closest_where<F>(&mut self, coordinates: Coordinates, filter: F) -> Option<AnchorageId>
    where
        F: Fn(AnchorageId) -> bool,
    {
        let mut candidates = self
            .grid
            .neighbors(
                coordinates.latitude,
                coordinates.longitude,
                self.merge_radius + self.drift_threshold,
            )
            .filter(|id| filter(*id))
            .filter_map(|id| {
                self.anchorages.get(&id).map(|a| Candidate {
                    id,
                    distance: a.coordinates().distance_to(&coordinates),
                })
            })
            .filter(|c| c.distance <= self.merge_radius)
            .sorted_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.id.cmp(&b.id))
            });

        let best = candidates.next()?;
        if let Some(tied) = candidates.next().filter(|c| c.distance == best.distance) {
            let conflict = ClusterMergeConflictSnafu {
                kept: best.id,
                other: tied.id,
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            }
            .build();
            self.record(&conflict);
        }
        Some(best.id)
    }

    /// Folds the lower id of the pair into the higher one, returns the surviving id.
    pub fn merge(&mut self, a: AnchorageId, b: AnchorageId) -> Option<AnchorageId> {
        if a == b || !self.anchorages.contains_key(&a) || !self.anchorages.contains_key(&b) {
            return None;
        }
        let (absorbed, survivor) = if a < b { (a, b) } else { (b, a) };

        let absorbed = self.remove(absorbed)?;
        let target = self.anchorages.get_mut(&survivor)?;
        debug!(
            "merging anchorage '{}' ({} points) into '{}' ({} points)",
            absorbed.id, absorbed.point_count, target.id, target.point_count
        );
        target.merge(absorbed);
        let centroid = target.coordinates();
        self.index(survivor, centroid);

        Some(survivor)
    }

    /// Folds `other` into the anchorage `target`, keeping `target`'s id.
    pub fn fold_into(&mut self, target: AnchorageId, other: Anchorage) -> Option<AnchorageId> {
        let anchorage = self.anchorages.get_mut(&target)?;
        debug!(
            "folding {} points into anchorage '{}' ({} points)",
            other.point_count, target, anchorage.point_count
        );
        anchorage.merge(other);
        let centroid = anchorage.coordinates();
        self.refresh_index(target, centroid);
        Some(target)
    }

    pub fn discard_below(&mut self, min_points: u64, min_vessels: usize) {
        let discarded = self
            .anchorages
            .values()
            .filter(|a| a.point_count < min_points || a.num_vessels() < min_vessels)
            .map(|a| a.id)
            .collect::<Vec<_>>();

        for id in discarded {
            self.remove(id);
            self.stats.discarded_anchorages += 1;
        }
    }

    pub fn record(&mut self, error: &Error) {
        warn!("{error}");
        self.stats.record(error);
    }

    pub fn into_clustering(self) -> Clustering {
        Clustering {
            anchorages: self.anchorages.into_values().collect(),
            stats: self.stats,
        }
    }

    fn refresh_index(&mut self, id: AnchorageId, centroid: Coordinates) {
        let drifted = self
            .indexed_at
            .get(&id)
            .is_none_or(|at| at.distance_to(&centroid) > self.drift_threshold);
        if drifted {
            self.index(id, centroid);
        }
    }

    fn index(&mut self, id: AnchorageId, at: Coordinates) {
        self.grid.insert(at.latitude, at.longitude, id);
        self.indexed_at.insert(id, at);
    }
}

/// Greedy single pass clustering of dwell points into anchorages.
#[derive(Debug, Clone)]
pub struct AnchorageClusterer {
    config: PipelineConfig,
}

impl AnchorageClusterer {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cluster(&self, dwell_points: Vec<DwellPoint>, prior: Vec<Anchorage>) -> Clustering {
        let set = AnchorageSet::with_prior(&self.config, prior);
        let set = self.assign_and_compact(set, dwell_points);
        self.finish(set)
    }

    pub(crate) fn assign_and_compact(
        &self,
        mut set: AnchorageSet,
        dwell_points: Vec<DwellPoint>,
    ) -> AnchorageSet {
        let num_points = dwell_points.len();
        let sorted = dwell_points.into_iter().sorted_by(|a, b| {
            a.latitude
                .total_cmp(&b.latitude)
                .then(a.longitude.total_cmp(&b.longitude))
                .then(a.vessel_id.cmp(&b.vessel_id))
                .then(a.start.cmp(&b.start))
        });

        for point in sorted {
            if let Err(e) = set.assign(&point) {
                set.record(&e);
            }
        }

        let merges = compact(&mut set);
        debug!(
            "assigned {num_points} dwell points to {} anchorages after {merges} merges",
            set.len()
        );
        set
    }

    pub(crate) fn finish(&self, mut set: AnchorageSet) -> Clustering {
        set.discard_below(self.config.min_points, self.config.min_vessels);
        let clustering = set.into_clustering();
        info!(
            "clustering produced {} anchorages, discarded {}",
            clustering.anchorages.len(),
            clustering.stats.discarded_anchorages
        );
        clustering
    }
}
