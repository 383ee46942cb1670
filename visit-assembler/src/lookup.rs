use std::collections::BTreeMap;

use anchorages_core::{Anchorage, AnchorageId, Coordinates, GeoGrid, PipelineConfig};

/// Read-only snapshot of the anchorages of a completed clustering pass.
#[derive(Debug)]
pub struct AnchorageIndex {
    anchorages: BTreeMap<AnchorageId, Anchorage>,
    grid: GeoGrid<AnchorageId>,
    entry_distance: f64,
    exit_distance: f64,
    max_radius: f64,
}

impl AnchorageIndex {
    pub fn new(anchorages: Vec<Anchorage>, config: &PipelineConfig) -> Self {
        let max_radius = anchorages.iter().map(|a| a.radius).fold(0.0, f64::max);
        let exit_distance = config.anchorage_exit_distance;
        let mut grid = GeoGrid::for_radius((max_radius + exit_distance).max(1.0));

        for anchorage in &anchorages {
            grid.insert(anchorage.latitude, anchorage.longitude, anchorage.id);
        }

        Self {
            anchorages: anchorages.into_iter().map(|a| (a.id, a)).collect(),
            grid,
            entry_distance: config.anchorage_entry_distance,
            exit_distance,
            max_radius,
        }
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

    /// The nearest anchorage whose entry extent contains `position`, ties go to the lowest id.
    pub fn entered(&self, position: Coordinates) -> Option<AnchorageId> {
        self.grid
            .neighbors(
                position.latitude,
                position.longitude,
                self.max_radius + self.entry_distance,
            )
            .filter_map(|id| self.anchorages.get(&id))
            .map(|a| (a.coordinates().distance_to(&position), a))
            .filter(|(distance, a)| *distance <= a.radius + self.entry_distance)
            .min_by(|(d1, a1), (d2, a2)| d1.total_cmp(d2).then(a1.id.cmp(&a2.id)))
            .map(|(_, a)| a.id)
    }

    /// Whether `position` is still within the exit extent of anchorage `id`.
    pub fn within_exit_extent(&self, id: AnchorageId, position: Coordinates) -> bool {
        self.anchorages
            .get(&id)
            .is_some_and(|a| {
                a.coordinates().distance_to(&position) <= a.radius + self.exit_distance
            })
    }
}
