use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Coordinates, CoordinateMean, DwellPoint, VesselId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorageId(u64);

impl AnchorageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for AnchorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A cluster of dwell points shared by several vessels.
///
/// `latitude`, `longitude` and `radius` are derived from `stats` and are kept in sync by every
/// mutating method, they exist as plain fields so that persisted snapshots are readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchorage {
    pub id: AnchorageId,
    pub latitude: f64,
    pub longitude: f64,
    /// RMS distance of the member centroids around the anchorage centroid, in meters.
    pub radius: f64,
    pub point_count: u64,
    pub vessels: BTreeSet<VesselId>,
    pub stats: CoordinateMean,
    pub dwell_hours: f64,
}

impl Anchorage {
    pub fn from_dwell_point(id: AnchorageId, point: &DwellPoint) -> Self {
        let stats = CoordinateMean::new(point.coordinates());
        let mut anchorage = Self {
            id,
            latitude: point.latitude,
            longitude: point.longitude,
            radius: 0.0,
            point_count: 0,
            vessels: BTreeSet::from([point.vessel_id]),
            stats,
            dwell_hours: point.hours(),
        };
        anchorage.refresh();
        anchorage
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn num_vessels(&self) -> usize {
        self.vessels.len()
    }

    pub fn absorb(&mut self, point: &DwellPoint) {
        self.stats.push(point.coordinates());
        self.vessels.insert(point.vessel_id);
        self.dwell_hours += point.hours();
        self.refresh();
    }

    /// Folds `other` into `self`, keeping `self.id`.
    pub fn merge(&mut self, other: Anchorage) {
        self.stats.combine(&other.stats);
        self.vessels.extend(other.vessels);
        self.dwell_hours += other.dwell_hours;
        self.refresh();
    }

    /// Re-derives the snapshot fields from the running statistics.
    pub fn refresh(&mut self) {
        let centroid = self.stats.mean();
        self.latitude = centroid.latitude;
        self.longitude = centroid.longitude;
        self.point_count = self.stats.count();
        self.radius = self.stats.rms_radius_meters();
    }
}
