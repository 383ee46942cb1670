use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinates, VesselId};

/// Centroid of one vessel's uninterrupted stationary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellPoint {
    pub vessel_id: VesselId,
    pub latitude: f64,
    pub longitude: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DwellPoint {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }
}
