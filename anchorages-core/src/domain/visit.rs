use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnchorageId, VesselId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub vessel_id: VesselId,
    pub anchorage_id: AnchorageId,
    pub arrival: DateTime<Utc>,
    /// `None` while the vessel is still inside the anchorage at the end of the track.
    pub departure: Option<DateTime<Utc>>,
    #[serde(with = "duration_seconds")]
    pub duration: Duration,
}

impl VisitEvent {
    pub fn is_active(&self) -> bool {
        self.departure.is_none()
    }

    pub fn overlaps(&self, other: &VisitEvent) -> bool {
        let self_end = self.departure.unwrap_or(self.arrival + self.duration);
        let other_end = other.departure.unwrap_or(other.arrival + other.duration);
        self.arrival < other_end && other.arrival < self_end
    }
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::seconds)
    }
}
