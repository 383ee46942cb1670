use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinates, CoreResult, error::error::InvalidSpeedSnafu};

/// Highest speed an AIS transponder can report, in knots.
pub const MAX_REPORTABLE_SPEED: f64 = 102.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VesselId(i64);

impl VesselId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub vessel_id: VesselId,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed over ground in knots.
    pub speed: f64,
}

impl PositionReport {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.coordinates().validate()?;

        if !(0.0..=MAX_REPORTABLE_SPEED).contains(&self.speed) {
            return InvalidSpeedSnafu { speed: self.speed }.fail();
        }

        Ok(())
    }

    pub fn is_stationary(&self, speed_threshold: f64) -> bool {
        self.speed <= speed_threshold
    }
}
