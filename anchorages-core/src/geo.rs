use geoutils::Location;
use serde::{Deserialize, Serialize};

use crate::{CoreResult, error::error::InvalidCoordinateSnafu};

/// Length of one degree of latitude, and of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude) {
            Ok(())
        } else {
            InvalidCoordinateSnafu {
                latitude: self.latitude,
                longitude: self.longitude,
            }
            .fail()
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        Location::new(self.latitude, self.longitude)
            .haversine_distance_to(&Location::new(other.latitude, other.longitude))
            .meters()
    }
}

/// Inclusive latitude/longitude rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, coordinates: Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&coordinates.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&coordinates.longitude)
    }

    pub fn is_valid(&self) -> bool {
        let corners = [
            Coordinates::new(self.min_latitude, self.min_longitude),
            Coordinates::new(self.max_latitude, self.max_longitude),
        ];
        corners.iter().all(|c| c.validate().is_ok())
            && self.min_latitude <= self.max_latitude
            && self.min_longitude <= self.max_longitude
    }
}
