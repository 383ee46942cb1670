use serde::{Deserialize, Serialize};

use crate::{Coordinates, METERS_PER_DEGREE};

/// Running mean and variance of a set of coordinates.
///
/// Points are added with Welford's update, two sets are combined with Chan's parallel formula.
/// Longitude is averaged linearly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinateMean {
    count: u64,
    mean_latitude: f64,
    mean_longitude: f64,
    m2_latitude: f64,
    m2_longitude: f64,
}

impl CoordinateMean {
    pub fn new(point: Coordinates) -> Self {
        let mut mean = Self::default();
        mean.push(point);
        mean
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Coordinates {
        Coordinates::new(self.mean_latitude, self.mean_longitude)
    }

    pub fn push(&mut self, point: Coordinates) {
        self.count += 1;
        let n = self.count as f64;

        let delta_lat = point.latitude - self.mean_latitude;
        self.mean_latitude += delta_lat / n;
        self.m2_latitude += delta_lat * (point.latitude - self.mean_latitude);

        let delta_lon = point.longitude - self.mean_longitude;
        self.mean_longitude += delta_lon / n;
        self.m2_longitude += delta_lon * (point.longitude - self.mean_longitude);
    }

    pub fn combine(&mut self, other: &CoordinateMean) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;

        let delta_lat = other.mean_latitude - self.mean_latitude;
        let delta_lon = other.mean_longitude - self.mean_longitude;

        self.mean_latitude += delta_lat * n_b / n;
        self.mean_longitude += delta_lon * n_b / n;
        self.m2_latitude += other.m2_latitude + delta_lat * delta_lat * n_a * n_b / n;
        self.m2_longitude += other.m2_longitude + delta_lon * delta_lon * n_a * n_b / n;
        self.count += other.count;
    }

    /// Population variance in squared degrees, `(latitude, longitude)`.
    pub fn variance(&self) -> (f64, f64) {
        if self.count == 0 {
            return (0.0, 0.0);
        }
        let n = self.count as f64;
        (self.m2_latitude / n, self.m2_longitude / n)
    }

    /// Root mean square distance of the points around the mean, in meters.
    pub fn rms_radius_meters(&self) -> f64 {
        let (var_lat, var_lon) = self.variance();
        let lon_scale = self.mean_latitude.to_radians().cos() * METERS_PER_DEGREE;
        let squared =
            var_lat * METERS_PER_DEGREE * METERS_PER_DEGREE + var_lon * lon_scale * lon_scale;
        squared.max(0.0).sqrt()
    }
}
