use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::*;

pub fn timestamp(hours: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(hours)
}

/// Moves `north_meters`/`east_meters` away from the given position on a flat approximation.
pub fn offset(latitude: f64, longitude: f64, north_meters: f64, east_meters: f64) -> (f64, f64) {
    let lat = latitude + north_meters / METERS_PER_DEGREE;
    let lon = longitude + east_meters / (METERS_PER_DEGREE * latitude.to_radians().cos());
    (lat, lon)
}

/// Builds one vessel's position track segment by segment.
pub struct TrackBuilder {
    vessel_id: VesselId,
    current: DateTime<Utc>,
    interval: Duration,
    position: (f64, f64),
    reports: Vec<PositionReport>,
}

impl TrackBuilder {
    pub fn new(vessel_id: i64, start: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            vessel_id: VesselId::new(vessel_id),
            current: start,
            interval: Duration::minutes(10),
            position: (latitude, longitude),
            reports: Vec::new(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Reports at zero speed from now until `duration` later, both ends included.
    pub fn stationary(mut self, duration: Duration) -> Self {
        let steps = duration.num_seconds() / self.interval.num_seconds();
        for _ in 0..=steps {
            self.push(0.0);
        }
        self
    }

    /// A single report at the current position.
    pub fn report(mut self, speed: f64) -> Self {
        self.push(speed);
        self
    }

    /// Sails in a straight line to the given position during `duration`, reporting `speed`.
    pub fn transit(
        mut self,
        latitude: f64,
        longitude: f64,
        duration: Duration,
        speed: f64,
    ) -> Self {
        let steps = (duration.num_seconds() / self.interval.num_seconds()).max(1);
        let (start_lat, start_lon) = self.position;
        for step in 1..=steps {
            let fraction = step as f64 / steps as f64;
            self.position = (
                start_lat + (latitude - start_lat) * fraction,
                start_lon + (longitude - start_lon) * fraction,
            );
            self.push(speed);
        }
        self
    }

    /// Teleports without reporting, as if the transponder was off.
    pub fn jump(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = (latitude, longitude);
        self
    }

    pub fn silence(mut self, duration: Duration) -> Self {
        self.current += duration;
        self
    }

    pub fn build(self) -> Vec<PositionReport> {
        self.reports
    }

    fn push(&mut self, speed: f64) {
        self.reports.push(PositionReport {
            vessel_id: self.vessel_id,
            timestamp: self.current,
            latitude: self.position.0,
            longitude: self.position.1,
            speed,
        });
        self.current += self.interval;
    }
}

/// `num_vessels` vessels each lying still for `duration` within `spread_meters` of the given
/// position, starting at staggered times.
pub fn anchored_fleet(
    first_vessel_id: i64,
    num_vessels: usize,
    latitude: f64,
    longitude: f64,
    spread_meters: f64,
    duration: Duration,
    seed: u64,
) -> Vec<PositionReport> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_vessels)
        .flat_map(|i| {
            let (lat, lon) = offset(
                latitude,
                longitude,
                rng.random_range(-spread_meters..=spread_meters),
                rng.random_range(-spread_meters..=spread_meters),
            );
            TrackBuilder::new(first_vessel_id + i as i64, timestamp(i as i64), lat, lon)
                .stationary(duration)
                .build()
        })
        .collect()
}

/// Dwell points from `num_vessels` distinct vessels scattered within `spread_meters` of the
/// given position.
pub fn dwell_cluster(
    first_vessel_id: i64,
    num_vessels: usize,
    latitude: f64,
    longitude: f64,
    spread_meters: f64,
    seed: u64,
) -> Vec<DwellPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_vessels)
        .map(|i| {
            let (lat, lon) = offset(
                latitude,
                longitude,
                rng.random_range(-spread_meters..=spread_meters),
                rng.random_range(-spread_meters..=spread_meters),
            );
            let start = timestamp(i as i64);
            DwellPoint {
                vessel_id: VesselId::new(first_vessel_id + i as i64),
                latitude: lat,
                longitude: lon,
                start,
                end: start + Duration::hours(rng.random_range(2..12)),
            }
        })
        .collect()
}
