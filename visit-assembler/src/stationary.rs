use anchorages_core::{
    CoordinateMean, Coordinates, DwellPoint, PipelineConfig, PositionReport, VesselId,
};
use chrono::{DateTime, Duration, Utc};

/// The subset of [PipelineConfig] that drives stationary run detection and visit assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryParams {
    pub speed_threshold: f64,
    /// Never below `speed_threshold`.
    pub end_speed_threshold: f64,
    pub min_duration: Duration,
    pub max_gap: Duration,
    /// Meters a run may wander from its first report before it restarts.
    pub max_drift: f64,
}

impl From<&PipelineConfig> for StationaryParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            speed_threshold: config.stationary_speed_threshold,
            end_speed_threshold: config.stationary_end_speed_threshold(),
            min_duration: config.min_stationary_duration(),
            max_gap: config.max_gap(),
            max_drift: config.merge_radius,
        }
    }
}

impl StationaryParams {
    /// Whether a moving vessel reporting `report` has stopped.
    pub fn starts_stop(&self, report: &PositionReport) -> bool {
        report.is_stationary(self.speed_threshold)
    }

    /// Whether a stopped vessel reporting `report` is still stopped.
    pub fn keeps_stop(&self, report: &PositionReport) -> bool {
        report.is_stationary(self.end_speed_threshold)
    }
}

/// Consecutive stationary reports of one vessel.
#[derive(Debug, Clone)]
pub struct StationaryRun {
    vessel_id: VesselId,
    origin: Coordinates,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    centroid: CoordinateMean,
}

impl StationaryRun {
    pub fn start(report: &PositionReport) -> Self {
        let origin = report.coordinates();
        Self {
            vessel_id: report.vessel_id,
            origin,
            start: report.timestamp,
            end: report.timestamp,
            centroid: CoordinateMean::new(origin),
        }
    }

    pub fn extend(&mut self, report: &PositionReport) {
        self.end = report.timestamp;
        self.centroid.push(report.coordinates());
    }

    /// Whether `report` lies too far from the first report of the run to belong to it.
    pub fn drifted(&self, report: &PositionReport, max_drift: f64) -> bool {
        self.origin.distance_to(&report.coordinates()) > max_drift
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn num_reports(&self) -> u64 {
        self.centroid.count()
    }

    pub fn into_dwell_point(self) -> DwellPoint {
        let centroid = self.centroid.mean();
        DwellPoint {
            vessel_id: self.vessel_id,
            latitude: centroid.latitude,
            longitude: centroid.longitude,
            start: self.start,
            end: self.end,
        }
    }
}
