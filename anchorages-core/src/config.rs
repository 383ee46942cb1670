use std::{collections::BTreeSet, time::Duration as StdDuration};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Coordinates, CoreResult, VesselId, error::error::ConfigurationSnafu};

/// Tunables shared by dwell extraction, clustering and visit assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Knots, a vessel at or below this speed starts a stop.
    pub stationary_speed_threshold: f64,
    /// Knots, a stopped vessel stays stopped until it exceeds this speed. Defaults to
    /// `stationary_speed_threshold`.
    #[serde(default)]
    pub stationary_end_speed_threshold: Option<f64>,
    #[serde(with = "humantime_serde")]
    pub min_stationary_duration: StdDuration,
    /// Meters.
    pub merge_radius: f64,
    pub min_points: u64,
    pub min_vessels: usize,
    /// Meters.
    pub anchorage_drift_threshold: f64,
    #[serde(with = "humantime_serde")]
    pub max_gap: StdDuration,
    pub reorder_window_size: usize,
    #[serde(default = "default_entry_distance")]
    pub anchorage_entry_distance: f64,
    #[serde(default = "default_exit_distance")]
    pub anchorage_exit_distance: f64,
    #[serde(default = "default_min_track_positions")]
    pub min_track_positions: usize,
    #[serde(default)]
    pub excluded_vessels: BTreeSet<VesselId>,
    #[serde(default = "default_num_shards")]
    pub num_shards: usize,
    /// Reports closer in time than this to the previously kept report are dropped.
    #[serde(default, with = "humantime_serde")]
    pub min_report_interval: Option<StdDuration>,
    /// Only reports inside one of these regions are used, all reports when empty.
    #[serde(default)]
    pub region_filters: Vec<BoundingBox>,
}

fn default_entry_distance() -> f64 {
    1000.0
}

fn default_exit_distance() -> f64 {
    1500.0
}

fn default_min_track_positions() -> usize {
    1
}

fn default_num_shards() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stationary_speed_threshold: 0.5,
            min_stationary_duration: StdDuration::from_secs(2 * 3600),
            merge_radius: 1000.0,
            min_points: 20,
            min_vessels: 20,
            anchorage_drift_threshold: 100.0,
            max_gap: StdDuration::from_secs(2 * 3600),
            reorder_window_size: 64,
            anchorage_entry_distance: default_entry_distance(),
            anchorage_exit_distance: default_exit_distance(),
            min_track_positions: default_min_track_positions(),
            excluded_vessels: BTreeSet::new(),
            num_shards: default_num_shards(),
            stationary_end_speed_threshold: None,
            min_report_interval: None,
            region_filters: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let reason = if !(self.merge_radius.is_finite() && self.merge_radius > 0.0) {
            Some(format!(
                "merge_radius must be positive, got '{}'",
                self.merge_radius
            ))
        } else if !(self.stationary_speed_threshold.is_finite()
            && self.stationary_speed_threshold >= 0.0)
        {
            Some(format!(
                "stationary_speed_threshold must be non-negative, got '{}'",
                self.stationary_speed_threshold
            ))
        } else if self
            .stationary_end_speed_threshold
            .is_some_and(|end| !(end.is_finite() && end >= self.stationary_speed_threshold))
        {
            Some(format!(
                "stationary_end_speed_threshold '{:?}' must not be below \
                 stationary_speed_threshold '{}'",
                self.stationary_end_speed_threshold, self.stationary_speed_threshold
            ))
        } else if self.min_stationary_duration.is_zero()
            || Duration::from_std(self.min_stationary_duration).is_err()
        {
            Some(format!(
                "min_stationary_duration must be positive and representable, got '{:?}'",
                self.min_stationary_duration
            ))
        } else if self.max_gap.is_zero() || Duration::from_std(self.max_gap).is_err() {
            Some(format!(
                "max_gap must be positive and representable, got '{:?}'",
                self.max_gap
            ))
        } else if self
            .min_report_interval
            .is_some_and(|interval| Duration::from_std(interval).is_err())
        {
            Some(format!(
                "min_report_interval must be representable, got '{:?}'",
                self.min_report_interval
            ))
        } else if self.min_points == 0 {
            Some("min_points must be at least 1".to_string())
        } else if self.min_vessels == 0 {
            Some("min_vessels must be at least 1".to_string())
        } else if !(self.anchorage_drift_threshold.is_finite()
            && self.anchorage_drift_threshold >= 0.0)
        {
            Some(format!(
                "anchorage_drift_threshold must be non-negative, got '{}'",
                self.anchorage_drift_threshold
            ))
        } else if self.reorder_window_size == 0 {
            Some("reorder_window_size must be at least 1".to_string())
        } else if !(self.anchorage_entry_distance.is_finite()
            && self.anchorage_entry_distance >= 0.0)
        {
            Some(format!(
                "anchorage_entry_distance must be non-negative, got '{}'",
                self.anchorage_entry_distance
            ))
        } else if !(self.anchorage_exit_distance.is_finite()
            && self.anchorage_exit_distance >= self.anchorage_entry_distance)
        {
            Some(format!(
                "anchorage_exit_distance '{}' must not be smaller than \
                 anchorage_entry_distance '{}'",
                self.anchorage_exit_distance, self.anchorage_entry_distance
            ))
        } else if self.num_shards == 0 {
            Some("num_shards must be at least 1".to_string())
        } else if let Some(region) = self.region_filters.iter().find(|r| !r.is_valid()) {
            Some(format!("invalid region filter '{region:?}'"))
        } else {
            None
        };

        match reason {
            Some(reason) => ConfigurationSnafu { reason }.fail(),
            None => Ok(()),
        }
    }

    pub fn min_stationary_duration(&self) -> Duration {
        Duration::from_std(self.min_stationary_duration).unwrap_or(Duration::MAX)
    }

    pub fn max_gap(&self) -> Duration {
        Duration::from_std(self.max_gap).unwrap_or(Duration::MAX)
    }

    /// Speed a stopped vessel must exceed to be moving again, at least the stopping speed.
    pub fn stationary_end_speed_threshold(&self) -> f64 {
        self.stationary_end_speed_threshold
            .unwrap_or(self.stationary_speed_threshold)
            .max(self.stationary_speed_threshold)
    }

    pub fn min_report_interval(&self) -> Option<Duration> {
        self.min_report_interval
            .and_then(|interval| Duration::from_std(interval).ok())
            .filter(|interval| *interval > Duration::zero())
    }

    /// Whether `coordinates` lie within one of the region filters, always true without filters.
    pub fn in_region(&self, coordinates: Coordinates) -> bool {
        self.region_filters.is_empty()
            || self
                .region_filters
                .iter()
                .any(|region| region.contains(coordinates))
    }

    pub fn is_excluded(&self, vessel_id: VesselId) -> bool {
        self.excluded_vessels.contains(&vessel_id)
    }
}
