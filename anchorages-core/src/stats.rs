use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Tally of records and anchorages dropped during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub invalid_coordinates: u64,
    pub invalid_speeds: u64,
    pub ordering_warnings: u64,
    pub duplicate_reports: u64,
    pub excluded_vessels: u64,
    pub short_tracks: u64,
    pub merge_conflicts: u64,
    pub discarded_anchorages: u64,
    /// Valid reports outside every configured region.
    pub filtered_reports: u64,
    /// Reports dropped to enforce the minimum report interval.
    pub thinned_reports: u64,
}

impl RunStats {
    pub fn record(&mut self, error: &Error) {
        match error {
            Error::InvalidCoordinate { .. } => self.invalid_coordinates += 1,
            Error::InvalidSpeed { .. } => self.invalid_speeds += 1,
            Error::DataOrderingWarning { .. } => self.ordering_warnings += 1,
            Error::ClusterMergeConflict { .. } => self.merge_conflicts += 1,
            Error::Configuration { .. } | Error::Storage { .. } => {}
        }
    }

    pub fn dropped_records(&self) -> u64 {
        self.invalid_coordinates
            + self.invalid_speeds
            + self.ordering_warnings
            + self.duplicate_reports
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, rhs: Self) {
        self.invalid_coordinates += rhs.invalid_coordinates;
        self.invalid_speeds += rhs.invalid_speeds;
        self.ordering_warnings += rhs.ordering_warnings;
        self.duplicate_reports += rhs.duplicate_reports;
        self.excluded_vessels += rhs.excluded_vessels;
        self.short_tracks += rhs.short_tracks;
        self.merge_conflicts += rhs.merge_conflicts;
        self.discarded_anchorages += rhs.discarded_anchorages;
        self.filtered_reports += rhs.filtered_reports;
        self.thinned_reports += rhs.thinned_reports;
    }
}
