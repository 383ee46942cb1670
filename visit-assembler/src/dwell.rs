use anchorages_core::{DwellPoint, PositionReport};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{StationaryParams, StationaryRun};

/// Turns a time ordered track into the dwell points of its long enough stationary runs.
#[derive(Debug)]
pub struct DwellExtractor {
    params: StationaryParams,
    run: Option<StationaryRun>,
    last_timestamp: Option<DateTime<Utc>>,
    dwell_points: Vec<DwellPoint>,
}

impl DwellExtractor {
    pub fn new(params: StationaryParams) -> Self {
        Self {
            params,
            run: None,
            last_timestamp: None,
            dwell_points: Vec::new(),
        }
    }

    pub fn advance(&mut self, report: &PositionReport) {
        if self
            .last_timestamp
            .is_some_and(|last| report.timestamp - last > self.params.max_gap)
        {
            self.close_run();
        }
        self.last_timestamp = Some(report.timestamp);

        let stationary = match self.run {
            Some(_) => self.params.keeps_stop(report),
            None => self.params.starts_stop(report),
        };
        if !stationary {
            self.close_run();
            return;
        }

        match &mut self.run {
            Some(run) if !run.drifted(report, self.params.max_drift) => run.extend(report),
            _ => {
                self.close_run();
                self.run = Some(StationaryRun::start(report));
            }
        }
    }

    pub fn finalize(mut self) -> Vec<DwellPoint> {
        self.close_run();
        self.dwell_points
    }

    fn close_run(&mut self) {
        if let Some(run) = self.run.take() {
            if run.duration() >= self.params.min_duration {
                self.dwell_points.push(run.into_dwell_point());
            } else {
                debug!(
                    "discarding stationary run of {} reports lasting {}",
                    run.num_reports(),
                    run.duration()
                );
            }
        }
    }
}

pub fn extract_dwell_points<'a>(
    reports: impl IntoIterator<Item = &'a PositionReport>,
    params: StationaryParams,
) -> Vec<DwellPoint> {
    let mut extractor = DwellExtractor::new(params);
    for report in reports {
        extractor.advance(report);
    }
    extractor.finalize()
}
