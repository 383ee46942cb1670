use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

use anchorages_core::{
    CoreResult, PipelineConfig, PositionReport, RunStats, VesselId,
    error::error::DataOrderingWarningSnafu,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

#[derive(Debug)]
struct Buffered {
    timestamp: DateTime<Utc>,
    sequence: u64,
    report: PositionReport,
}

impl PartialEq for Buffered {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Buffered {}

impl PartialOrd for Buffered {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Buffered {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Restores the time order of a vessel's reports within a window of `capacity` reports.
///
/// Reports are released oldest first once the window is full. A report older than the last
/// released one can no longer be placed and is rejected.
#[derive(Debug)]
pub struct ReorderBuffer {
    vessel_id: VesselId,
    capacity: usize,
    heap: BinaryHeap<Reverse<Buffered>>,
    sequence: u64,
    watermark: Option<DateTime<Utc>>,
}

impl ReorderBuffer {
    pub fn new(vessel_id: VesselId, capacity: usize) -> Self {
        Self {
            vessel_id,
            capacity: capacity.max(1),
            heap: BinaryHeap::with_capacity(capacity + 1),
            sequence: 0,
            watermark: None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, report: PositionReport) -> CoreResult<Option<PositionReport>> {
        if let Some(watermark) = self.watermark.filter(|w| report.timestamp < *w) {
            return DataOrderingWarningSnafu {
                vessel_id: self.vessel_id,
                timestamp: report.timestamp,
                watermark,
            }
            .fail();
        }

        self.heap.push(Reverse(Buffered {
            timestamp: report.timestamp,
            sequence: self.sequence,
            report,
        }));
        self.sequence += 1;

        if self.heap.len() > self.capacity {
            Ok(self.pop())
        } else {
            Ok(None)
        }
    }

    pub fn drain(mut self) -> Vec<PositionReport> {
        let mut released = Vec::with_capacity(self.heap.len());
        while let Some(report) = self.pop() {
            released.push(report);
        }
        released
    }

    fn pop(&mut self) -> Option<PositionReport> {
        let Reverse(buffered) = self.heap.pop()?;
        self.watermark = Some(buffered.timestamp);
        Some(buffered.report)
    }
}

/// A vessel's validated, deduplicated and time ordered reports.
#[derive(Debug, Clone)]
pub struct PreparedTrack {
    pub vessel_id: VesselId,
    pub reports: Vec<PositionReport>,
    pub stats: RunStats,
}

pub fn prepare_track(
    vessel_id: VesselId,
    reports: Vec<PositionReport>,
    config: &PipelineConfig,
) -> PreparedTrack {
    let mut stats = RunStats::default();

    if config.is_excluded(vessel_id) {
        debug!("skipping excluded vessel '{vessel_id}'");
        stats.excluded_vessels += 1;
        return PreparedTrack {
            vessel_id,
            reports: vec![],
            stats,
        };
    }

    let mut buffer = ReorderBuffer::new(vessel_id, config.reorder_window_size);
    let mut prepared: Vec<PositionReport> = Vec::with_capacity(reports.len());

    for report in reports {
        if let Err(e) = report.validate() {
            warn!("dropping report of vessel '{vessel_id}' at '{}': {e}", report.timestamp);
            stats.record(&e);
            continue;
        }
        if !config.in_region(report.coordinates()) {
            stats.filtered_reports += 1;
            continue;
        }
        match buffer.push(report) {
            Ok(Some(released)) => release(&mut prepared, released, &mut stats),
            Ok(None) => {}
            Err(e) => {
                warn!("{e}");
                stats.record(&e);
            }
        }
    }
    for released in buffer.drain() {
        release(&mut prepared, released, &mut stats);
    }

    if prepared.len() < config.min_track_positions {
        debug!(
            "skipping vessel '{vessel_id}' with {} positions, required: {}",
            prepared.len(),
            config.min_track_positions
        );
        stats.short_tracks += 1;
        prepared.clear();
    }

    if let Some(interval) = config.min_report_interval() {
        let before = prepared.len();
        thin(&mut prepared, interval);
        stats.thinned_reports += (before - prepared.len()) as u64;
    }

    PreparedTrack {
        vessel_id,
        reports: prepared,
        stats,
    }
}

/// Keeps the first report and every report at least `interval` after the last kept one.
fn thin(reports: &mut Vec<PositionReport>, interval: Duration) {
    let mut last_kept: Option<DateTime<Utc>> = None;
    reports.retain(|report| {
        let keep = last_kept.is_none_or(|last| report.timestamp - last >= interval);
        if keep {
            last_kept = Some(report.timestamp);
        }
        keep
    });
}

fn release(prepared: &mut Vec<PositionReport>, report: PositionReport, stats: &mut RunStats) {
    if prepared
        .last()
        .is_some_and(|last| last.timestamp == report.timestamp)
    {
        stats.duplicate_reports += 1;
    } else {
        prepared.push(report);
    }
}
