use std::sync::Arc;

use anchorages_core::{AnchorageId, PositionReport, VesselId, VisitEvent};
use chrono::{DateTime, Utc};
use strum::{AsRefStr, EnumDiscriminants};
use tracing::debug;

use crate::{AnchorageIndex, StationaryParams, StationaryRun};

/// A visit that has been opened but not yet closed.
#[derive(Debug, Clone)]
pub struct OpenVisit {
    anchorage_id: AnchorageId,
    arrival: DateTime<Utc>,
    last_in_anchorage: DateTime<Utc>,
    /// First report of the current run of moving reports inside the exit extent.
    excursion_start: Option<DateTime<Utc>>,
}

impl OpenVisit {
    fn new(
        anchorage_id: AnchorageId,
        arrival: DateTime<Utc>,
        last_in_anchorage: DateTime<Utc>,
    ) -> Self {
        Self {
            anchorage_id,
            arrival,
            last_in_anchorage,
            excursion_start: None,
        }
    }

    pub fn anchorage_id(&self) -> AnchorageId {
        self.anchorage_id
    }

    pub fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }
}

#[derive(Debug, Clone, EnumDiscriminants)]
#[strum_discriminants(derive(AsRefStr))]
pub enum VesselState {
    AtSea,
    StationaryCandidate(StationaryRun),
    InAnchorage(OpenVisit),
}

/// Assembles the visits of a single vessel from its time ordered reports.
pub struct VisitStateMachine {
    vessel_id: VesselId,
    params: StationaryParams,
    index: Arc<AnchorageIndex>,
    state: VesselState,
    last_report: Option<DateTime<Utc>>,
    visits: Vec<VisitEvent>,
}

impl VisitStateMachine {
    pub fn new(vessel_id: VesselId, params: StationaryParams, index: Arc<AnchorageIndex>) -> Self {
        Self {
            vessel_id,
            params,
            index,
            state: VesselState::AtSea,
            last_report: None,
            visits: Vec::new(),
        }
    }

    pub fn state(&self) -> VesselStateDiscriminants {
        VesselStateDiscriminants::from(&self.state)
    }

    /// Visits closed so far.
    pub fn closed_visits(&self) -> &[VisitEvent] {
        &self.visits
    }

    pub fn advance(&mut self, report: &PositionReport) {
        let state = std::mem::replace(&mut self.state, VesselState::AtSea);
        let from = VesselStateDiscriminants::from(&state);

        let gap_exceeded = self
            .last_report
            .is_some_and(|last| report.timestamp - last > self.params.max_gap);
        self.last_report = Some(report.timestamp);

        let state = if gap_exceeded {
            if let VesselState::InAnchorage(visit) = state {
                self.close(visit);
            }
            VesselState::AtSea
        } else {
            state
        };

        self.state = match state {
            VesselState::AtSea => self.from_at_sea(report),
            VesselState::StationaryCandidate(run) => self.from_candidate(run, report),
            VesselState::InAnchorage(visit) => self.from_in_anchorage(visit, report),
        };

        let to = self.state();
        if from != to {
            debug!(
                "vessel '{}' went from '{}' to '{}' at '{}'",
                self.vessel_id,
                from.as_ref(),
                to.as_ref(),
                report.timestamp
            );
        }
    }

    /// Closes the machine, a visit still open at the end of the track is emitted without a
    /// departure.
    pub fn finalize(mut self) -> Vec<VisitEvent> {
        let state = std::mem::replace(&mut self.state, VesselState::AtSea);
        if let VesselState::InAnchorage(visit) = state {
            self.visits.push(VisitEvent {
                vessel_id: self.vessel_id,
                anchorage_id: visit.anchorage_id,
                arrival: visit.arrival,
                departure: None,
                duration: visit.last_in_anchorage - visit.arrival,
            });
        }
        self.visits
    }

    fn from_at_sea(&mut self, report: &PositionReport) -> VesselState {
        if self.params.starts_stop(report) {
            self.try_enter(StationaryRun::start(report), report)
        } else {
            VesselState::AtSea
        }
    }

    fn from_candidate(&mut self, mut run: StationaryRun, report: &PositionReport) -> VesselState {
        if !self.params.keeps_stop(report) {
            return VesselState::AtSea;
        }
        if run.drifted(report, self.params.max_drift) {
            return self.try_enter(StationaryRun::start(report), report);
        }
        run.extend(report);
        self.try_enter(run, report)
    }

    fn from_in_anchorage(&mut self, mut visit: OpenVisit, report: &PositionReport) -> VesselState {
        let position = report.coordinates();
        let inside = self.index.within_exit_extent(visit.anchorage_id, position);

        if self.params.keeps_stop(report) {
            if inside {
                visit.last_in_anchorage = report.timestamp;
                visit.excursion_start = None;
                return VesselState::InAnchorage(visit);
            }

            self.close(visit);
            return match self.index.entered(position) {
                Some(other) => VesselState::InAnchorage(OpenVisit::new(
                    other,
                    report.timestamp,
                    report.timestamp,
                )),
                None => self.from_at_sea(report),
            };
        }

        if !inside {
            self.close(visit);
            return VesselState::AtSea;
        }

        let excursion_start = *visit.excursion_start.get_or_insert(report.timestamp);
        if report.timestamp - excursion_start > self.params.max_gap {
            self.close(visit);
            VesselState::AtSea
        } else {
            VesselState::InAnchorage(visit)
        }
    }

    fn try_enter(&self, run: StationaryRun, report: &PositionReport) -> VesselState {
        if run.duration() >= self.params.min_duration {
            if let Some(anchorage_id) = self.index.entered(report.coordinates()) {
                return VesselState::InAnchorage(OpenVisit::new(
                    anchorage_id,
                    run.start_timestamp(),
                    report.timestamp,
                ));
            }
        }
        VesselState::StationaryCandidate(run)
    }

    fn close(&mut self, visit: OpenVisit) {
        if visit.last_in_anchorage <= visit.arrival {
            debug!(
                "dropping zero length visit of vessel '{}' to anchorage '{}'",
                self.vessel_id, visit.anchorage_id
            );
            return;
        }
        self.visits.push(VisitEvent {
            vessel_id: self.vessel_id,
            anchorage_id: visit.anchorage_id,
            arrival: visit.arrival,
            departure: Some(visit.last_in_anchorage),
            duration: visit.last_in_anchorage - visit.arrival,
        });
    }
}

pub fn assemble_visits<'a>(
    vessel_id: VesselId,
    reports: impl IntoIterator<Item = &'a PositionReport>,
    params: StationaryParams,
    index: Arc<AnchorageIndex>,
) -> Vec<VisitEvent> {
    let mut machine = VisitStateMachine::new(vessel_id, params, index);
    for report in reports {
        machine.advance(report);
    }
    machine.finalize()
}
