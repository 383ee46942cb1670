use async_trait::async_trait;

use crate::{Anchorage, CoreResult, PositionReport, VisitEvent};

#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn position_reports(&self) -> CoreResult<Vec<PositionReport>>;
}

#[async_trait]
pub trait AnchorageStore: Send + Sync {
    /// Anchorages persisted by the previous run, empty on a cold start.
    async fn prior_anchorages(&self) -> CoreResult<Vec<Anchorage>>;
    async fn store_anchorages(&self, anchorages: &[Anchorage]) -> CoreResult<()>;
}

#[async_trait]
pub trait VisitSink: Send + Sync {
    async fn store_visits(&self, visits: &[VisitEvent]) -> CoreResult<()>;
}

pub trait PipelineStore: TrackSource + AnchorageStore + VisitSink {}

impl<T> PipelineStore for T where T: TrackSource + AnchorageStore + VisitSink {}
