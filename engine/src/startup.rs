use std::sync::Arc;

use anchorages_core::{PipelineStore, RunStats};
use snafu::ResultExt;
use tracing::info;

use crate::{
    FileAdapter, PipelineCoordinator, Result, error::error::StorageSnafu, settings::Settings,
};

pub struct App {
    coordinator: PipelineCoordinator,
    adapter: Arc<dyn PipelineStore>,
}

/// Counts of what a full run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub num_reports: usize,
    pub num_anchorages: usize,
    pub num_visits: usize,
    pub detection_stats: RunStats,
    pub extraction_stats: RunStats,
}

impl App {
    pub fn build(settings: &Settings) -> Result<App> {
        let adapter = FileAdapter::new(&settings.input);
        App::with_adapter(settings, Arc::new(adapter))
    }

    pub fn with_adapter(settings: &Settings, adapter: Arc<dyn PipelineStore>) -> Result<App> {
        let coordinator =
            PipelineCoordinator::new(settings.pipeline.clone(), settings.num_workers)?;
        Ok(App {
            coordinator,
            adapter,
        })
    }

    /// Detects anchorages, persists them, then assembles and persists visits against them.
    pub async fn run(self) -> Result<RunSummary> {
        let reports = self.adapter.position_reports().await.context(StorageSnafu)?;
        let prior = self.adapter.prior_anchorages().await.context(StorageSnafu)?;
        let num_reports = reports.len();

        let detection = self
            .coordinator
            .detect_anchorages(reports.clone(), prior)
            .await?;
        self.adapter
            .store_anchorages(&detection.anchorages)
            .await
            .context(StorageSnafu)?;

        let extraction = self
            .coordinator
            .extract_visits(reports, detection.anchorages.clone())
            .await?;
        self.adapter
            .store_visits(&extraction.visits)
            .await
            .context(StorageSnafu)?;

        let summary = RunSummary {
            num_reports,
            num_anchorages: detection.anchorages.len(),
            num_visits: extraction.visits.len(),
            detection_stats: detection.stats,
            extraction_stats: extraction.stats,
        };
        info!("completed run: {summary:?}");

        Ok(summary)
    }
}
