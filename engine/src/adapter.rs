use std::{io::ErrorKind, path::PathBuf};

use anchorages_core::{
    Anchorage, AnchorageStore, CoreResult, PositionReport, TrackSource, VisitEvent, VisitSink,
    error::error::StorageSnafu,
};
use async_trait::async_trait;
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::settings::FileSettings;

/// Reads tracks from CSV, keeps anchorages as a JSON snapshot and appends visits as JSON lines.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    tracks: PathBuf,
    anchorages: PathBuf,
    visits: PathBuf,
}

impl FileAdapter {
    pub fn new(settings: &FileSettings) -> Self {
        Self {
            tracks: settings.tracks.clone(),
            anchorages: settings.anchorages.clone(),
            visits: settings.visits.clone(),
        }
    }
}

#[async_trait]
impl TrackSource for FileAdapter {
    async fn position_reports(&self) -> CoreResult<Vec<PositionReport>> {
        let bytes = tokio::fs::read(&self.tracks).await.boxed().context(StorageSnafu)?;

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut reports = Vec::new();
        for record in reader.deserialize::<PositionReport>() {
            match record {
                Ok(report) => reports.push(report),
                Err(e) => warn!("skipping malformed track row: {e}"),
            }
        }

        info!("read {} position reports from '{}'", reports.len(), self.tracks.display());
        Ok(reports)
    }
}

#[async_trait]
impl AnchorageStore for FileAdapter {
    async fn prior_anchorages(&self) -> CoreResult<Vec<Anchorage>> {
        match tokio::fs::read(&self.anchorages).await {
            Ok(bytes) => serde_json::from_slice(&bytes).boxed().context(StorageSnafu),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "no anchorage snapshot at '{}', starting without prior anchorages",
                    self.anchorages.display()
                );
                Ok(vec![])
            }
            Err(e) => Err(e).boxed().context(StorageSnafu),
        }
    }

    async fn store_anchorages(&self, anchorages: &[Anchorage]) -> CoreResult<()> {
        let json = serde_json::to_vec_pretty(anchorages).boxed().context(StorageSnafu)?;

        // Written next to the snapshot and renamed over it, an interrupted run leaves the old one.
        let staging = self.anchorages.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.boxed().context(StorageSnafu)?;
        tokio::fs::rename(&staging, &self.anchorages)
            .await
            .boxed()
            .context(StorageSnafu)
    }
}

#[async_trait]
impl VisitSink for FileAdapter {
    async fn store_visits(&self, visits: &[VisitEvent]) -> CoreResult<()> {
        let mut lines = Vec::new();
        for visit in visits {
            serde_json::to_writer(&mut lines, visit).boxed().context(StorageSnafu)?;
            lines.push(b'\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.visits)
            .await
            .boxed()
            .context(StorageSnafu)?;
        file.write_all(&lines).await.boxed().context(StorageSnafu)?;
        file.flush().await.boxed().context(StorageSnafu)
    }
}
