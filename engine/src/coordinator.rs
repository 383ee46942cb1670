use std::{collections::BTreeMap, sync::Arc};

use anchorage_clusterer::{AnchorageClusterer, Clustering, prior_ids};
use anchorages_core::{
    Anchorage, DwellPoint, PipelineConfig, PositionReport, RunStats, VesselId, VisitEvent,
};
use async_channel::Receiver;
use itertools::Itertools;
use snafu::ResultExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use visit_assembler::{
    AnchorageIndex, StationaryParams, assemble_visits, extract_dwell_points, prepare_track,
};

use crate::{
    Result,
    error::error::{ConfigurationSnafu, JoinSnafu},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorageDetection {
    pub anchorages: Vec<Anchorage>,
    pub stats: RunStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitExtraction {
    pub visits: Vec<VisitEvent>,
    pub stats: RunStats,
}

/// Runs the per-vessel stages on a pool of workers and clusters their output.
#[derive(Debug, Clone)]
pub struct PipelineCoordinator {
    config: Arc<PipelineConfig>,
    num_workers: usize,
}

impl PipelineCoordinator {
    pub fn new(config: PipelineConfig, num_workers: usize) -> Result<Self> {
        config.validate().context(ConfigurationSnafu)?;
        Ok(Self {
            config: Arc::new(config),
            num_workers: num_workers.max(1),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extracts the dwell points of every vessel in `track_batch` and clusters them together with
    /// `prior` into anchorages, ordered by id.
    #[instrument(skip_all)]
    pub async fn detect_anchorages(
        &self,
        track_batch: Vec<PositionReport>,
        prior: Vec<Anchorage>,
    ) -> Result<AnchorageDetection> {
        let config = self.config.clone();
        let params = StationaryParams::from(config.as_ref());

        let tracks = self
            .per_vessel(track_batch, move |vessel_id, reports| {
                let track = prepare_track(vessel_id, reports, &config);
                (extract_dwell_points(&track.reports, params), track.stats)
            })
            .await?;

        let mut stats = RunStats::default();
        let mut dwell_points = Vec::new();
        for (points, track_stats) in tracks {
            stats += track_stats;
            dwell_points.extend(points);
        }
        let num_dwell_points = dwell_points.len();

        let clustering = self.cluster(dwell_points, prior).await?;
        stats += clustering.stats;

        log_dropped(&stats);
        info!(
            "detected {} anchorages from {num_dwell_points} dwell points",
            clustering.anchorages.len()
        );

        Ok(AnchorageDetection {
            anchorages: clustering.anchorages,
            stats,
        })
    }

    /// Assembles the visits of every vessel in `track_batch` to `anchorages`, ordered by vessel and
    /// arrival.
    #[instrument(skip_all)]
    pub async fn extract_visits(
        &self,
        track_batch: Vec<PositionReport>,
        anchorages: Vec<Anchorage>,
    ) -> Result<VisitExtraction> {
        let config = self.config.clone();
        let params = StationaryParams::from(config.as_ref());
        let index = Arc::new(AnchorageIndex::new(anchorages, &config));

        let tracks = self
            .per_vessel(track_batch, move |vessel_id, reports| {
                let track = prepare_track(vessel_id, reports, &config);
                let visits = assemble_visits(vessel_id, &track.reports, params, index.clone());
                (visits, track.stats)
            })
            .await?;

        let mut stats = RunStats::default();
        let mut visits = Vec::new();
        for (vessel_visits, track_stats) in tracks {
            stats += track_stats;
            visits.extend(vessel_visits);
        }
        let visits = visits
            .into_iter()
            .sorted_by_key(|v| (v.vessel_id, v.arrival))
            .collect::<Vec<_>>();

        log_dropped(&stats);
        info!("extracted {} visits", visits.len());

        Ok(VisitExtraction { visits, stats })
    }

    async fn cluster(
        &self,
        dwell_points: Vec<DwellPoint>,
        prior: Vec<Anchorage>,
    ) -> Result<Clustering> {
        let clusterer = Arc::new(AnchorageClusterer::new(self.config.as_ref().clone()));

        if self.config.num_shards <= 1 {
            return tokio::task::spawn_blocking(move || clusterer.cluster(dwell_points, prior))
                .await
                .map_err(|error| JoinSnafu { error }.build());
        }

        let ids = prior_ids(&prior);
        let mut set = JoinSet::new();
        for shard in clusterer.partition(dwell_points, prior) {
            let clusterer = clusterer.clone();
            set.spawn_blocking(move || clusterer.cluster_shard(shard));
        }

        let mut partials = Vec::with_capacity(self.config.num_shards);
        while let Some(res) = set.join_next().await {
            partials.push(res.map_err(|error| JoinSnafu { error }.build())?);
        }

        tokio::task::spawn_blocking(move || clusterer.reconcile(partials, &ids))
            .await
            .map_err(|error| JoinSnafu { error }.build())
    }

    async fn per_vessel<F, O>(&self, track_batch: Vec<PositionReport>, task: F) -> Result<Vec<O>>
    where
        F: Fn(VesselId, Vec<PositionReport>) -> O + Clone + Send + 'static,
        O: Send + 'static,
    {
        let tracks = group_by_vessel(track_batch);
        let num_tracks = tracks.len();

        let (sender, receiver) = async_channel::unbounded();
        let mut set = JoinSet::new();

        for _ in 0..self.num_workers.min(num_tracks.max(1)) {
            set.spawn(vessel_task(receiver.clone(), task.clone()));
        }

        for track in tracks {
            if let Err(e) = sender.send(track).await {
                error!("vessel workers exited before all tracks were sent: {e}");
                break;
            }
        }

        // Workers drain the remaining tracks and exit once the channel is closed and empty.
        drop(sender);

        let mut output = Vec::with_capacity(num_tracks);
        while let Some(res) = set.join_next().await {
            output.extend(res.map_err(|error| JoinSnafu { error }.build())?);
        }

        Ok(output)
    }
}

async fn vessel_task<F, O>(receiver: Receiver<(VesselId, Vec<PositionReport>)>, task: F) -> Vec<O>
where
    F: Fn(VesselId, Vec<PositionReport>) -> O,
{
    let mut output = Vec::new();
    while let Ok((vessel_id, reports)) = receiver.recv().await {
        output.push(task(vessel_id, reports));
    }
    output
}

fn group_by_vessel(track_batch: Vec<PositionReport>) -> BTreeMap<VesselId, Vec<PositionReport>> {
    let mut tracks: BTreeMap<VesselId, Vec<PositionReport>> = BTreeMap::new();
    for report in track_batch {
        tracks.entry(report.vessel_id).or_default().push(report);
    }
    tracks
}

fn log_dropped(stats: &RunStats) {
    if stats.filtered_reports > 0 || stats.thinned_reports > 0 {
        debug!(
            "outside regions: {}, thinned: {}",
            stats.filtered_reports, stats.thinned_reports
        );
    }
    if stats.dropped_records() > 0 || stats.merge_conflicts > 0 {
        warn!(
            "invalid coordinates: {}, invalid speeds: {}, out of order: {}, duplicates: {}, \
             merge conflicts: {}",
            stats.invalid_coordinates,
            stats.invalid_speeds,
            stats.ordering_warnings,
            stats.duplicate_reports,
            stats.merge_conflicts
        );
    }
}
