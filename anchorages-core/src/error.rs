use chrono::{DateTime, Utc};
use snafu::{Location, Snafu};

use crate::{AnchorageId, VesselId};

pub type CoreResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid coordinate, latitude: '{latitude}', longitude: '{longitude}'"))]
    InvalidCoordinate {
        #[snafu(implicit)]
        location: Location,
        latitude: f64,
        longitude: f64,
    },
    #[snafu(display("Invalid speed '{speed}' knots"))]
    InvalidSpeed {
        #[snafu(implicit)]
        location: Location,
        speed: f64,
    },
    #[snafu(display(
        "Report for vessel '{vessel_id}' at '{timestamp}' arrived after the reorder window moved past '{watermark}'"
    ))]
    DataOrderingWarning {
        #[snafu(implicit)]
        location: Location,
        vessel_id: VesselId,
        timestamp: DateTime<Utc>,
        watermark: DateTime<Utc>,
    },
    #[snafu(display("Invalid configuration: {reason}"))]
    Configuration {
        #[snafu(implicit)]
        location: Location,
        reason: String,
    },
    #[snafu(display(
        "Anchorages '{kept}' and '{other}' are equidistant from '{latitude}, {longitude}', kept '{kept}'"
    ))]
    ClusterMergeConflict {
        #[snafu(implicit)]
        location: Location,
        kept: AnchorageId,
        other: AnchorageId,
        latitude: f64,
        longitude: f64,
    },
    #[snafu(display("Storage operation failed"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Per-record errors are recovered by dropping the record, everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidCoordinate { .. }
            | Error::InvalidSpeed { .. }
            | Error::DataOrderingWarning { .. }
            | Error::ClusterMergeConflict { .. } => true,
            Error::Configuration { .. } | Error::Storage { .. } => false,
        }
    }
}
