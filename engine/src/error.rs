use snafu::{Location, Snafu};
use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid pipeline configuration"))]
    Configuration {
        #[snafu(implicit)]
        location: Location,
        source: anchorages_core::Error,
    },
    #[snafu(display("Failed to join tasks"))]
    JoinError {
        #[snafu(implicit)]
        location: Location,
        error: JoinError,
    },
    #[snafu(display("Failed a storage operation"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        source: anchorages_core::Error,
    },
}
