#![deny(warnings)]
#![deny(rust_2018_idioms)]

mod config;
mod domain;
mod geo;
mod grid;
mod mean;
mod ports;
mod stats;

pub mod error;

#[cfg(feature = "test")]
pub mod test_helper;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use geo::*;
pub use grid::*;
pub use mean::*;
pub use ports::*;
pub use stats::*;
