#![deny(warnings)]
#![deny(rust_2018_idioms)]

mod clusterer;
mod compaction;
mod shard;

pub use clusterer::*;
pub use compaction::*;
pub use shard::*;
