#![deny(warnings)]
#![deny(rust_2018_idioms)]

mod adapter;
mod coordinator;
pub mod error;

pub mod settings;
pub mod startup;

pub use adapter::*;
pub use coordinator::*;
pub use error::*;
