#![deny(warnings)]
#![deny(rust_2018_idioms)]

mod dwell;
mod lookup;
mod stationary;
mod statemachine;
mod track;

pub use dwell::*;
pub use lookup::*;
pub use stationary::*;
pub use statemachine::*;
pub use track::*;
