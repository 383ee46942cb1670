mod anchorage;
mod dwell;
mod position;
mod visit;

pub use anchorage::*;
pub use dwell::*;
pub use position::*;
pub use visit::*;
