mod object;
mod registry;

pub use object::{Lifecycle, TouchObject, TouchStatus, TouchTiming};
pub use registry::{SweepSummary, TouchRegistry};
