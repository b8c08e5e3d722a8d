mod info;
/// Occupancy heuristics used to size launches.
pub mod occupancy;
mod properties;

pub use info::*;
pub use occupancy::KernelFootprint;
pub use properties::*;
