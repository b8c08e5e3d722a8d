/// Device config module.
pub mod device;
/// Launch config module.
pub mod launch;
/// Streaming config module.
pub mod streaming;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
