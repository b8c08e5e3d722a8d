mod closure;
mod config;
mod executor;

pub use closure::*;
pub use config::*;
pub(crate) use executor::*;
