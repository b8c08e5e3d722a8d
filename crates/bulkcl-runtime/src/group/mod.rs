mod barrier;
mod base;
mod bounded;
mod context;
mod dynamic;
mod shape;
mod static_group;

pub use barrier::*;
pub use base::*;
pub use bounded::*;
pub use context::*;
pub use dynamic::*;
pub use shape::*;
pub use static_group::*;
