mod base;
mod partial;
mod sequential;
mod tile;
mod tiled;

pub use base::*;
