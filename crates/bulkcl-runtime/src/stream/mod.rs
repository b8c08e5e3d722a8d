mod base;
mod event;
mod worker;

pub use base::*;
pub use event::*;
pub use worker::*;
