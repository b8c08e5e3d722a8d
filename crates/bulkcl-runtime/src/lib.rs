#![warn(missing_docs)]

//! bulkcl runtime crate: cooperative execution groups, their on-chip memory and the
//! asynchronous launcher that runs them.

#[macro_use]
extern crate derive_new;

mod id;

/// Configuration module.
pub mod config;
/// Device properties and occupancy analysis.
pub mod device;
/// Launch errors, allocation errors and execution errors.
pub mod error;
/// Execution groups and their shapes.
pub mod group;
/// Asynchronous launch of closures over execution groups.
pub mod launch;
/// Device memory, typed slices and the group allocator.
pub mod memory;
/// Ordered streams of work and their events.
pub mod stream;

/// Accelerator client module.
pub mod client;
mod future;

mod base;

pub use base::*;
pub use future::*;
pub use id::*;
