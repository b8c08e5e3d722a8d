#![warn(missing_docs)]

//! # bulkcl Common Library
//!
//! This library contains common types used by other bulkcl crates that must be shared.

/// Backtrace module to build error reports.
pub mod backtrace;

/// Future utils with a compatible API for blocking host threads.
pub mod future;

/// Stream id related utilities.
pub mod stream_id;
