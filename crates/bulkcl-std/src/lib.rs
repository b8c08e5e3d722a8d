//! bulkcl standard library: algorithms run cooperatively by the units of an execution group.

mod copy;
pub use copy::*;

/// Inclusive and exclusive prefix scans.
pub mod scan;
pub use scan::{
    GroupScan, ScanMode, exclusive_scan, inclusive_scan, inclusive_scan_from_first,
};
