use bulkcl_common::backtrace::BackTrace;
use thiserror::Error;

/// Error returned by a launch before any work is enqueued.
#[derive(Error, Clone)]
pub enum LaunchError {
    /// Too many resources were requested.
    #[error("Too many resources were requested during launch\n{0}")]
    TooManyResources(#[from] ResourceLimitError),

    /// The group shape can't describe a valid group.
    #[error("An invalid group shape was given to the launch\nCaused by:\n  {reason}\nBacktrace\n{backtrace}")]
    InvalidShape {
        /// The details of the invalid shape.
        reason: String,
        /// The captured backtrace.
        backtrace: BackTrace,
    },
}

/// Resource limits that a single group can exceed.
#[derive(Error, Clone)]
pub enum ResourceLimitError {
    /// On-chip memory exceeds maximum.
    #[error(
        "Too much on-chip memory requested.\nRequested {requested} bytes, maximum {max} bytes available.\nBacktrace\n{backtrace}"
    )]
    SharedMemory {
        /// Value requested.
        requested: usize,
        /// Maximum value.
        max: usize,
        /// The captured backtrace.
        backtrace: BackTrace,
    },
    /// Units per group exceeds maximum.
    #[error(
        "Group unit count exceeds maximum.\nRequested {requested} units, max units is {max}.\nBacktrace\n{backtrace}"
    )]
    Units {
        /// Value requested.
        requested: usize,
        /// Maximum value.
        max: usize,
        /// The captured backtrace.
        backtrace: BackTrace,
    },
}

/// Error returned by the group allocator.
///
/// Every unit of the group observes the same error since the allocation is collective.
#[derive(Error, Clone)]
pub enum AllocError {
    /// Neither the on-chip arena nor the off-chip pool can hold the request.
    #[error(
        "An out-of-memory error happened during a group allocation.\nRequested {requested} bytes, {available} bytes available off-chip.\nBacktrace\n{backtrace}"
    )]
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
        /// Off-chip bytes still available when the request failed.
        available: usize,
        /// The captured backtrace.
        backtrace: BackTrace,
    },
}

/// Error reported through a [future](crate::GroupFuture) once the launched work is done.
#[derive(Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A unit panicked, aborting its whole group.
    #[error("Unit {unit} of group {group} faulted\nCaused by:\n  {reason}")]
    UnitFault {
        /// Index of the faulting group.
        group: usize,
        /// Index of the faulting unit inside its group.
        unit: usize,
        /// The panic message.
        reason: String,
    },
    /// The work was dropped before it could complete.
    #[error("The work was abandoned before completion\nCaused by:\n  {reason}")]
    Abandoned {
        /// Why the work never completed.
        reason: String,
    },
}

impl core::fmt::Debug for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for ResourceLimitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_limit_converts_into_launch_error() {
        let error: LaunchError = ResourceLimitError::Units {
            requested: 512,
            max: 256,
            backtrace: BackTrace::disabled(),
        }
        .into();

        let message = format!("{error:?}");
        assert!(message.contains("Requested 512 units"));
        assert!(matches!(
            error,
            LaunchError::TooManyResources(ResourceLimitError::Units { max: 256, .. })
        ));
    }
}
