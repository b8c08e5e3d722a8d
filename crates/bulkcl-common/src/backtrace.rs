use std::backtrace::{Backtrace, BacktraceStatus};

/// Contains the backtrace information if available.
///
/// Errors raised from inside a cooperative invocation can be created by many units at the same
/// time, so the capture honours `RUST_BACKTRACE` instead of always forcing it.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackTrace {
    inner: Option<String>,
}

impl BackTrace {
    /// Creates a new backtrace from the current thread.
    pub fn capture() -> Self {
        let backtrace = Backtrace::capture();

        Self {
            inner: match backtrace.status() {
                BacktraceStatus::Captured => Some(format!("{backtrace}")),
                _ => None,
            },
        }
    }

    /// Creates an empty backtrace.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Whether frames were captured.
    pub fn is_captured(&self) -> bool {
        self.inner.is_some()
    }
}

impl core::fmt::Debug for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

impl core::fmt::Display for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.inner {
            Some(frames) => f.write_str(frames),
            None => f.write_str("No backtrace captured, set RUST_BACKTRACE=1 to enable it"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_backtrace_displays_hint() {
        let backtrace = BackTrace::disabled();

        assert!(!backtrace.is_captured());
        assert!(format!("{backtrace}").contains("RUST_BACKTRACE"));
    }
}
