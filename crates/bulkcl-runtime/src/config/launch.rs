use super::logger::{LogLevel, LoggerConfig};

/// Configuration for launches.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchingConfig {
    /// Logger configuration for launch logs.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
    /// Registers per unit assumed by the occupancy analysis when a closure doesn't declare
    /// its footprint.
    #[serde(default = "default_registers_per_unit")]
    pub registers_per_unit: usize,
    /// Stack size of the thread running each unit.
    #[serde(default = "default_unit_stack_bytes")]
    pub unit_stack_bytes: usize,
}

impl Default for LaunchingConfig {
    fn default() -> Self {
        Self {
            logger: Default::default(),
            registers_per_unit: default_registers_per_unit(),
            unit_stack_bytes: default_unit_stack_bytes(),
        }
    }
}

fn default_registers_per_unit() -> usize {
    32
}

fn default_unit_stack_bytes() -> usize {
    512 * 1024
}

/// Log levels for launches.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LaunchLogLevel {
    /// Launch logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// The resolved shape of each launch is logged.
    #[serde(rename = "basic")]
    Basic,

    /// Resolved shapes and completions are logged.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
