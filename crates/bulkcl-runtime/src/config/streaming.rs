use super::logger::{LogLevel, LoggerConfig};

/// Configuration for streams.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StreamingConfig {
    /// Logger configuration for streaming logs.
    #[serde(default)]
    pub logger: LoggerConfig<StreamingLogLevel>,
    /// The maximum number of streams to be used.
    #[serde(default = "default_max_streams")]
    pub max_streams: u8,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            logger: Default::default(),
            max_streams: default_max_streams(),
        }
    }
}

fn default_max_streams() -> u8 {
    4
}

/// Log levels for streaming.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum StreamingLogLevel {
    /// Streaming logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Stream creation is logged.
    #[serde(rename = "basic")]
    Basic,

    /// Every task scheduled on a stream is logged.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for StreamingLogLevel {}
