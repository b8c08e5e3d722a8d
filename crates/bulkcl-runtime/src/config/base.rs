use super::{
    device::DeviceConfig,
    launch::{LaunchLogLevel, LaunchingConfig},
    streaming::{StreamingConfig, StreamingLogLevel},
};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static BULKCL_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for bulkcl, combining device, launch and streaming
/// settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration of the simulated accelerator.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Configuration for launches.
    #[serde(default)]
    pub launch: LaunchingConfig,

    /// Configuration for streams.
    #[serde(default)]
    pub streaming: StreamingConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `bulkcl.toml` or `BulkCL.toml` in
    /// the current directory or its parents. If no file is found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function is somewhat expensive, because of a global static lock. Read the
    /// values you need once, when building long-lived objects such as the client.
    pub fn get() -> Arc<Self> {
        let mut state = BULKCL_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(path, content)
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`. Attempting
    /// to set the configuration after it has been initialized will cause a panic.
    pub fn set(config: Self) {
        let mut state = BULKCL_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("BULKCL_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;
            self.streaming.logger.level = StreamingLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                    self.streaming.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                    self.streaming.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = std::env::temp_dir().join("bulkcl.log");
                    self.launch.logger.file = Some(file_path.clone());
                    self.streaming.logger.file = Some(file_path);
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.streaming.logger.level = StreamingLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                    self.streaming.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("BULKCL_MAX_STREAMS") {
            match val.parse::<u8>() {
                Ok(max_streams) if max_streams > 0 => self.streaming.max_streams = max_streams,
                _ => log::warn!("Ignoring invalid BULKCL_MAX_STREAMS value {val:?}"),
            }
        }

        self
    }

    /// Parse a configuration from its TOML representation.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    // Loads configuration from `bulkcl.toml` or `BulkCL.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is reached.
    // Returns a default configuration if no file is found.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["bulkcl.toml", "BulkCL.toml"] {
                if let Some(config) = Self::from_file_path(dir.join(name)) {
                    return config;
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    // Loads configuration from a specified file path.
    fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> Option<Self> {
        let content = std::fs::read_to_string(path.as_ref()).ok()?;

        match Self::from_toml(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!(
                    "Ignoring {} which doesn't have the right format => {err}",
                    path.as_ref().display()
                );
                None
            }
        }
    }
}
