use std::sync::Arc;

use super::DeviceProperties;
use crate::config::GlobalConfig;

static PROPERTIES: spin::Once<Arc<DeviceProperties>> = spin::Once::new();

/// Process-wide access to the accelerator properties.
pub struct DeviceInfo;

impl DeviceInfo {
    /// The properties of the accelerator, queried once from the global configuration and
    /// shared by every caller afterwards.
    pub fn properties() -> Arc<DeviceProperties> {
        PROPERTIES
            .call_once(|| {
                let properties = DeviceProperties::from_config(&GlobalConfig::get().device);
                log::debug!(
                    "Device properties resolved: {} cores, generation {}",
                    properties.hardware.num_cores,
                    properties.generation
                );
                Arc::new(properties)
            })
            .clone()
    }
}
