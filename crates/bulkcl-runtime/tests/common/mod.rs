use std::sync::Arc;

use bulkcl_runtime::{
    client::AcceleratorClient,
    config::GlobalConfig,
    device::DeviceProperties,
};

pub const TEST_CORES: usize = 4;

/// Properties of the device simulated by the tests, independent of the host.
pub fn test_properties() -> DeviceProperties {
    let mut properties = DeviceProperties::default();
    properties.hardware.num_cores = TEST_CORES;
    properties
}

pub fn test_client() -> AcceleratorClient {
    client_with(test_properties())
}

pub fn client_with(properties: DeviceProperties) -> AcceleratorClient {
    AcceleratorClient::with_config(Arc::new(properties), Arc::new(GlobalConfig::default()))
}
