#![allow(dead_code)]

use std::sync::Arc;

use bulkcl_runtime::{
    client::AcceleratorClient,
    config::GlobalConfig,
    device::{DeviceProperties, Generation},
};
use rand::{Rng, SeedableRng, distr::Uniform, rngs::StdRng};

pub fn test_client() -> AcceleratorClient {
    client_with(Generation::new(7, 0))
}

/// A client for a device of the given generation, with four cores.
pub fn client_with(generation: Generation) -> AcceleratorClient {
    let mut properties = DeviceProperties::default();
    properties.hardware.num_cores = 4;
    properties.generation = generation;

    AcceleratorClient::with_config(Arc::new(properties), Arc::new(GlobalConfig::default()))
}

/// Deterministic values in `1..20`.
pub fn random_values(len: usize) -> Vec<i64> {
    StdRng::seed_from_u64(1234)
        .sample_iter(Uniform::<i64>::new(1, 20).unwrap())
        .take(len)
        .collect()
}
