use crate::device::Generation;

/// Overrides of the simulated accelerator properties.
///
/// Unset values use the defaults of [DeviceProperties](crate::device::DeviceProperties).
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Number of cores, defaults to the available parallelism of the host.
    #[serde(default)]
    pub num_cores: Option<usize>,
    /// Number of units executed in lockstep.
    #[serde(default)]
    pub plane_size: Option<usize>,
    /// Maximum number of units in one group.
    #[serde(default)]
    pub max_units_per_group: Option<usize>,
    /// Maximum number of units resident on one core.
    #[serde(default)]
    pub max_units_per_core: Option<usize>,
    /// Maximum number of groups resident on one core.
    #[serde(default)]
    pub max_groups_per_core: Option<usize>,
    /// On-chip bytes available on one core.
    #[serde(default)]
    pub on_chip_bytes_per_core: Option<usize>,
    /// Maximum on-chip bytes one group can use.
    #[serde(default)]
    pub max_on_chip_bytes_per_group: Option<usize>,
    /// Bytes groups can allocate off-chip.
    #[serde(default)]
    pub off_chip_capacity: Option<usize>,
    /// Architecture generation.
    #[serde(default)]
    pub generation: Option<Generation>,
}
