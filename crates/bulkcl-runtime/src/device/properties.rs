use crate::config::device::DeviceConfig;

/// Hardware limits of the accelerator that drive occupancy and launch validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareProperties {
    /// Number of units executed in lockstep; group sizes are rounded to it.
    pub plane_size: usize,
    /// Maximum number of units in one group.
    pub max_units_per_group: usize,
    /// Maximum number of units resident on one core.
    pub max_units_per_core: usize,
    /// Maximum number of groups resident on one core.
    pub max_groups_per_core: usize,
    /// Registers available on one core.
    pub registers_per_core: usize,
    /// Register allocation granularity for one group.
    pub register_granularity: usize,
    /// On-chip bytes available on one core.
    pub on_chip_bytes_per_core: usize,
    /// Maximum on-chip bytes one group can use.
    pub max_on_chip_bytes_per_group: usize,
    /// Number of cores, which is the number of groups running concurrently.
    pub num_cores: usize,
}

/// Off-chip memory properties.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryProperties {
    /// Bytes groups can allocate off-chip.
    pub off_chip_capacity: usize,
    /// Alignment of off-chip buffers in bytes.
    pub alignment: usize,
}

/// Architecture generation of the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Generation {
    /// Major revision.
    pub major: u32,
    /// Minor revision.
    pub minor: u32,
}

impl Generation {
    /// Create a new generation.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether copies into on-chip memory are faster when every unit loads its whole grain
    /// before storing any of it.
    pub fn benefits_from_staged_copy(&self) -> bool {
        self.major == 3
    }
}

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}.{}", self.major, self.minor))
    }
}

/// Properties of the accelerator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProperties {
    /// Hardware limits.
    pub hardware: HardwareProperties,
    /// Memory properties.
    pub memory: MemoryProperties,
    /// Architecture generation.
    pub generation: Generation,
}

/// Algorithm choices derived once from the [device properties](DeviceProperties).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Use the staged strategy for off-chip to on-chip copies of static groups.
    pub staged_copy: bool,
}

impl DeviceProperties {
    /// Build the properties from the device configuration, using defaults for unset values.
    pub fn from_config(config: &DeviceConfig) -> Self {
        let num_cores = config.num_cores.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|cores| cores.get())
                .unwrap_or(1)
        });

        Self {
            hardware: HardwareProperties {
                plane_size: config.plane_size.unwrap_or(32),
                max_units_per_group: config.max_units_per_group.unwrap_or(256),
                max_units_per_core: config.max_units_per_core.unwrap_or(1024),
                max_groups_per_core: config.max_groups_per_core.unwrap_or(8),
                registers_per_core: 65536,
                register_granularity: 256,
                on_chip_bytes_per_core: config.on_chip_bytes_per_core.unwrap_or(98304),
                max_on_chip_bytes_per_group: config.max_on_chip_bytes_per_group.unwrap_or(49152),
                num_cores,
            },
            memory: MemoryProperties {
                off_chip_capacity: config.off_chip_capacity.unwrap_or(1 << 30),
                alignment: 256,
            },
            generation: config.generation.unwrap_or(Generation::new(7, 0)),
        }
    }

    /// The capabilities of the device.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            staged_copy: self.generation.benefits_from_staged_copy(),
        }
    }
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_copy_is_enabled_for_generation_three_only() {
        let mut properties = DeviceProperties::default();
        assert!(!properties.capabilities().staged_copy);

        properties.generation = Generation::new(3, 5);
        assert!(properties.capabilities().staged_copy);
    }

    #[test]
    fn config_overrides_defaults() {
        let config = DeviceConfig {
            num_cores: Some(3),
            max_units_per_group: Some(64),
            ..Default::default()
        };
        let properties = DeviceProperties::from_config(&config);

        assert_eq!(properties.hardware.num_cores, 3);
        assert_eq!(properties.hardware.max_units_per_group, 64);
        assert_eq!(properties.hardware.plane_size, 32);
    }
}
