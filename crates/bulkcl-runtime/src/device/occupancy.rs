use super::DeviceProperties;

/// Per-kernel resource usage considered by the occupancy analysis.
#[derive(new, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelFootprint {
    /// Registers used by each unit.
    pub registers_per_unit: usize,
    /// On-chip bytes used by each group before any dynamic allocation.
    pub static_on_chip_bytes: usize,
}

/// Maximum number of groups of `group_size` units that can be resident on one core.
pub fn max_active_groups_per_core(
    properties: &DeviceProperties,
    footprint: &KernelFootprint,
    group_size: usize,
    dynamic_on_chip_bytes: usize,
) -> usize {
    if group_size == 0 {
        return 0;
    }

    let hardware = &properties.hardware;
    let units = group_size.next_multiple_of(hardware.plane_size.max(1));

    let limit_units = hardware.max_units_per_core / units;
    let limit_groups = hardware.max_groups_per_core;

    let limit_registers = match footprint.registers_per_unit {
        0 => usize::MAX,
        registers => {
            let per_group =
                (registers * units).next_multiple_of(hardware.register_granularity.max(1));
            hardware.registers_per_core / per_group
        }
    };

    let limit_on_chip = match footprint.static_on_chip_bytes + dynamic_on_chip_bytes {
        0 => usize::MAX,
        bytes => hardware.on_chip_bytes_per_core / bytes,
    };

    limit_units
        .min(limit_groups)
        .min(limit_registers)
        .min(limit_on_chip)
}

/// The group size with the largest number of resident units per core.
///
/// Candidates go down from the largest allowed size in steps of the plane size, and the
/// largest size wins ties.
pub fn group_size_with_maximum_occupancy(
    properties: &DeviceProperties,
    footprint: &KernelFootprint,
) -> usize {
    let hardware = &properties.hardware;
    let plane_size = hardware.plane_size.max(1);
    let max_size = hardware
        .max_units_per_group
        .min(hardware.max_units_per_core);

    let mut size = match max_size / plane_size * plane_size {
        0 => max_size,
        size => size,
    };
    let mut best_size = size;
    let mut best_occupancy = 0;

    while size > 0 {
        let occupancy = size * max_active_groups_per_core(properties, footprint, size, 0);
        if occupancy > best_occupancy {
            best_size = size;
            best_occupancy = occupancy;
        }

        if best_occupancy >= hardware.max_units_per_core || size <= plane_size {
            break;
        }
        size -= plane_size;
    }

    best_size.max(1)
}

/// On-chip bytes each group gets when the core's on-chip memory is split between the groups
/// resident at the achieved occupancy.
pub fn proportional_on_chip_allocation(
    properties: &DeviceProperties,
    footprint: &KernelFootprint,
    group_size: usize,
) -> usize {
    let hardware = &properties.hardware;
    let active = max_active_groups_per_core(properties, footprint, group_size, 0).max(1);

    (hardware.on_chip_bytes_per_core / active)
        .min(hardware.max_on_chip_bytes_per_group)
        .saturating_sub(footprint.static_on_chip_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint() -> KernelFootprint {
        KernelFootprint::new(32, 0)
    }

    #[test]
    fn limits_come_from_the_scarcest_resource() {
        let properties = DeviceProperties::default();

        assert_eq!(max_active_groups_per_core(&properties, &footprint(), 256, 0), 4);
        assert_eq!(max_active_groups_per_core(&properties, &footprint(), 32, 0), 8);
        assert_eq!(
            max_active_groups_per_core(&properties, &footprint(), 32, 49152),
            2
        );
        assert_eq!(max_active_groups_per_core(&properties, &footprint(), 0, 0), 0);
    }

    #[test]
    fn register_pressure_reduces_the_group_size() {
        let mut properties = DeviceProperties::default();
        properties.hardware.max_groups_per_core = 32;

        let light = group_size_with_maximum_occupancy(&properties, &footprint());
        let heavy = group_size_with_maximum_occupancy(&properties, &KernelFootprint::new(255, 0));

        assert_eq!(light, 256);
        assert_eq!(heavy % properties.hardware.plane_size, 0);
        assert!(
            heavy * max_active_groups_per_core(&properties, &KernelFootprint::new(255, 0), heavy, 0)
                >= 256
        );
    }

    #[test]
    fn on_chip_memory_is_split_between_resident_groups() {
        let properties = DeviceProperties::default();

        assert_eq!(
            proportional_on_chip_allocation(&properties, &footprint(), 256),
            98304 / 4
        );
        assert_eq!(
            proportional_on_chip_allocation(&properties, &KernelFootprint::new(32, 1024), 256),
            98304 / 4 - 1024
        );
    }
}
