use bulkcl_runtime::{
    group::ExecutionGroup,
    memory::{DeviceSlice, Element, RandomAccess, RandomAccessMut},
};

/// How the per-unit partial sums are scanned across the group.
#[derive(Debug, Clone)]
pub(crate) enum PartialScan<T> {
    /// Read and write the same slots, two barriers per round.
    SingleBuffer,
    /// Alternate between the slots and a second buffer of one element per unit, one barrier
    /// per round.
    PingPong(DeviceSlice<T>),
}

/// Inclusive scan of `slots[0..active)` seeded with `carry_in`, in place.
///
/// On return `slots[i] = carry_in ⊕ slots[0] ⊕ … ⊕ slots[i]` for every active slot, visible to
/// the whole group, and the carry out is the last active slot, or `carry_in` without any.
pub(crate) fn scan_partials<T, G, S, F>(
    group: &G,
    slots: &S,
    active: usize,
    carry_in: T,
    op: &F,
    strategy: &PartialScan<T>,
) -> T
where
    T: Element,
    G: ExecutionGroup,
    S: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let unit = group.this_unit().index();

    if unit == 0 && active > 0 {
        slots.write(0, op(carry_in, slots.read(0)));
    }
    group.wait();

    match strategy {
        PartialScan::SingleBuffer => single_buffer(group, slots, active, op),
        PartialScan::PingPong(pong) => ping_pong(group, slots, pong, active, op),
    }

    match active {
        0 => carry_in,
        active => slots.read(active - 1),
    }
}

fn single_buffer<T, G, S, F>(group: &G, slots: &S, active: usize, op: &F)
where
    T: Element,
    G: ExecutionGroup,
    S: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let unit = group.this_unit().index();
    let mut offset = 1;

    while offset < active {
        let combined = (unit < active && unit >= offset)
            .then(|| op(slots.read(unit - offset), slots.read(unit)));
        group.wait();

        if let Some(value) = combined {
            slots.write(unit, value);
        }
        group.wait();

        offset *= 2;
    }
}

fn ping_pong<T, G, S, F>(group: &G, slots: &S, pong: &DeviceSlice<T>, active: usize, op: &F)
where
    T: Element,
    G: ExecutionGroup,
    S: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let unit = group.this_unit().index();
    let mut in_pong = false;
    let mut offset = 1;

    while offset < active {
        if unit < active {
            match in_pong {
                false => step(slots, pong, unit, offset, op),
                true => step(pong, slots, unit, offset, op),
            }
        }
        group.wait();

        in_pong = !in_pong;
        offset *= 2;
    }

    if in_pong {
        if unit < active {
            slots.write(unit, pong.read(unit));
        }
        group.wait();
    }
}

fn step<T, S, D, F>(source: &S, destination: &D, unit: usize, offset: usize, op: &F)
where
    T: Element,
    S: RandomAccess<T>,
    D: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let value = match unit >= offset {
        true => op(source.read(unit - offset), source.read(unit)),
        false => source.read(unit),
    };
    destination.write(unit, value);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bulkcl_runtime::{
        client::AcceleratorClient,
        config::GlobalConfig,
        device::DeviceProperties,
        group::{StaticGroup, StaticShape},
        launch::{LaunchConfig, make_closure},
        memory::{free, malloc},
    };

    use super::*;

    fn scan_slots(ping_pong: bool, active: usize) -> (Vec<u32>, u32) {
        let mut properties = DeviceProperties::default();
        properties.hardware.num_cores = 1;
        let client = AcceleratorClient::with_config(
            Arc::new(properties),
            Arc::new(GlobalConfig::default()),
        );
        let output = client.empty::<u32>(9);

        let closure = make_closure(
            move |group: &StaticGroup<8, 1>, output: DeviceSlice<u32>| {
                let unit = group.this_unit().index();
                let slots = malloc(group, 8 * size_of::<u32>()).unwrap();
                let pong = malloc(group, 8 * size_of::<u32>()).unwrap();
                let strategy = match ping_pong {
                    true => PartialScan::PingPong(pong.view::<u32>()),
                    false => PartialScan::SingleBuffer,
                };

                let view = slots.view::<u32>();
                view.write(unit, unit as u32 + 1);
                group.wait();

                let carry = scan_partials(group, &view, active, 100, &|a, b| a + b, &strategy);

                output.write(unit, view.read(unit));
                if unit == 0 {
                    output.write(8, carry);
                }

                free(group, pong);
                free(group, slots);
            },
            (output.clone(),),
        );

        client
            .launch(LaunchConfig::con(StaticShape::<8, 1>), closure)
            .unwrap()
            .join()
            .unwrap();

        let mut values = output.to_vec();
        let carry = values.pop().unwrap();
        (values, carry)
    }

    #[test_log::test]
    fn strategies_agree_on_every_active_count() {
        for active in 0..=8 {
            let single = scan_slots(false, active);
            let ping_pong = scan_slots(true, active);

            let mut expected = (1..=8u32).collect::<Vec<_>>();
            let mut running = 100;
            for slot in expected.iter_mut().take(active) {
                running += *slot;
                *slot = running;
            }

            assert_eq!(single, (expected.clone(), running), "single buffer, {active} active");
            assert_eq!(ping_pong, (expected, running), "ping-pong, {active} active");
        }
    }
}
