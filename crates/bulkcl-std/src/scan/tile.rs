use bulkcl_runtime::{
    error::AllocError,
    group::{Bounded, ExecutionGroup, StaticGroup, bound},
    memory::{Element, RandomAccess, RandomAccessMut},
};

use super::{
    GroupScan, ScanMode,
    partial::{PartialScan, scan_partials},
    sequential::sequential_scan,
};
use crate::copy_n_to_registers;

/// Scan of at most `B` elements in a single tile, without allocating.
impl<const B: usize, const SIZE: usize, const GRAIN: usize> GroupScan
    for Bounded<'_, B, StaticGroup<SIZE, GRAIN>>
{
    fn scan<T, I, O, F>(
        &self,
        mode: ScanMode,
        input: &I,
        output: &O,
        init: T,
        op: F,
    ) -> Result<T, AllocError>
    where
        T: Element,
        I: RandomAccess<T>,
        O: RandomAccessMut<T>,
        F: Fn(T, T) -> T,
    {
        const {
            assert!(
                B <= SIZE * GRAIN,
                "The bound of a single tile scan can't exceed the group size times its grain"
            )
        };

        let n = input.len();
        self.check(n);

        if n == 0 {
            return Ok(init);
        }

        Ok(scan_tile(
            self.group(),
            mode,
            input,
            output,
            n,
            init,
            &op,
            &PartialScan::SingleBuffer,
        ))
    }
}

/// Scan the first `n` elements, at most one tile, of `input` into `output`.
///
/// Every unit loads its `GRAIN` consecutive elements into registers and folds them into a
/// partial sum; the partial sums are scanned in `output[0..active)`, where `active` is the
/// number of units with a non-empty grain; every unit then scans its registers seeded with
/// the combination of the carry and the partial sums of the units before it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn scan_tile<const SIZE: usize, const GRAIN: usize, T, I, O, F>(
    group: &StaticGroup<SIZE, GRAIN>,
    mode: ScanMode,
    input: &I,
    output: &O,
    n: usize,
    carry_in: T,
    op: &F,
    strategy: &PartialScan<T>,
) -> T
where
    T: Element,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let unit = group.this_unit();
    let offset = unit.index() * GRAIN;
    let local_size = n.saturating_sub(offset).min(GRAIN);

    let mut local = [<T as bytemuck::Zeroable>::zeroed(); GRAIN];
    if local_size > 0 {
        copy_n_to_registers(
            &bound::<GRAIN, _>(&unit),
            &input.advance(offset),
            local_size,
            &mut local,
        );
    }

    let partial = local[..local_size]
        .iter()
        .copied()
        .reduce(|accumulated, value| op(accumulated, value));

    // The output may be the input: every unit must have loaded its grain first.
    group.wait();

    if let Some(partial) = partial {
        output.write(unit.index(), partial);
    }
    group.wait();

    let active = n.div_ceil(GRAIN);
    let carry_out = scan_partials(group, output, active, carry_in, op, strategy);

    let seed = match unit.index() {
        0 => carry_in,
        index if local_size > 0 => output.read(index - 1),
        _ => carry_in,
    };
    group.wait();

    if local_size > 0 {
        let registers: &[T] = &local;
        sequential_scan::<GRAIN, _, _, _, _>(
            mode,
            &registers,
            &output.advance(offset),
            local_size,
            seed,
            op,
        );
    }
    group.wait();

    carry_out
}
