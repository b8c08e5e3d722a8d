use bulkcl_runtime::{
    error::AllocError,
    group::{ExecutionGroup, StaticGroup},
    memory::{Allocation, Element, RandomAccess, RandomAccessMut, free, malloc},
};

use super::{
    GroupScan, ScanMode,
    partial::PartialScan,
    tile::scan_tile,
};
use crate::copy_n;

/// Scan of any length, tile by tile, with the carry of each tile seeding the next.
impl<const SIZE: usize, const GRAIN: usize> GroupScan for StaticGroup<SIZE, GRAIN> {
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
        let n = input.len();
        if n == 0 {
            return Ok(init);
        }

        let tile_size = Self::TILE_SIZE;
        let stage = malloc(self, tile_size * size_of::<T>())?;
        let (strategy, pong) = partial_strategy(self, &stage);
        let tile = stage.view::<T>();

        if matches!(strategy, PartialScan::SingleBuffer) && self.this_unit().index() == 0 {
            log::debug!("Scanning the partial sums of {SIZE} units in a single buffer");
        }

        let mut carry = init;
        let mut base = 0;

        while base < n {
            let count = tile_size.min(n - base);

            copy_n(self, &input.advance(base), count, &tile);
            carry = scan_tile(self, mode, &tile, &tile, count, carry, &op, &strategy);
            copy_n(self, &tile, count, &output.advance(base));

            base += count;
        }

        if let Some(pong) = pong {
            free(self, pong);
        }
        free(self, stage);

        Ok(carry)
    }
}

/// Ping-pong partial scans need the staging tile and a second buffer of one element per unit,
/// both on-chip; otherwise the partial sums are scanned in a single buffer.
fn partial_strategy<const SIZE: usize, const GRAIN: usize, T: Element>(
    group: &StaticGroup<SIZE, GRAIN>,
    stage: &Allocation,
) -> (PartialScan<T>, Option<Allocation>) {
    if !stage.is_on_chip() {
        return (PartialScan::SingleBuffer, None);
    }

    match malloc(group, SIZE * size_of::<T>()) {
        Ok(pong) if pong.is_on_chip() => (PartialScan::PingPong(pong.view::<T>()), Some(pong)),
        Ok(pong) => {
            free(group, pong);
            (PartialScan::SingleBuffer, None)
        }
        Err(_) => (PartialScan::SingleBuffer, None),
    }
}
