use std::sync::Arc;

use super::{CooperativeGroup, ExecutionGroup, GroupContext, ThisUnit};
use crate::{device::Capabilities, memory::Element};

/// A group of `SIZE` units processing `GRAIN` elements each, both known at compile time.
#[derive(new, Clone, Debug)]
pub struct StaticGroup<const SIZE: usize, const GRAIN: usize> {
    context: Arc<GroupContext>,
    unit: usize,
}

impl<const SIZE: usize, const GRAIN: usize> StaticGroup<SIZE, GRAIN> {
    /// Number of elements processed by the whole group at once.
    pub const TILE_SIZE: usize = SIZE * GRAIN;
}

impl<const SIZE: usize, const GRAIN: usize> ExecutionGroup for StaticGroup<SIZE, GRAIN> {
    fn size(&self) -> usize {
        SIZE
    }

    fn grain(&self) -> usize {
        GRAIN
    }

    fn this_unit(&self) -> ThisUnit {
        ThisUnit::new(self.unit)
    }

    fn wait(&self) {
        self.context.barrier().wait()
    }

    fn is_static(&self) -> bool {
        true
    }

    fn capabilities(&self) -> Capabilities {
        self.context.capabilities()
    }

    fn stage_through_registers<T, L, S>(&self, count: usize, mut load: L, mut store: S)
    where
        T: Element,
        L: FnMut(usize) -> T,
        S: FnMut(usize, T),
    {
        debug_assert!(count <= GRAIN, "{count} elements exceed a grain of {GRAIN}");

        let mut registers = [<T as bytemuck::Zeroable>::zeroed(); GRAIN];
        for (index, register) in registers.iter_mut().enumerate().take(count) {
            *register = load(index);
        }
        for (index, register) in registers.into_iter().enumerate().take(count) {
            store(index, register);
        }
    }
}

impl<const SIZE: usize, const GRAIN: usize> CooperativeGroup for StaticGroup<SIZE, GRAIN> {
    fn context(&self) -> &GroupContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{group::ExecutionGroupDescriptor, memory::OffChipPool};
    use core::cell::RefCell;

    #[test]
    fn staging_loads_the_whole_grain_before_storing() {
        let context = GroupContext::new(
            ExecutionGroupDescriptor::new(2, 4, 0),
            0,
            1,
            Capabilities::default(),
            Arc::new(OffChipPool::new(0)),
        );
        let group = StaticGroup::<2, 4>::new(Arc::new(context), 1);
        let events = RefCell::new(Vec::new());

        group.stage_through_registers(
            3,
            |index| {
                events.borrow_mut().push(format!("load {index}"));
                index as u32 * 10
            },
            |index, value: u32| events.borrow_mut().push(format!("store {index}={value}")),
        );

        assert_eq!(
            events.into_inner(),
            ["load 0", "load 1", "load 2", "store 0=0", "store 1=10", "store 2=20"]
        );
    }
}
