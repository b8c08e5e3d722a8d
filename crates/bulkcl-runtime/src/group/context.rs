use std::sync::Arc;

use super::{ExecutionGroupDescriptor, GroupBarrier};
use crate::{
    device::Capabilities,
    error::AllocError,
    memory::{Allocation, GroupHeap, OffChipPool},
};

/// State shared by the units of one group: its barrier and its memory.
#[derive(Debug)]
pub struct GroupContext {
    descriptor: ExecutionGroupDescriptor,
    group_index: usize,
    num_groups: usize,
    capabilities: Capabilities,
    barrier: GroupBarrier,
    heap: spin::Mutex<GroupHeap>,
    broadcast: spin::Mutex<Option<Result<Allocation, AllocError>>>,
}

impl GroupContext {
    /// Create the context of group `group_index` out of `num_groups`.
    pub fn new(
        descriptor: ExecutionGroupDescriptor,
        group_index: usize,
        num_groups: usize,
        capabilities: Capabilities,
        off_chip: Arc<OffChipPool>,
    ) -> Self {
        Self {
            descriptor,
            group_index,
            num_groups,
            capabilities,
            barrier: GroupBarrier::new(descriptor.unit_count),
            heap: spin::Mutex::new(GroupHeap::new(descriptor.on_chip_budget, off_chip)),
            broadcast: spin::Mutex::new(None),
        }
    }

    /// The resolved shape of the group.
    pub fn descriptor(&self) -> &ExecutionGroupDescriptor {
        &self.descriptor
    }

    /// Index of the group in its launch.
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    /// Number of groups in the launch.
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// The capabilities of the device running the group.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The group barrier.
    pub fn barrier(&self) -> &GroupBarrier {
        &self.barrier
    }

    /// The group allocator.
    pub fn heap(&self) -> &spin::Mutex<GroupHeap> {
        &self.heap
    }

    pub(crate) fn broadcast(&self) -> &spin::Mutex<Option<Result<Allocation, AllocError>>> {
        &self.broadcast
    }
}
