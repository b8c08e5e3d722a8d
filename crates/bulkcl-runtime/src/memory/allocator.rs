use std::sync::Arc;

use super::{DeviceSlice, Element, MemoryLocation, MemoryRegion, OffChipLease, OffChipPool, Storage};
use crate::{AllocationId, error::AllocError, group::CooperativeGroup};

/// Alignment of every on-chip allocation, in bytes.
pub const ON_CHIP_ALIGNMENT: usize = 16;

/// Memory allocated collectively by a group.
///
/// Every unit holds its own clone of the handle; the memory stays valid until the group calls
/// [free] on it or finishes.
#[derive(Clone, Debug)]
pub struct Allocation {
    id: AllocationId,
    storage: Arc<Storage>,
    offset: usize,
    size: usize,
}

impl Allocation {
    /// The allocation id.
    pub fn id(&self) -> AllocationId {
        self.id
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The region the allocation was served from.
    pub fn region(&self) -> MemoryRegion {
        self.storage.region()
    }

    /// Whether the allocation was served from on-chip memory.
    pub fn is_on_chip(&self) -> bool {
        self.region() == MemoryRegion::OnChip
    }

    /// A typed view over the whole allocation.
    pub fn view<T: Element>(&self) -> DeviceSlice<T> {
        let len = self.size.checked_div(size_of::<T>()).unwrap_or(0);
        DeviceSlice::new(self.storage.clone(), self.offset, len)
    }
}

impl MemoryLocation for Allocation {
    fn memory_region(&self) -> Option<MemoryRegion> {
        Some(self.region())
    }
}

#[derive(Debug)]
struct HeapEntry {
    id: AllocationId,
    offset: usize,
    size: usize,
    freed: bool,
}

/// Per-group allocator: a bump stack over the on-chip arena with an off-chip fallback.
///
/// On-chip memory is reclaimed in LIFO order. Freeing an allocation that is not on top of the
/// stack only marks it; its bytes are reclaimed once everything above it is freed.
#[derive(Debug)]
pub struct GroupHeap {
    arena: Arc<Storage>,
    pool: Arc<OffChipPool>,
    top: usize,
    entries: Vec<HeapEntry>,
    off_chip: Vec<(AllocationId, OffChipLease)>,
}

impl GroupHeap {
    /// Create a heap with an on-chip arena of `budget` bytes.
    pub fn new(budget: usize, pool: Arc<OffChipPool>) -> Self {
        Self {
            arena: Arc::new(Storage::new(MemoryRegion::OnChip, budget)),
            pool,
            top: 0,
            entries: Vec::new(),
            off_chip: Vec::new(),
        }
    }

    /// Bytes still free at the top of the on-chip arena.
    pub fn on_chip_available(&self) -> usize {
        self.arena
            .len()
            .saturating_sub(self.top.next_multiple_of(ON_CHIP_ALIGNMENT))
    }

    /// Number of live allocations, on-chip and off-chip.
    pub fn live(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.freed).count() + self.off_chip.len()
    }

    /// Allocate `size` bytes, on-chip when they fit.
    pub fn allocate(&mut self, size: usize) -> Result<Allocation, AllocError> {
        let id = AllocationId::new();
        let offset = self.top.next_multiple_of(ON_CHIP_ALIGNMENT);

        if offset + size <= self.arena.len() {
            self.top = offset + size;
            self.entries.push(HeapEntry {
                id,
                offset,
                size,
                freed: false,
            });

            return Ok(Allocation {
                id,
                storage: self.arena.clone(),
                offset,
                size,
            });
        }

        log::debug!(
            "{size} bytes don't fit in the {} remaining on-chip bytes, falling back to off-chip memory",
            self.on_chip_available()
        );
        let lease = self.pool.reserve(size)?;
        self.off_chip.push((id, lease));

        Ok(Allocation {
            id,
            storage: Arc::new(Storage::new(MemoryRegion::OffChip, size)),
            offset: 0,
            size,
        })
    }

    /// Release an allocation.
    pub fn release(&mut self, allocation: &Allocation) {
        if !allocation.is_on_chip() {
            match self
                .off_chip
                .iter()
                .position(|(id, _)| *id == allocation.id)
            {
                Some(index) => {
                    self.off_chip.swap_remove(index);
                }
                None => log::warn!("{} released twice or by another group", allocation.id),
            }
            return;
        }

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.id == allocation.id && !entry.freed)
        {
            Some(entry) => entry.freed = true,
            None => {
                log::warn!("{} released twice or by another group", allocation.id);
                return;
            }
        }

        while self.entries.last().is_some_and(|entry| entry.freed) {
            self.entries.pop();
        }
        self.top = self
            .entries
            .last()
            .map(|entry| entry.offset + entry.size)
            .unwrap_or(0);
    }
}

impl Drop for GroupHeap {
    fn drop(&mut self) {
        let live = self.live();
        if live > 0 {
            log::warn!("{live} group allocation(s) were never freed and are reclaimed at group exit");
        }
    }
}

/// Collectively allocate `size` bytes for the group.
///
/// Every unit of the group must call this function; they all receive the same allocation, or
/// the same error. The group's on-chip arena is used when the request fits, otherwise the
/// memory comes from the off-chip pool.
pub fn malloc<G: CooperativeGroup>(group: &G, size: usize) -> Result<Allocation, AllocError> {
    let context = group.context();

    group.wait();
    if group.this_unit().index() == 0 {
        let allocation = context.heap().lock().allocate(size);
        *context.broadcast().lock() = Some(allocation);
    }
    group.wait();

    context
        .broadcast()
        .lock()
        .clone()
        .expect("The first unit publishes the allocation before the barrier")
}

/// Collectively free an allocation made with [malloc].
pub fn free<G: CooperativeGroup>(group: &G, allocation: Allocation) {
    group.wait();
    if group.this_unit().index() == 0 {
        group.context().heap().lock().release(&allocation);
    }
    group.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(budget: usize, capacity: usize) -> GroupHeap {
        GroupHeap::new(budget, Arc::new(OffChipPool::new(capacity)))
    }

    #[test]
    fn allocations_are_aligned_and_stacked() {
        let mut heap = heap(128, 0);

        let first = heap.allocate(10).unwrap();
        let second = heap.allocate(20).unwrap();

        assert!(first.is_on_chip());
        assert_eq!(second.offset, 16);
        assert_eq!(heap.on_chip_available(), 128 - 48);
    }

    #[test]
    fn lifo_release_reuses_memory() {
        let mut heap = heap(64, 0);

        let first = heap.allocate(32).unwrap();
        let second = heap.allocate(32).unwrap();

        heap.release(&first);
        assert_eq!(heap.on_chip_available(), 0);

        heap.release(&second);
        assert_eq!(heap.on_chip_available(), 64);
        assert_eq!(heap.live(), 0);

        let third = heap.allocate(64).unwrap();
        assert_eq!(third.offset, 0);
    }

    #[test]
    fn falls_back_to_off_chip_memory() {
        let pool = Arc::new(OffChipPool::new(256));
        let mut heap = GroupHeap::new(32, pool.clone());

        let allocation = heap.allocate(100).unwrap();

        assert!(!allocation.is_on_chip());
        assert_eq!(pool.in_use(), 100);
        assert_eq!(allocation.view::<u32>().len(), 25);

        heap.release(&allocation);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn exhausted_pool_is_an_error() {
        let mut heap = heap(0, 8);

        assert!(matches!(
            heap.allocate(16),
            Err(AllocError::OutOfMemory { requested: 16, .. })
        ));
    }

    #[test]
    fn dropping_the_heap_releases_off_chip_leases() {
        let pool = Arc::new(OffChipPool::new(64));
        let mut heap = GroupHeap::new(0, pool.clone());

        let _leaked = heap.allocate(64).unwrap();
        drop(heap);

        assert_eq!(pool.in_use(), 0);
    }
}
