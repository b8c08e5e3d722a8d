use core::sync::atomic::{AtomicU8, Ordering};

use bytemuck::Pod;

use crate::StorageId;

/// A value that can live in device memory.
///
/// Any plain-old-data type qualifies; the group algorithms only move values around and apply
/// user operators to them.
pub trait Element: Pod + Send + Sync {}

impl<T: Pod + Send + Sync> Element for T {}

/// The memory region a storage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Fast memory private to one execution group.
    OnChip,
    /// Device memory visible to every group and to the host.
    OffChip,
}

/// A byte arena shared between the units of a group, or between groups and the host.
///
/// Bytes are atomics accessed with relaxed ordering: concurrent accesses are never undefined
/// behavior, and group barriers provide the ordering between units.
pub struct Storage {
    id: StorageId,
    region: MemoryRegion,
    bytes: Box<[AtomicU8]>,
}

impl Storage {
    /// Create a zeroed storage of `size` bytes in the given region.
    pub fn new(region: MemoryRegion, size: usize) -> Self {
        Self {
            id: StorageId::new(),
            region,
            bytes: (0..size).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// The storage id.
    pub fn id(&self) -> StorageId {
        self.id
    }

    /// The region the storage belongs to.
    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the storage holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Load a value starting at the given byte offset.
    pub fn load<T: Pod>(&self, offset: usize) -> T {
        let mut value = T::zeroed();
        let destination = bytemuck::bytes_of_mut(&mut value);
        let source = &self.bytes[offset..offset + destination.len()];

        for (byte, cell) in destination.iter_mut().zip(source) {
            *byte = cell.load(Ordering::Relaxed);
        }

        value
    }

    /// Store a value starting at the given byte offset.
    pub fn store<T: Pod>(&self, offset: usize, value: T) {
        let source = bytemuck::bytes_of(&value);
        let destination = &self.bytes[offset..offset + source.len()];

        for (cell, byte) in destination.iter().zip(source) {
            cell.store(*byte, Ordering::Relaxed);
        }
    }
}

impl core::fmt::Debug for Storage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Storage")
            .field("id", &self.id)
            .field("region", &self.region)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_back_stored_values() {
        let storage = Storage::new(MemoryRegion::OnChip, 16);

        storage.store(0, 0xdead_beef_u32);
        storage.store(4, -2.5f32);
        storage.store(8, u64::MAX);

        assert_eq!(storage.load::<u32>(0), 0xdead_beef);
        assert_eq!(storage.load::<f32>(4), -2.5);
        assert_eq!(storage.load::<u64>(8), u64::MAX);
        assert_eq!(storage.region(), MemoryRegion::OnChip);
    }

    #[test]
    #[should_panic]
    fn load_out_of_bounds_panics() {
        let storage = Storage::new(MemoryRegion::OffChip, 3);
        storage.load::<u32>(0);
    }
}
