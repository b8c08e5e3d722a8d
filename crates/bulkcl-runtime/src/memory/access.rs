use super::{DeviceSlice, Element, MemoryRegion, StridedSlice};

/// Random access to a sequence of elements, the input side of the group algorithms.
pub trait RandomAccess<T: Element>: Clone + Send + Sync {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Read the element at `index`.
    fn read(&self, index: usize) -> T;

    /// The sequence starting `n` elements further.
    fn advance(&self, n: usize) -> Self;

    /// The contiguous device slice backing this sequence, if any.
    fn as_contiguous(&self) -> Option<&DeviceSlice<T>> {
        None
    }

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Random access with writes, the output side of the group algorithms.
pub trait RandomAccessMut<T: Element>: RandomAccess<T> {
    /// Write the element at `index`.
    fn write(&self, index: usize, value: T);
}

/// Anything whose memory region can be classified.
pub trait MemoryLocation {
    /// The region, or `None` for host memory.
    fn memory_region(&self) -> Option<MemoryRegion>;
}

/// Whether the location is in on-chip memory.
pub fn is_on_chip(location: &impl MemoryLocation) -> bool {
    location.memory_region() == Some(MemoryRegion::OnChip)
}

/// Whether the location is in off-chip memory.
pub fn is_off_chip(location: &impl MemoryLocation) -> bool {
    location.memory_region() == Some(MemoryRegion::OffChip)
}

impl<T: Element> RandomAccess<T> for &[T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn read(&self, index: usize) -> T {
        self[index]
    }

    fn advance(&self, n: usize) -> Self {
        let slice: Self = *self;
        &slice[n..]
    }
}

impl<T: Element> MemoryLocation for &[T] {
    fn memory_region(&self) -> Option<MemoryRegion> {
        None
    }
}

impl<T: Element> RandomAccess<T> for DeviceSlice<T> {
    fn len(&self) -> usize {
        DeviceSlice::len(self)
    }

    fn read(&self, index: usize) -> T {
        DeviceSlice::read(self, index)
    }

    fn advance(&self, n: usize) -> Self {
        DeviceSlice::advance(self, n)
    }

    fn as_contiguous(&self) -> Option<&DeviceSlice<T>> {
        Some(self)
    }
}

impl<T: Element> RandomAccessMut<T> for DeviceSlice<T> {
    fn write(&self, index: usize, value: T) {
        DeviceSlice::write(self, index, value)
    }
}

impl<T: Element> MemoryLocation for DeviceSlice<T> {
    fn memory_region(&self) -> Option<MemoryRegion> {
        Some(self.region())
    }
}

impl<T: Element> RandomAccess<T> for StridedSlice<T> {
    fn len(&self) -> usize {
        StridedSlice::len(self)
    }

    fn read(&self, index: usize) -> T {
        StridedSlice::read(self, index)
    }

    fn advance(&self, n: usize) -> Self {
        StridedSlice::advance(self, n)
    }
}

impl<T: Element> RandomAccessMut<T> for StridedSlice<T> {
    fn write(&self, index: usize, value: T) {
        StridedSlice::write(self, index, value)
    }
}

impl<T: Element> MemoryLocation for StridedSlice<T> {
    fn memory_region(&self) -> Option<MemoryRegion> {
        Some(self.region())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::Storage;

    #[test]
    fn host_slices_are_neither_on_nor_off_chip() {
        let values = [1u32, 2, 3];
        let host: &[u32] = &values;

        assert!(!is_on_chip(&host));
        assert!(!is_off_chip(&host));
        assert_eq!(RandomAccess::advance(&host, 1).read(0), 2);
    }

    #[test]
    fn device_slices_report_their_region() {
        let storage = Arc::new(Storage::new(MemoryRegion::OnChip, 64));
        let slice = DeviceSlice::<u32>::new(storage, 0, 16);

        assert!(is_on_chip(&slice));
        assert!(is_on_chip(&slice.strided(2)));
        assert!(slice.as_contiguous().is_some());
        assert!(RandomAccess::as_contiguous(&slice.strided(2)).is_none());
    }
}
