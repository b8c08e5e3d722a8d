use core::{marker::PhantomData, ops::RangeBounds};
use std::sync::Arc;

use super::{Element, MemoryRegion, Storage};

/// A typed, contiguous view into a [storage](Storage).
///
/// Reads and writes go through `&self`: the storage is shared by every unit holding a view,
/// and group barriers order the accesses between units.
pub struct DeviceSlice<T> {
    storage: Arc<Storage>,
    byte_offset: usize,
    len: usize,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> DeviceSlice<T> {
    /// Create a view of `len` elements starting at `byte_offset` in the storage.
    ///
    /// # Panics
    ///
    /// If the view doesn't fit in the storage.
    pub fn new(storage: Arc<Storage>, byte_offset: usize, len: usize) -> Self {
        let end = byte_offset + len * size_of::<T>();
        assert!(
            end <= storage.len(),
            "View of {len} elements at byte {byte_offset} doesn't fit in {} bytes",
            storage.len()
        );

        Self {
            storage,
            byte_offset,
            len,
            _element: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The memory region of the underlying storage.
    pub fn region(&self) -> MemoryRegion {
        self.storage.region()
    }

    /// Whether the view lives in on-chip memory.
    pub fn is_on_chip(&self) -> bool {
        self.region() == MemoryRegion::OnChip
    }

    /// Whether the view lives in off-chip memory.
    pub fn is_off_chip(&self) -> bool {
        self.region() == MemoryRegion::OffChip
    }

    /// The underlying storage.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Byte offset of the first element in the storage.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Element offset of the first element from the start of the storage, rounded down.
    pub fn position(&self) -> usize {
        self.byte_offset.checked_div(size_of::<T>()).unwrap_or(0)
    }

    /// Read the element at `index`.
    pub fn read(&self, index: usize) -> T {
        assert!(
            index < self.len,
            "Index {index} out of bounds for a slice of {} elements",
            self.len
        );
        self.storage
            .load(self.byte_offset + index * size_of::<T>())
    }

    /// Write the element at `index`.
    pub fn write(&self, index: usize, value: T) {
        assert!(
            index < self.len,
            "Index {index} out of bounds for a slice of {} elements",
            self.len
        );
        self.storage
            .store(self.byte_offset + index * size_of::<T>(), value)
    }

    /// The view starting `n` elements further.
    pub fn advance(&self, n: usize) -> Self {
        assert!(
            n <= self.len,
            "Can't advance by {n} elements a slice of {} elements",
            self.len
        );

        Self {
            storage: self.storage.clone(),
            byte_offset: self.byte_offset + n * size_of::<T>(),
            len: self.len - n,
            _element: PhantomData,
        }
    }

    /// A sub view of the given element range.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let start = match range.start_bound() {
            core::ops::Bound::Included(start) => *start,
            core::ops::Bound::Excluded(start) => start + 1,
            core::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            core::ops::Bound::Included(end) => end + 1,
            core::ops::Bound::Excluded(end) => *end,
            core::ops::Bound::Unbounded => self.len,
        };
        assert!(
            start <= end && end <= self.len,
            "Range {start}..{end} out of bounds for a slice of {} elements",
            self.len
        );

        let mut view = self.advance(start);
        view.len = end - start;
        view
    }

    /// A view reading every `stride`-th element, starting with the first.
    pub fn strided(&self, stride: usize) -> StridedSlice<T> {
        StridedSlice::new(self.clone(), stride)
    }

    /// Write the host values at the start of the view.
    pub fn copy_from_slice(&self, values: &[T]) {
        assert!(
            values.len() <= self.len,
            "Can't write {} values in a slice of {} elements",
            values.len(),
            self.len
        );
        for (index, value) in values.iter().enumerate() {
            self.write(index, *value);
        }
    }

    /// Read every element back to the host.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len).map(|index| self.read(index)).collect()
    }
}

impl<T> Clone for DeviceSlice<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            byte_offset: self.byte_offset,
            len: self.len,
            _element: PhantomData,
        }
    }
}

impl<T> PartialEq for DeviceSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
            && self.byte_offset == other.byte_offset
            && self.len == other.len
    }
}

impl<T> Eq for DeviceSlice<T> {}

impl<T> core::fmt::Debug for DeviceSlice<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceSlice")
            .field("storage", &self.storage.id())
            .field("region", &self.storage.region())
            .field("byte_offset", &self.byte_offset)
            .field("len", &self.len)
            .finish()
    }
}

/// A non-contiguous view reading every `stride`-th element of a [device slice](DeviceSlice).
pub struct StridedSlice<T> {
    base: DeviceSlice<T>,
    start: usize,
    stride: usize,
    len: usize,
}

impl<T: Element> StridedSlice<T> {
    /// Create a strided view over the base slice.
    ///
    /// # Panics
    ///
    /// If the stride is zero.
    pub fn new(base: DeviceSlice<T>, stride: usize) -> Self {
        assert!(stride > 0, "A strided slice needs a stride of at least one");
        let len = base.len().div_ceil(stride);

        Self {
            base,
            start: 0,
            stride,
            len,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The distance, in elements of the base slice, between two elements of the view.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The memory region of the base slice.
    pub fn region(&self) -> MemoryRegion {
        self.base.region()
    }

    /// Read the element at `index`.
    pub fn read(&self, index: usize) -> T {
        assert!(
            index < self.len,
            "Index {index} out of bounds for a strided slice of {} elements",
            self.len
        );
        self.base.read(self.start + index * self.stride)
    }

    /// Write the element at `index`.
    pub fn write(&self, index: usize, value: T) {
        assert!(
            index < self.len,
            "Index {index} out of bounds for a strided slice of {} elements",
            self.len
        );
        self.base.write(self.start + index * self.stride, value)
    }

    /// The view starting `n` elements further.
    pub fn advance(&self, n: usize) -> Self {
        assert!(
            n <= self.len,
            "Can't advance by {n} elements a strided slice of {} elements",
            self.len
        );

        Self {
            base: self.base.clone(),
            start: self.start + n * self.stride,
            stride: self.stride,
            len: self.len - n,
        }
    }
}

impl<T> Clone for StridedSlice<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            start: self.start,
            stride: self.stride,
            len: self.len,
        }
    }
}

impl<T> core::fmt::Debug for StridedSlice<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StridedSlice")
            .field("base", &self.base)
            .field("start", &self.start)
            .field("stride", &self.stride)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn off_chip<T: Element>(values: &[T]) -> DeviceSlice<T> {
        let storage = Arc::new(Storage::new(
            MemoryRegion::OffChip,
            values.len() * size_of::<T>(),
        ));
        let slice = DeviceSlice::new(storage, 0, values.len());
        slice.copy_from_slice(values);
        slice
    }

    #[test]
    fn advance_moves_the_view() {
        let slice = off_chip(&[1u32, 2, 3, 4, 5]);
        let advanced = slice.advance(2);

        assert_eq!(advanced.len(), 3);
        assert_eq!(advanced.position(), 2);
        assert_eq!(advanced.to_vec(), vec![3, 4, 5]);
        assert_eq!(slice.advance(0), slice);
        assert!(slice.advance(5).is_empty());
    }

    #[test]
    fn slice_selects_a_range() {
        let slice = off_chip(&[10u16, 11, 12, 13, 14, 15]);

        assert_eq!(slice.slice(1..4).to_vec(), vec![11, 12, 13]);
        assert_eq!(slice.slice(..=1).to_vec(), vec![10, 11]);
        assert_eq!(slice.slice(4..).to_vec(), vec![14, 15]);
    }

    #[test]
    fn writes_are_visible_through_every_view() {
        let slice = off_chip(&[0i64; 4]);
        let tail = slice.advance(2);

        tail.write(1, -7);

        assert_eq!(slice.read(3), -7);
        assert!(slice.is_off_chip());
    }

    #[test]
    fn strided_reads_every_nth_element() {
        let slice = off_chip(&[0u32, 1, 2, 3, 4, 5, 6]);
        let strided = slice.strided(3);

        assert_eq!(strided.len(), 3);
        assert_eq!(strided.read(2), 6);
        assert_eq!(strided.advance(1).read(0), 3);
    }

    #[test]
    #[should_panic]
    fn advance_past_the_end_panics() {
        off_chip(&[1u8, 2]).advance(3);
    }
}
