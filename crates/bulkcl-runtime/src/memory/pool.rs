use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bulkcl_common::backtrace::BackTrace;

use crate::error::AllocError;

/// Accounts for the off-chip memory that groups allocate when their on-chip budget is exhausted.
#[derive(Debug)]
pub struct OffChipPool {
    capacity: usize,
    in_use: AtomicUsize,
}

/// A reservation against an [off-chip pool](OffChipPool), released on drop.
#[derive(Debug)]
pub struct OffChipLease {
    pool: Arc<OffChipPool>,
    size: usize,
}

impl OffChipPool {
    /// Create a pool able to hold `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: AtomicUsize::new(0),
        }
    }

    /// Total bytes the pool can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently reserved.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Bytes still available.
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.in_use())
    }

    /// Reserve `size` bytes.
    pub fn reserve(self: &Arc<Self>, size: usize) -> Result<OffChipLease, AllocError> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |in_use| {
                in_use
                    .checked_add(size)
                    .filter(|total| *total <= self.capacity)
            })
            .map_err(|in_use| AllocError::OutOfMemory {
                requested: size,
                available: self.capacity.saturating_sub(in_use),
                backtrace: BackTrace::capture(),
            })?;

        Ok(OffChipLease {
            pool: self.clone(),
            size,
        })
    }
}

impl OffChipLease {
    /// Bytes held by the lease.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for OffChipLease {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(self.size, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leases_are_released_on_drop() {
        let pool = Arc::new(OffChipPool::new(100));

        let first = pool.reserve(60).unwrap();
        assert_eq!(pool.available(), 40);
        assert!(pool.reserve(41).is_err());

        drop(first);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.reserve(100).unwrap().size(), 100);
    }

    #[test]
    fn exhaustion_reports_available_bytes() {
        let pool = Arc::new(OffChipPool::new(10));
        let _lease = pool.reserve(8).unwrap();

        match pool.reserve(4) {
            Err(AllocError::OutOfMemory {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 2);
            }
            Ok(_) => panic!("The pool should be exhausted"),
        }
    }
}
