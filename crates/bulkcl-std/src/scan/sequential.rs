use bulkcl_runtime::{
    error::AllocError,
    group::{Bounded, ThisUnit},
    memory::{Element, RandomAccess, RandomAccessMut},
};

use super::{GroupScan, ScanMode};

/// Scan made by the calling unit alone.
impl<const B: usize> GroupScan for Bounded<'_, B, ThisUnit> {
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
        self.check(n);

        Ok(sequential_scan::<B, _, _, _, _>(mode, input, output, n, init, &op))
    }
}

/// Scan the first `n` elements, at most `B`, returning the carry.
pub(crate) fn sequential_scan<const B: usize, T, I, O, F>(
    mode: ScanMode,
    input: &I,
    output: &O,
    n: usize,
    init: T,
    op: &F,
) -> T
where
    T: Element,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    let mut carry = init;

    for index in 0..B {
        if index < n {
            let value = input.read(index);
            match mode {
                ScanMode::Inclusive => {
                    carry = op(carry, value);
                    output.write(index, carry);
                }
                ScanMode::Exclusive => {
                    output.write(index, carry);
                    carry = op(carry, value);
                }
            }
        }
    }

    carry
}
