use bulkcl_runtime::{
    error::AllocError,
    group::ExecutionGroup,
    memory::{Element, RandomAccess, RandomAccessMut},
};

/// Whether the element at position `i` is part of its own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// `output[i] = init ⊕ input[0] ⊕ … ⊕ input[i]`.
    Inclusive,
    /// `output[i] = init ⊕ input[0] ⊕ … ⊕ input[i - 1]`, and `output[0] = init`.
    Exclusive,
}

/// A group able to scan its input cooperatively.
///
/// Implemented by static groups (any length, processed tile by tile), bounded static groups
/// (a single tile, no allocation) and bounded units (sequential).
pub trait GroupScan: ExecutionGroup {
    /// Scan the whole input into the output, starting from `init`, and return the combination
    /// of `init` with every input element.
    ///
    /// Every unit of the group must call this function with the same arguments. The operator
    /// must be associative; it doesn't need to be commutative. The output may be the input.
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
        F: Fn(T, T) -> T;
}

/// Inclusive scan of `input` into `output` seeded with `init`; returns the carry, the
/// combination of `init` with every element.
///
/// An empty input returns `init` and writes nothing.
pub fn inclusive_scan<G, T, I, O, F>(
    group: &G,
    input: &I,
    output: &O,
    init: T,
    op: F,
) -> Result<T, AllocError>
where
    G: GroupScan,
    T: Element,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    group.scan(ScanMode::Inclusive, input, output, init, op)
}

/// Exclusive scan of `input` into `output` seeded with `init`; returns the carry, the
/// combination of `init` with every element.
///
/// An empty input returns `init` and writes nothing.
pub fn exclusive_scan<G, T, I, O, F>(
    group: &G,
    input: &I,
    output: &O,
    init: T,
    op: F,
) -> Result<T, AllocError>
where
    G: GroupScan,
    T: Element,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    group.scan(ScanMode::Exclusive, input, output, init, op)
}

/// Inclusive scan seeded with the first element, which is written unchanged.
pub fn inclusive_scan_from_first<G, T, I, O, F>(
    group: &G,
    input: &I,
    output: &O,
    op: F,
) -> Result<(), AllocError>
where
    G: GroupScan,
    T: Element,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
    F: Fn(T, T) -> T,
{
    if input.is_empty() {
        return Ok(());
    }

    let first = input.read(0);
    if group.this_unit().index() == 0 {
        output.write(0, first);
    }

    group.scan(
        ScanMode::Inclusive,
        &input.advance(1),
        &output.advance(1),
        first,
        op,
    )?;

    Ok(())
}
