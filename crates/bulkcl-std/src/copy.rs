use bulkcl_runtime::{
    group::{Bounded, ExecutionGroup},
    memory::{DeviceSlice, Element, RandomAccess, RandomAccessMut},
};

/// Copy the first `n` elements of `input` to `output`, cooperatively with every unit of the
/// group, and return `output` advanced past the copied elements.
///
/// Every unit of the group must call this function with the same arguments. The copy is
/// complete and visible to the whole group when it returns.
///
/// Static groups copying from contiguous off-chip memory to contiguous on-chip memory use a
/// staged copy when the device benefits from it: each unit loads all of its elements of a
/// chunk before storing any of them.
pub fn copy_n<T, G, I, O>(group: &G, input: &I, n: usize, output: &O) -> O
where
    T: Element,
    G: ExecutionGroup,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
{
    let staged = match (input.as_contiguous(), output.as_contiguous()) {
        (Some(source), Some(destination))
            if group.is_static()
                && group.capabilities().staged_copy
                && source.is_off_chip()
                && destination.is_on_chip() =>
        {
            Some((source, destination))
        }
        _ => None,
    };

    match staged {
        Some((source, destination)) => staged_copy(group, source, n, destination),
        None => simple_copy(group, input, n, output),
    }

    output.advance(n)
}

/// Load `n` elements, at most `B`, into the calling unit's registers.
///
/// This is a sequential copy made by a single unit; it never synchronizes.
pub fn copy_n_to_registers<const B: usize, T, G, I>(
    unit: &Bounded<'_, B, G>,
    input: &I,
    n: usize,
    registers: &mut [T; B],
) where
    T: Element,
    G: ExecutionGroup,
    I: RandomAccess<T>,
{
    unit.check(n);

    for (index, register) in registers.iter_mut().enumerate().take(n) {
        *register = input.read(index);
    }
}

fn simple_copy<T, G, I, O>(group: &G, input: &I, n: usize, output: &O)
where
    T: Element,
    G: ExecutionGroup,
    I: RandomAccess<T>,
    O: RandomAccessMut<T>,
{
    let size = group.size();
    let unit = group.this_unit().index();

    if group.is_static() {
        let grain = group.grain();
        let chunk = size * grain;
        let full = n - n % chunk;

        let mut base = 0;
        while base < full {
            for i in 0..grain {
                let index = base + size * i + unit;
                output.write(index, input.read(index));
            }
            base += chunk;
        }

        for i in 0..grain {
            let index = full + size * i + unit;
            if index < n {
                output.write(index, input.read(index));
            }
        }
    } else {
        for index in (unit..n).step_by(size) {
            output.write(index, input.read(index));
        }
    }

    group.wait();
}

fn staged_copy<T, G>(group: &G, input: &DeviceSlice<T>, n: usize, output: &DeviceSlice<T>)
where
    T: Element,
    G: ExecutionGroup,
{
    let size = group.size();
    let grain = group.grain();
    let unit = group.this_unit().index();
    let chunk = size * grain;

    let mut base = 0;
    while base < n {
        let count = (n - base).saturating_sub(unit).div_ceil(size).min(grain);

        group.stage_through_registers(
            count,
            |i| input.read(base + size * i + unit),
            |i, value| output.write(base + size * i + unit, value),
        );

        base += chunk;
    }

    group.wait();
}
