use super::{CooperativeGroup, ExecutionGroup, GroupContext, ThisUnit};
use crate::{device::Capabilities, memory::Element};

/// A group promising that the algorithms it is passed to process at most `B` elements.
///
/// Knowing the bound lets the algorithms skip tiling and keep every element in registers.
#[derive(Debug)]
pub struct Bounded<'a, const B: usize, G> {
    group: &'a G,
}

/// View the group as processing at most `B` elements.
pub fn bound<const B: usize, G: ExecutionGroup>(group: &G) -> Bounded<'_, B, G> {
    Bounded { group }
}

impl<'a, const B: usize, G: ExecutionGroup> Bounded<'a, B, G> {
    /// The bound.
    pub const fn bound() -> usize {
        B
    }

    /// The underlying group.
    pub fn group(&self) -> &'a G {
        self.group
    }

    /// Check that `count` elements respect the bound, in debug builds only.
    pub fn check(&self, count: usize) {
        debug_assert!(
            count <= B,
            "{count} elements exceed the bound of {B} elements"
        );
    }
}

impl<const B: usize, G> Clone for Bounded<'_, B, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const B: usize, G> Copy for Bounded<'_, B, G> {}

impl<const B: usize, G: ExecutionGroup> ExecutionGroup for Bounded<'_, B, G> {
    fn size(&self) -> usize {
        self.group.size()
    }

    fn grain(&self) -> usize {
        self.group.grain()
    }

    fn this_unit(&self) -> ThisUnit {
        self.group.this_unit()
    }

    fn wait(&self) {
        self.group.wait()
    }

    fn is_static(&self) -> bool {
        self.group.is_static()
    }

    fn capabilities(&self) -> Capabilities {
        self.group.capabilities()
    }

    fn stage_through_registers<T, L, S>(&self, count: usize, load: L, store: S)
    where
        T: Element,
        L: FnMut(usize) -> T,
        S: FnMut(usize, T),
    {
        self.group.stage_through_registers(count, load, store)
    }
}

impl<const B: usize, G: CooperativeGroup> CooperativeGroup for Bounded<'_, B, G> {
    fn context(&self) -> &GroupContext {
        self.group.context()
    }
}
