use super::GroupContext;
use crate::{device::Capabilities, memory::Element};

/// A set of execution units that can synchronize with each other.
pub trait ExecutionGroup: Send + Sync {
    /// Number of units in the group.
    fn size(&self) -> usize;

    /// Number of consecutive elements each unit processes in the group algorithms.
    fn grain(&self) -> usize;

    /// The calling unit.
    fn this_unit(&self) -> ThisUnit;

    /// Block until every unit of the group reached this point.
    ///
    /// Writes made by any unit before the barrier are visible to every unit after it.
    fn wait(&self);

    /// Whether the size and grain are known at compile time.
    fn is_static(&self) -> bool {
        false
    }

    /// The capabilities of the device running the group.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Load `count` elements, at most the grain, into the calling unit's registers, then
    /// store them.
    ///
    /// Only static groups have registers for a whole grain; the others store every element
    /// right after loading it.
    fn stage_through_registers<T, L, S>(&self, count: usize, mut load: L, mut store: S)
    where
        T: Element,
        L: FnMut(usize) -> T,
        S: FnMut(usize, T),
    {
        for index in 0..count {
            store(index, load(index));
        }
    }
}

/// An [execution group](ExecutionGroup) running on the accelerator, with access to its
/// group-shared state.
pub trait CooperativeGroup: ExecutionGroup {
    /// The state shared by the units of the group.
    fn context(&self) -> &GroupContext;

    /// Index of the group in its launch.
    fn group_index(&self) -> usize {
        self.context().group_index()
    }

    /// Number of groups in the launch.
    fn num_groups(&self) -> usize {
        self.context().num_groups()
    }

    /// On-chip bytes reserved for the group.
    fn on_chip_budget(&self) -> usize {
        self.context().descriptor().on_chip_budget
    }
}

/// The calling unit of a group.
///
/// A unit is also a sequential group of size one, used to run the per-unit form of the group
/// algorithms; inside that group its own index is zero.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThisUnit {
    index: usize,
}

impl ThisUnit {
    /// Rank of the unit in `[0, size)` of its group.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ExecutionGroup for ThisUnit {
    fn size(&self) -> usize {
        1
    }

    fn grain(&self) -> usize {
        1
    }

    fn this_unit(&self) -> ThisUnit {
        ThisUnit::new(0)
    }

    fn wait(&self) {}
}

/// Resolved shape of every group of one launch.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionGroupDescriptor {
    /// Number of units per group.
    pub unit_count: usize,
    /// Elements per unit in the group algorithms.
    pub grain: usize,
    /// On-chip bytes reserved for each group.
    pub on_chip_budget: usize,
}
