use std::sync::Arc;

use super::{CooperativeGroup, DynamicGroup, GroupContext, StaticGroup};

/// Host-side description of the groups to launch, before occupancy resolution.
pub trait GroupShape: Clone + Send + Sync + core::fmt::Debug + 'static {
    /// The group type handed to every unit.
    type Group: CooperativeGroup;

    /// Whether the size and grain are compile-time constants.
    const IS_STATIC: bool;

    /// Units per group, or `None` to let the launcher choose.
    fn size(&self) -> Option<usize>;

    /// Elements per unit.
    fn grain(&self) -> usize;

    /// The same shape with the given size.
    ///
    /// Static shapes ignore the request and keep their compile-time size.
    fn resized(&self, size: usize) -> Self;

    /// The group seen by unit `unit` of the group owning `context`.
    fn bind(context: Arc<GroupContext>, unit: usize) -> Self::Group;
}

/// A shape whose size and grain are chosen at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicShape {
    size: Option<usize>,
    grain: usize,
}

impl DynamicShape {
    /// A shape with a fixed size and a grain of one.
    pub fn sized(size: usize) -> Self {
        Self {
            size: Some(size),
            grain: 1,
        }
    }

    /// A shape whose size is chosen for maximum occupancy, with a grain of one.
    pub fn auto() -> Self {
        Self::default()
    }

    /// The same shape with another grain.
    pub fn with_grain(mut self, grain: usize) -> Self {
        self.grain = grain;
        self
    }
}

impl Default for DynamicShape {
    fn default() -> Self {
        Self {
            size: None,
            grain: 1,
        }
    }
}

impl GroupShape for DynamicShape {
    type Group = DynamicGroup;

    const IS_STATIC: bool = false;

    fn size(&self) -> Option<usize> {
        self.size
    }

    fn grain(&self) -> usize {
        self.grain
    }

    fn resized(&self, size: usize) -> Self {
        Self {
            size: Some(size),
            grain: self.grain,
        }
    }

    fn bind(context: Arc<GroupContext>, unit: usize) -> Self::Group {
        DynamicGroup::new(context, unit)
    }
}

/// A shape of `SIZE` units with `GRAIN` elements each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticShape<const SIZE: usize, const GRAIN: usize>;

impl<const SIZE: usize, const GRAIN: usize> GroupShape for StaticShape<SIZE, GRAIN> {
    type Group = StaticGroup<SIZE, GRAIN>;

    const IS_STATIC: bool = true;

    fn size(&self) -> Option<usize> {
        Some(SIZE)
    }

    fn grain(&self) -> usize {
        GRAIN
    }

    fn resized(&self, _size: usize) -> Self {
        *self
    }

    fn bind(context: Arc<GroupContext>, unit: usize) -> Self::Group {
        StaticGroup::new(context, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_shapes_can_be_resized() {
        let shape = DynamicShape::auto().with_grain(4);

        assert_eq!(shape.size(), None);
        assert_eq!(shape.resized(64).size(), Some(64));
        assert_eq!(shape.resized(64).grain(), 4);
    }

    #[test]
    fn static_shapes_keep_their_size() {
        let shape = StaticShape::<128, 2>;

        assert_eq!(shape.resized(32).size(), Some(128));
        assert!(StaticShape::<128, 2>::IS_STATIC);
        assert!(!DynamicShape::IS_STATIC);
    }
}
