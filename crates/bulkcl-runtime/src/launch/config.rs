use bulkcl_common::stream_id::StreamId;

use crate::{
    GroupFuture,
    device::{DeviceProperties, KernelFootprint, occupancy},
    group::{ExecutionGroupDescriptor, GroupShape},
    stream::Event,
};

/// Host-side description of a launch: the group shape, how many groups or units to run, the
/// on-chip budget and the stream to run on.
///
/// Unset values are resolved by [configure](LaunchConfig::configure) from the occupancy of the
/// launched closure.
#[derive(Debug, Clone)]
pub struct LaunchConfig<S: GroupShape> {
    shape: S,
    num_groups: Option<usize>,
    num_units: Option<usize>,
    on_chip_bytes: Option<usize>,
    stream: Option<StreamId>,
    dependencies: Vec<Event>,
}

/// A launch with every value resolved.
#[derive(Debug, Clone)]
pub struct ResolvedLaunch<S> {
    /// The shape with its size resolved.
    pub shape: S,
    /// The shape of every group.
    pub descriptor: ExecutionGroupDescriptor,
    /// Number of groups.
    pub num_groups: usize,
}

impl<S> ResolvedLaunch<S> {
    /// Whether the launch has no unit to run.
    pub fn is_empty(&self) -> bool {
        self.num_groups == 0 || self.descriptor.unit_count == 0
    }
}

impl<S: GroupShape> LaunchConfig<S> {
    /// Launch `num_groups` groups of the given shape.
    pub fn grid(shape: S, num_groups: usize) -> Self {
        Self {
            shape,
            num_groups: Some(num_groups),
            num_units: None,
            on_chip_bytes: None,
            stream: None,
            dependencies: Vec::new(),
        }
    }

    /// Launch enough groups of the given shape to cover `num_units` units.
    pub fn par(shape: S, num_units: usize) -> Self {
        Self {
            num_groups: None,
            num_units: Some(num_units),
            ..Self::grid(shape, 0)
        }
    }

    /// Launch a single group of the given shape.
    pub fn con(shape: S) -> Self {
        Self::grid(shape, 1)
    }

    /// Reserve `bytes` of on-chip memory for every group.
    pub fn with_on_chip_bytes(mut self, bytes: usize) -> Self {
        self.on_chip_bytes = Some(bytes);
        self
    }

    /// Run on the given stream instead of the stream of the calling thread.
    pub fn on_stream(mut self, stream: StreamId) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Start only after the given launch completed.
    pub fn after(mut self, future: &GroupFuture) -> Self {
        self.dependencies.push(future.event().clone());
        self
    }

    /// The group shape.
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// The stream the launch runs on.
    pub fn stream(&self) -> StreamId {
        self.stream.unwrap_or_else(StreamId::current)
    }

    /// The launches this one waits for.
    pub fn dependencies(&self) -> &[Event] {
        &self.dependencies
    }

    /// Resolve every unset value for a closure with the given footprint.
    ///
    /// A dynamic shape without a size gets the size with the maximum occupancy, the number of
    /// groups covers the requested units, and the on-chip budget is the share of the core's
    /// on-chip memory left to each resident group.
    pub fn configure(
        &self,
        footprint: &KernelFootprint,
        properties: &DeviceProperties,
    ) -> ResolvedLaunch<S> {
        let shape = match self.shape.size() {
            Some(_) => self.shape.clone(),
            None => self.shape.resized(occupancy::group_size_with_maximum_occupancy(
                properties, footprint,
            )),
        };
        let unit_count = shape.size().unwrap_or(0);

        let num_groups = match (self.num_groups, self.num_units) {
            (Some(num_groups), _) => num_groups,
            (None, Some(num_units)) => match unit_count {
                0 => 0,
                size => num_units.div_ceil(size),
            },
            (None, None) => 1,
        };

        let on_chip_budget = self.on_chip_bytes.unwrap_or_else(|| {
            occupancy::proportional_on_chip_allocation(properties, footprint, unit_count)
        });

        ResolvedLaunch {
            descriptor: ExecutionGroupDescriptor::new(unit_count, shape.grain(), on_chip_budget),
            shape,
            num_groups,
        }
    }
}
