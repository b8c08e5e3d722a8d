use core::marker::PhantomData;
use std::sync::Arc;

use bulkcl_common::{backtrace::BackTrace, stream_id::StreamId};

use crate::{
    GroupFuture,
    config::{
        GlobalConfig, Logger, launch::LaunchLogLevel, streaming::StreamingLogLevel,
    },
    device::{Capabilities, DeviceProperties, KernelFootprint},
    error::{ExecutionError, LaunchError, ResourceLimitError},
    group::GroupShape,
    launch::{Closure, LaunchConfig, LaunchTask, ResolvedLaunch, make_closure},
    memory::{DeviceSlice, Element, MemoryRegion, OffChipPool, Storage},
    stream::{StreamPool, WorkerFactory},
};

/// Handle to the accelerator: creates buffers and launches closures over execution groups.
///
/// Clones share the same streams and off-chip pool.
#[derive(Clone, Debug)]
pub struct AcceleratorClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    properties: Arc<DeviceProperties>,
    capabilities: Capabilities,
    streams: spin::Mutex<StreamPool<WorkerFactory>>,
    off_chip: Arc<OffChipPool>,
    logger: Arc<spin::Mutex<Logger>>,
    registers_per_unit: usize,
    unit_stack_bytes: usize,
}

impl AcceleratorClient {
    /// Create a client for a device with the given properties, configured from the global
    /// configuration.
    pub fn new(properties: Arc<DeviceProperties>) -> Self {
        Self::with_config(properties, GlobalConfig::get())
    }

    /// Create a client for a device with the given properties and configuration.
    pub fn with_config(properties: Arc<DeviceProperties>, config: Arc<GlobalConfig>) -> Self {
        let capabilities = properties.capabilities();
        let off_chip = Arc::new(OffChipPool::new(properties.memory.off_chip_capacity));
        let max_streams = config.streaming.max_streams;
        let registers_per_unit = config.launch.registers_per_unit;
        let unit_stack_bytes = config.launch.unit_stack_bytes;
        let logger = Arc::new(spin::Mutex::new(Logger::from_config(config)));

        Self {
            inner: Arc::new(ClientInner {
                capabilities,
                streams: spin::Mutex::new(StreamPool::new(
                    WorkerFactory::new(logger.clone()),
                    max_streams,
                )),
                off_chip,
                registers_per_unit,
                unit_stack_bytes,
                logger,
                properties,
            }),
        }
    }

    /// The properties of the device.
    pub fn properties(&self) -> &DeviceProperties {
        &self.inner.properties
    }

    /// The algorithm choices for the device.
    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    /// Off-chip bytes currently allocated by running groups.
    pub fn off_chip_usage(&self) -> usize {
        self.inner.off_chip.in_use()
    }

    /// Copy host values into a new off-chip buffer.
    pub fn create<T: Element>(&self, data: &[T]) -> DeviceSlice<T> {
        let slice = self.empty(data.len());
        slice.copy_from_slice(data);
        slice
    }

    /// Create a zeroed off-chip buffer of `len` elements.
    pub fn empty<T: Element>(&self, len: usize) -> DeviceSlice<T> {
        let storage = Storage::new(MemoryRegion::OffChip, len * size_of::<T>());
        DeviceSlice::new(Arc::new(storage), 0, len)
    }

    /// Read a buffer back to the host.
    ///
    /// The caller is responsible for joining the launches writing the buffer first.
    pub fn read<T: Element>(&self, slice: &DeviceSlice<T>) -> Vec<T> {
        slice.to_vec()
    }

    /// Launch the closure on every unit of the configured groups.
    ///
    /// The launch is validated and enqueued on its stream, and the returned future completes
    /// once every group ran. Launches with no group or no unit are neither validated nor
    /// enqueued; their future completes once the previous work of the stream is done.
    pub fn launch<S, C>(
        &self,
        config: LaunchConfig<S>,
        closure: C,
    ) -> Result<GroupFuture, LaunchError>
    where
        S: GroupShape,
        C: Closure<S::Group>,
    {
        let footprint = closure
            .footprint()
            .unwrap_or(KernelFootprint::new(self.inner.registers_per_unit, 0));
        let resolved = config.configure(&footprint, &self.inner.properties);
        if !resolved.is_empty() {
            self.validate(&resolved, &footprint)?;
        }

        let stream_id = config.stream();
        let mut streams = self.inner.streams.lock();
        let stream = streams.get_mut(&stream_id);

        for dependency in config.dependencies() {
            stream.wait_event(dependency.clone());
        }

        if resolved.is_empty() {
            log::debug!("Empty launch on {stream_id}, recording an event instead");
            return Ok(GroupFuture::new(stream.record_event()));
        }

        let description = format!(
            "{} groups of {} units (grain {}, {} on-chip bytes) on {stream_id}",
            resolved.num_groups,
            resolved.descriptor.unit_count,
            resolved.descriptor.grain,
            resolved.descriptor.on_chip_budget,
        );
        self.log_launch(LaunchLogLevel::Basic, &description);
        self.log_streaming(&format!("Enqueue launch on stream {}", stream.index()));

        let task = LaunchTask::<S, C> {
            closure,
            descriptor: resolved.descriptor,
            num_groups: resolved.num_groups,
            groups_per_wave: self.inner.properties.hardware.num_cores,
            unit_stack_bytes: self.inner.unit_stack_bytes,
            capabilities: self.inner.capabilities,
            off_chip: self.inner.off_chip.clone(),
            _shape: PhantomData,
        };

        let client = self.clone();
        let event = stream.enqueue(Box::new(move || {
            let result = task.execute();
            let outcome = match &result {
                Ok(()) => "completed".to_string(),
                Err(err) => format!("failed: {err}"),
            };
            client.log_launch(
                LaunchLogLevel::Full,
                &format!("Launch of {description} {outcome}"),
            );
            result
        }));

        Ok(GroupFuture::new(event))
    }

    /// Launch a function taking only the group.
    pub fn launch_fn<S, F>(
        &self,
        config: LaunchConfig<S>,
        function: F,
    ) -> Result<GroupFuture, LaunchError>
    where
        S: GroupShape,
        F: Fn(&S::Group) + Clone + Send + Sync + 'static,
    {
        self.launch(config, make_closure(function, ()))
    }

    /// Block until every launch enqueued on the stream so far completed.
    pub fn sync(&self, stream: StreamId) -> Result<(), ExecutionError> {
        let event = self.inner.streams.lock().get_mut(&stream).record_event();
        GroupFuture::new(event).join()
    }

    fn validate<S>(
        &self,
        resolved: &ResolvedLaunch<S>,
        footprint: &KernelFootprint,
    ) -> Result<(), LaunchError> {
        let hardware = &self.inner.properties.hardware;
        let descriptor = &resolved.descriptor;

        if descriptor.grain == 0 {
            return Err(LaunchError::InvalidShape {
                reason: "The grain of a group must be at least one element per unit".into(),
                backtrace: BackTrace::capture(),
            });
        }

        if descriptor.unit_count > hardware.max_units_per_group {
            return Err(ResourceLimitError::Units {
                requested: descriptor.unit_count,
                max: hardware.max_units_per_group,
                backtrace: BackTrace::capture(),
            }
            .into());
        }

        let on_chip_bytes = descriptor.on_chip_budget + footprint.static_on_chip_bytes;
        if on_chip_bytes > hardware.max_on_chip_bytes_per_group {
            return Err(ResourceLimitError::SharedMemory {
                requested: on_chip_bytes,
                max: hardware.max_on_chip_bytes_per_group,
                backtrace: BackTrace::capture(),
            }
            .into());
        }

        Ok(())
    }

    fn log_launch(&self, level: LaunchLogLevel, message: &str) {
        let mut logger = self.inner.logger.lock();
        let enabled = match logger.log_level_launch() {
            LaunchLogLevel::Disabled => false,
            LaunchLogLevel::Basic => level == LaunchLogLevel::Basic,
            LaunchLogLevel::Full => true,
        };

        if enabled {
            logger.log_launch(&message);
        }
    }

    fn log_streaming(&self, message: &str) {
        let mut logger = self.inner.logger.lock();
        if logger.log_level_streaming() == StreamingLogLevel::Full {
            logger.log_streaming(&message);
        }
    }
}
