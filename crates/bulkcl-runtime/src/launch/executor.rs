use core::marker::PhantomData;
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    thread::Scope,
};

use super::Closure;
use crate::{
    device::Capabilities,
    error::ExecutionError,
    group::{ExecutionGroupDescriptor, GroupAborted, GroupContext, GroupShape},
    memory::OffChipPool,
};

/// A resolved launch ready to run on a stream worker.
///
/// Groups run in waves of `groups_per_wave` concurrently resident groups, and every unit of a
/// group runs on its own thread.
pub(crate) struct LaunchTask<S, C> {
    pub closure: C,
    pub descriptor: ExecutionGroupDescriptor,
    pub num_groups: usize,
    pub groups_per_wave: usize,
    pub unit_stack_bytes: usize,
    pub capabilities: Capabilities,
    pub off_chip: Arc<OffChipPool>,
    pub _shape: PhantomData<fn() -> S>,
}

impl<S: GroupShape, C: Closure<S::Group>> LaunchTask<S, C> {
    /// Run every group, stopping at the first wave with a faulted group.
    pub fn execute(self) -> Result<(), ExecutionError> {
        let task = &self;
        let groups_per_wave = self.groups_per_wave.max(1);
        let mut first_group = 0;

        while first_group < self.num_groups {
            let last_group = (first_group + groups_per_wave).min(self.num_groups);

            let faults = std::thread::scope(|scope| {
                let groups = (first_group..last_group)
                    .map(|group_index| {
                        (group_index, scope.spawn(move || task.run_group(group_index)))
                    })
                    .collect::<Vec<_>>();

                groups
                    .into_iter()
                    .map(|(group_index, group)| {
                        group
                            .join()
                            .unwrap_or_else(|payload| Err(fault(group_index, 0, payload)))
                    })
                    .collect::<Vec<_>>()
            });

            if let Some(err) = faults.into_iter().find_map(Result::err) {
                return Err(err);
            }
            first_group = last_group;
        }

        Ok(())
    }

    fn run_group(&self, group_index: usize) -> Result<(), ExecutionError> {
        let context = Arc::new(GroupContext::new(
            self.descriptor,
            group_index,
            self.num_groups,
            self.capabilities,
            self.off_chip.clone(),
        ));

        let faults = std::thread::scope(|scope| {
            let mut units = Vec::with_capacity(self.descriptor.unit_count);

            for unit in 0..self.descriptor.unit_count {
                match self.spawn_unit(scope, &context, unit) {
                    Ok(handle) => units.push((unit, handle)),
                    Err(err) => {
                        context.barrier().poison();
                        return vec![Err(ExecutionError::Abandoned {
                            reason: format!("Can't spawn unit {unit} of group {group_index}: {err}"),
                        })];
                    }
                }
            }

            units
                .into_iter()
                .map(|(unit, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| Err(fault(group_index, unit, payload)))
                })
                .collect::<Vec<_>>()
        });

        faults.into_iter().find_map(Result::err).map_or(Ok(()), Err)
    }

    fn spawn_unit<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        context: &'env Arc<GroupContext>,
        unit: usize,
    ) -> std::io::Result<std::thread::ScopedJoinHandle<'scope, Result<(), ExecutionError>>> {
        let group_index = context.group_index();

        std::thread::Builder::new()
            .name(format!("bulkcl-group-{group_index}-unit-{unit}"))
            .stack_size(self.unit_stack_bytes)
            .spawn_scoped(scope, move || {
                let group = S::bind(context.clone(), unit);

                match catch_unwind(AssertUnwindSafe(|| self.closure.invoke(&group))) {
                    Ok(()) => Ok(()),
                    // Another unit faulted first and released this one from the barrier.
                    Err(payload) if payload.is::<GroupAborted>() => Ok(()),
                    Err(payload) => {
                        context.barrier().poison();
                        Err(fault(group_index, unit, payload))
                    }
                }
            })
    }
}

fn fault(group: usize, unit: usize, payload: Box<dyn Any + Send>) -> ExecutionError {
    let reason = match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "The unit panicked".to_string(),
        },
    };

    ExecutionError::UnitFault { group, unit, reason }
}
