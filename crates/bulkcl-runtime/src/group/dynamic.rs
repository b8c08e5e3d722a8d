use std::sync::Arc;

use super::{CooperativeGroup, ExecutionGroup, GroupContext, ThisUnit};
use crate::device::Capabilities;

/// A group whose size and grain are only known at run time.
#[derive(new, Clone, Debug)]
pub struct DynamicGroup {
    context: Arc<GroupContext>,
    unit: usize,
}

impl ExecutionGroup for DynamicGroup {
    fn size(&self) -> usize {
        self.context.descriptor().unit_count
    }

    fn grain(&self) -> usize {
        self.context.descriptor().grain
    }

    fn this_unit(&self) -> ThisUnit {
        ThisUnit::new(self.unit)
    }

    fn wait(&self) {
        self.context.barrier().wait()
    }

    fn capabilities(&self) -> Capabilities {
        self.context.capabilities()
    }
}

impl CooperativeGroup for DynamicGroup {
    fn context(&self) -> &GroupContext {
        &self.context
    }
}
