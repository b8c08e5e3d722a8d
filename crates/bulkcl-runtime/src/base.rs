use crate::{
    GroupFuture,
    client::AcceleratorClient,
    device::DeviceInfo,
    error::LaunchError,
    group::GroupShape,
    launch::{Closure, LaunchConfig},
};

static CLIENT: spin::Once<AcceleratorClient> = spin::Once::new();

/// The process-wide client, created on first use from the [device properties](DeviceInfo).
pub fn client() -> AcceleratorClient {
    CLIENT
        .call_once(|| AcceleratorClient::new(DeviceInfo::properties()))
        .clone()
}

/// Launch the closure on the process-wide client and return immediately.
///
/// See [AcceleratorClient::launch].
pub fn async_launch<S, C>(config: LaunchConfig<S>, closure: C) -> Result<GroupFuture, LaunchError>
where
    S: GroupShape,
    C: Closure<S::Group>,
{
    client().launch(config, closure)
}
