pub use bulkcl_runtime::*;

pub use bulkcl_common as common;

#[cfg(feature = "algorithms")]
pub use bulkcl_std as algorithms;

/// Everything needed to write and launch group functions.
pub mod prelude {
    pub use bulkcl_common::stream_id::StreamId;
    pub use bulkcl_runtime::{
        FutureStatus, GroupFuture, async_launch, client,
        client::AcceleratorClient,
        group::{
            CooperativeGroup, DynamicGroup, DynamicShape, ExecutionGroup, StaticGroup,
            StaticShape, ThisUnit, bound,
        },
        launch::{LaunchConfig, make_closure},
        memory::{DeviceSlice, Element, RandomAccess, RandomAccessMut, free, malloc},
    };

    #[cfg(feature = "algorithms")]
    pub use bulkcl_std::{
        GroupScan, ScanMode, copy_n, copy_n_to_registers, exclusive_scan, inclusive_scan,
        inclusive_scan_from_first,
    };
}

#[cfg(all(test, feature = "algorithms"))]
mod tests {
    use super::prelude::*;

    #[test_log::test]
    fn prelude_is_enough_to_scan_on_the_global_client() {
        let input = client().create(&[2u32, 4, 6, 8, 10]);
        let output = client().empty::<u32>(5);

        let future = async_launch(
            LaunchConfig::con(StaticShape::<2, 2>),
            make_closure(
                |group: &StaticGroup<2, 2>, input: DeviceSlice<u32>, output: DeviceSlice<u32>| {
                    inclusive_scan(group, &input, &output, 0, |a, b| a + b).unwrap();
                },
                (input, output.clone()),
            ),
        )
        .unwrap();

        future.join().unwrap();
        assert_eq!(output.to_vec(), vec![2, 6, 12, 20, 30]);
    }
}
