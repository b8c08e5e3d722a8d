mod common;

use bulkcl_runtime::{
    device::Generation,
    group::{
        DynamicGroup, DynamicShape, ExecutionGroup, StaticGroup, StaticShape, ThisUnit, bound,
    },
    launch::{LaunchConfig, make_closure},
    memory::{DeviceSlice, free, is_on_chip, malloc},
};
use bulkcl_std::{copy_n, copy_n_to_registers};
use common::*;

#[test_log::test]
fn dynamic_group_copies_every_element() {
    let client = test_client();
    let data = (0..1000u32).collect::<Vec<_>>();
    let input = client.create(&data);
    let output = client.empty::<u32>(1000);

    let closure = make_closure(
        |group: &DynamicGroup, input: DeviceSlice<u32>, output: DeviceSlice<u32>| {
            let rest = copy_n(group, &input, 1000, &output);
            assert!(rest.is_empty());
        },
        (input, output.clone()),
    );

    client
        .launch(LaunchConfig::con(DynamicShape::sized(48)), closure)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(client.read(&output), data);
}

#[test_log::test]
fn static_group_copies_a_partial_chunk() {
    let client = test_client();
    let data = (0..50u32).map(|value| value * 3).collect::<Vec<_>>();
    let input = client.create(&data);
    let output = client.empty::<u32>(64);

    let closure = make_closure(
        |group: &StaticGroup<8, 3>, input: DeviceSlice<u32>, output: DeviceSlice<u32>| {
            copy_n(group, &input, 50, &output);
        },
        (input, output.clone()),
    );

    client
        .launch(LaunchConfig::con(StaticShape::<8, 3>), closure)
        .unwrap()
        .join()
        .unwrap();

    let result = client.read(&output);
    assert_eq!(&result[..50], &data[..]);
    assert_eq!(&result[50..], &[0; 14]);
}

#[test_log::test]
fn copy_returns_the_position_past_the_copied_elements() {
    let client = test_client();
    let input = client.create(&[1u32, 2, 3, 4, 5]);
    let output = client.empty::<u32>(8);
    let unit = ThisUnit::new(0);

    let rest = copy_n(&unit, &input, 0, &output);
    assert_eq!(rest, output);
    assert_eq!(client.read(&output), vec![0; 8]);

    let rest = copy_n(&unit, &input, 5, &output);
    assert_eq!(rest, output.advance(5));
    assert_eq!(rest.len(), 3);
    assert_eq!(client.read(&output), vec![1, 2, 3, 4, 5, 0, 0, 0]);
}

#[test_log::test]
fn host_slices_can_be_copied_to_the_device() {
    let client = test_client();
    let data = [9u16, 8, 7, 6];
    let output = client.empty::<u16>(4);

    copy_n(&ThisUnit::new(0), &&data[..], 4, &output);

    assert_eq!(client.read(&output), data.to_vec());
}

#[test_log::test]
fn staged_copy_round_trips_through_on_chip_memory() {
    let client = client_with(Generation::new(3, 5));
    assert!(client.capabilities().staged_copy);

    let data = (0..37i32).map(|value| -value).collect::<Vec<_>>();
    let input = client.create(&data);
    let output = client.empty::<i32>(37);
    let located = client.empty::<u32>(1);

    let closure = make_closure(
        |group: &StaticGroup<4, 2>,
         input: DeviceSlice<i32>,
         output: DeviceSlice<i32>,
         located: DeviceSlice<u32>| {
            let stage = malloc(group, 64 * size_of::<i32>()).unwrap();
            let tile = stage.view::<i32>();

            copy_n(group, &input, 37, &tile);
            copy_n(group, &tile, 37, &output);

            if group.this_unit().index() == 0 {
                located.write(0, is_on_chip(&tile) as u32);
            }
            free(group, stage);
        },
        (input, output.clone(), located.clone()),
    );

    client
        .launch(LaunchConfig::con(StaticShape::<4, 2>), closure)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(client.read(&located), vec![1]);
    assert_eq!(client.read(&output), data);
}

#[test_log::test]
fn strided_source_is_gathered() {
    let client = test_client();
    let input = client.create(&(0..20u32).collect::<Vec<_>>());
    let output = client.empty::<u32>(10);

    let closure = make_closure(
        |group: &DynamicGroup, input: DeviceSlice<u32>, output: DeviceSlice<u32>| {
            let strided = input.strided(2);
            copy_n(group, &strided, strided.len(), &output);
        },
        (input, output.clone()),
    );

    client
        .launch(LaunchConfig::con(DynamicShape::sized(3)), closure)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(
        client.read(&output),
        (0..10u32).map(|value| value * 2).collect::<Vec<_>>()
    );
}

#[test_log::test]
fn registers_receive_the_first_elements() {
    let client = test_client();
    let input = client.create(&[5u8, 6, 7, 8, 9]);
    let unit = ThisUnit::new(0);
    let mut registers = [0u8; 4];

    copy_n_to_registers(&bound::<4, _>(&unit), &input.advance(2), 3, &mut registers);

    assert_eq!(registers, [7, 8, 9, 0]);
}
