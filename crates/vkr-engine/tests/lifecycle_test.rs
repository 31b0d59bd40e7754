//! Minimal lifecycle: instance, one physical device, device, teardown.
//! Every map must be empty afterwards and every return value must match.

mod common;

use common::*;
use vkr_core::CallStatus;
use vkr_protocol::{Packet, RecordedHandle, VulkanCall};

#[test]
fn minimal_lifecycle_leaves_no_mappings() {
    let mut replayer = replayer();

    bring_up(&mut replayer);
    assert!(replayer.object_maps().instances.contains(INSTANCE));
    assert!(replayer.object_maps().physical_devices.contains(PHYSICAL_DEVICE));
    assert!(replayer.object_maps().devices.contains(DEVICE));

    for packet in teardown_packets() {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    assert!(replayer.object_maps().is_empty());
    assert!(replayer.driver().invoked("vkCreateInstance"));
    assert!(replayer.driver().invoked("vkDestroyDevice"));
    assert!(replayer.driver().invoked("vkDestroyInstance"));
    assert_eq!(replayer.result_mismatches(), 0);
}

#[test]
fn full_stream_summary_is_clean() {
    let mut replayer = replayer();
    let mut packets = vec![
        instance_create_packet(&[], &[]),
        enumerate_packet(),
        device_create_packet(),
    ];
    packets.extend(teardown_packets());

    let summary = replayer.replay(&packets);
    assert_eq!(summary.calls, 5);
    assert!(summary.clean());
}

#[test]
fn mismatched_return_code_is_reported() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    // The trace recorded a success, the live driver disagrees.
    replayer
        .driver_mut()
        .fail_next("vkDeviceWaitIdle", ash::vk::Result::ERROR_DEVICE_LOST);
    let status = replayer.replay_packet(&Packet::new(VulkanCall::DeviceWaitIdle {
        device: DEVICE,
    }));
    assert_eq!(status, CallStatus::BadReturn);
}

#[test]
fn queue_mappings_die_with_their_device() {
    let mut replayer = replayer();
    bring_up_with_queue(&mut replayer);
    assert!(replayer.object_maps().queues.contains(QUEUE));

    for packet in teardown_packets() {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }
    assert!(replayer.object_maps().is_empty());
}

#[test]
fn debug_report_packets_are_discarded_without_a_sink() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let callback = RecordedHandle(0x77);
    let create = Packet::new(VulkanCall::CreateDebugReportCallback {
        instance: INSTANCE,
        flags: 0x9,
        recorded_callback: callback,
    });
    assert_eq!(replayer.replay_packet(&create), CallStatus::Success);
    assert!(!replayer.driver().invoked("vkCreateDebugReportCallbackEXT"));

    let destroy = Packet::new(VulkanCall::DestroyDebugReportCallback {
        instance: INSTANCE,
        callback,
    });
    assert_eq!(replayer.replay_packet(&destroy), CallStatus::Success);
}

#[test]
fn debug_report_callback_is_installed_with_a_sink() {
    let mut replayer = replayer();
    replayer.capture_validation(true);
    bring_up(&mut replayer);

    let callback = RecordedHandle(0x77);
    let create = Packet::new(VulkanCall::CreateDebugReportCallback {
        instance: INSTANCE,
        flags: 0x9,
        recorded_callback: callback,
    });
    assert_eq!(replayer.replay_packet(&create), CallStatus::Success);
    assert!(replayer.driver().invoked("vkCreateDebugReportCallbackEXT"));
    assert!(replayer.object_maps().debug_callbacks.contains(callback));
}
