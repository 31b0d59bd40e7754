//! Shared packet builders for replaying synthetic traces against the fake
//! driver.

#![allow(dead_code)]

use vkr_core::{CallStatus, ReplaySettings};
use vkr_engine::{FakeDriver, VulkanReplayer};
use vkr_protocol::calls::*;
use vkr_protocol::{Packet, RecordedHandle, VulkanCall};

pub const INSTANCE: RecordedHandle = RecordedHandle(0x10);
pub const PHYSICAL_DEVICE: RecordedHandle = RecordedHandle(0x20);
pub const DEVICE: RecordedHandle = RecordedHandle(0x30);
pub const QUEUE: RecordedHandle = RecordedHandle(0x40);

pub fn replayer() -> VulkanReplayer<FakeDriver> {
    replayer_with(ReplaySettings::default())
}

pub fn replayer_with(settings: ReplaySettings) -> VulkanReplayer<FakeDriver> {
    VulkanReplayer::new(FakeDriver::new(), settings, None)
}

pub fn instance_create_packet(layers: &[&str], extensions: &[&str]) -> Packet {
    Packet::new(VulkanCall::CreateInstance {
        create_info: SerializedInstanceCreateInfo {
            application_name: Some("replay-test".to_string()),
            application_version: 1,
            engine_name: None,
            engine_version: 0,
            api_version: 0,
            enabled_layers: layers.iter().map(|s| s.to_string()).collect(),
            enabled_extensions: extensions.iter().map(|s| s.to_string()).collect(),
        },
        recorded_instance: INSTANCE,
    })
}

pub fn enumerate_packet() -> Packet {
    Packet::new(VulkanCall::EnumeratePhysicalDevices {
        instance: INSTANCE,
        recorded_devices: vec![PHYSICAL_DEVICE],
    })
}

pub fn device_create_packet() -> Packet {
    Packet::new(VulkanCall::CreateDevice {
        physical_device: PHYSICAL_DEVICE,
        create_info: SerializedDeviceCreateInfo {
            queue_create_infos: vec![SerializedDeviceQueueCreateInfo {
                queue_family_index: 0,
                queue_priorities: vec![1.0],
            }],
            enabled_layers: Vec::new(),
            enabled_extensions: Vec::new(),
            enabled_features: None,
        },
        recorded_device: DEVICE,
    })
}

pub fn get_queue_packet() -> Packet {
    Packet::new(VulkanCall::GetDeviceQueue {
        device: DEVICE,
        queue_family_index: 0,
        queue_index: 0,
        recorded_queue: QUEUE,
    })
}

/// Replay instance, enumeration, and device bring-up, panicking on any
/// non-success status.
pub fn bring_up(replayer: &mut VulkanReplayer<FakeDriver>) {
    for packet in [
        instance_create_packet(&[], &[]),
        enumerate_packet(),
        device_create_packet(),
    ] {
        let status = replayer.replay_packet(&packet);
        assert_eq!(
            status,
            CallStatus::Success,
            "bring-up packet {} failed",
            packet.entry_point()
        );
    }
}

pub fn bring_up_with_queue(replayer: &mut VulkanReplayer<FakeDriver>) {
    bring_up(replayer);
    assert_eq!(
        replayer.replay_packet(&get_queue_packet()),
        CallStatus::Success
    );
}

pub fn teardown_packets() -> Vec<Packet> {
    vec![
        Packet::new(VulkanCall::DestroyDevice { device: DEVICE }),
        Packet::new(VulkanCall::DestroyInstance { instance: INSTANCE }),
    ]
}
