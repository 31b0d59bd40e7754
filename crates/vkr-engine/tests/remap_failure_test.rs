//! Broken-remap behavior: a non-null recorded handle without a live
//! counterpart skips the call before the driver sees anything, and the null
//! handle always passes through as null.

mod common;

use common::*;
use vkr_core::CallStatus;
use vkr_protocol::calls::SerializedSubmitInfo;
use vkr_protocol::{Packet, RecordedHandle, VulkanCall};

#[test]
fn submit_with_unknown_command_buffer_is_skipped() {
    let mut replayer = replayer();
    bring_up_with_queue(&mut replayer);

    let packet = Packet::new(VulkanCall::QueueSubmit {
        queue: QUEUE,
        submits: vec![SerializedSubmitInfo {
            wait_semaphores: Vec::new(),
            wait_dst_stage_masks: Vec::new(),
            command_buffers: vec![RecordedHandle(0xdead)],
            signal_semaphores: Vec::new(),
        }],
        fence: RecordedHandle::NULL,
    });

    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkQueueSubmit"));
}

#[test]
fn null_fence_passes_through_as_null() {
    let mut replayer = replayer();
    bring_up_with_queue(&mut replayer);

    let packet = Packet::new(VulkanCall::QueueSubmit {
        queue: QUEUE,
        submits: Vec::new(),
        fence: RecordedHandle::NULL,
    });
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let fence = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            vkr_engine::FakeCall::QueueSubmit { fence, .. } => Some(*fence),
            _ => None,
        })
        .expect("driver never saw vkQueueSubmit");
    assert_eq!(fence, 0);
}

#[test]
fn unknown_dispatch_object_is_skipped() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let packet = Packet::new(VulkanCall::DeviceWaitIdle {
        device: RecordedHandle(0xbad),
    });
    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkDeviceWaitIdle"));
}

#[test]
fn unknown_barrier_target_skips_the_whole_barrier() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let pool = RecordedHandle(0x200);
    let cb = RecordedHandle(0x201);
    for packet in [
        Packet::new(VulkanCall::CreateCommandPool {
            device: DEVICE,
            queue_family_index: 0,
            flags: 0,
            recorded_pool: pool,
        }),
        Packet::new(VulkanCall::AllocateCommandBuffers {
            device: DEVICE,
            command_pool: pool,
            level: 0,
            recorded_buffers: vec![cb],
        }),
    ] {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    let packet = Packet::new(VulkanCall::CmdPipelineBarrier {
        command_buffer: cb,
        src_stage_mask: 1,
        dst_stage_mask: 1,
        dependency_flags: 0,
        memory_barriers: Vec::new(),
        buffer_barriers: Vec::new(),
        image_barriers: vec![vkr_protocol::calls::SerializedImageMemoryBarrier {
            src_access_mask: 0,
            dst_access_mask: 0,
            old_layout: 0,
            new_layout: 1,
            src_queue_family_index: 0,
            dst_queue_family_index: 0,
            image: RecordedHandle(0xfeed),
            subresource_range: vkr_protocol::calls::SerializedImageSubresourceRange {
                aspect_mask: 1,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
        }],
    });

    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkCmdPipelineBarrier"));
}

#[test]
fn lookup_of_unknown_handle_yields_null() {
    let replayer = replayer();
    let unknown = replayer
        .object_maps()
        .buffers
        .lookup(RecordedHandle(0x123456));
    assert_eq!(unknown, ash::vk::Buffer::null());

    let null = replayer.object_maps().buffers.lookup(RecordedHandle::NULL);
    assert_eq!(null, ash::vk::Buffer::null());
}

#[test]
fn replay_continues_after_a_skipped_call() {
    let mut replayer = replayer();
    bring_up_with_queue(&mut replayer);

    let bad = Packet::new(VulkanCall::DeviceWaitIdle {
        device: RecordedHandle(0xbad),
    });
    let good = Packet::new(VulkanCall::QueueWaitIdle { queue: QUEUE });

    assert_eq!(replayer.replay_packet(&bad), CallStatus::ValidationError);
    assert_eq!(replayer.replay_packet(&good), CallStatus::Success);
}
