//! Packet non-destructiveness: a handler never writes through the packet,
//! so every field holds its pre-call value afterwards and the same packet
//! replays identically.

mod common;

use common::*;
use vkr_core::CallStatus;
use vkr_protocol::calls::{
    SerializedBufferMemoryBarrier, SerializedSubmitInfo,
};
use vkr_protocol::{Blob, Packet, RecordedHandle, VulkanCall};

const POOL: RecordedHandle = RecordedHandle(0x600);
const CB: RecordedHandle = RecordedHandle(0x601);
const BUFFER: RecordedHandle = RecordedHandle(0x602);

fn command_setup(replayer: &mut vkr_engine::VulkanReplayer<vkr_engine::FakeDriver>) {
    let packets = vec![
        Packet::new(VulkanCall::CreateCommandPool {
            device: DEVICE,
            queue_family_index: 0,
            flags: 0,
            recorded_pool: POOL,
        }),
        Packet::new(VulkanCall::AllocateCommandBuffers {
            device: DEVICE,
            command_pool: POOL,
            level: 0,
            recorded_buffers: vec![CB],
        }),
        Packet::new(VulkanCall::CreateBuffer {
            device: DEVICE,
            create_info: vkr_protocol::calls::SerializedBufferCreateInfo {
                flags: 0,
                size: 64,
                usage: 0x80,
                sharing_mode: 0,
                queue_family_indices: Vec::new(),
            },
            recorded_buffer: BUFFER,
        }),
    ];
    for packet in &packets {
        assert_eq!(replayer.replay_packet(packet), CallStatus::Success);
    }
}

#[test]
fn barrier_packet_survives_replay_unchanged() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    command_setup(&mut replayer);

    let packet = Packet::new(VulkanCall::CmdPipelineBarrier {
        command_buffer: CB,
        src_stage_mask: 0x1,
        dst_stage_mask: 0x8000,
        dependency_flags: 0,
        memory_barriers: Vec::new(),
        buffer_barriers: vec![SerializedBufferMemoryBarrier {
            src_access_mask: 0x40,
            dst_access_mask: 0x20,
            src_queue_family_index: u32::MAX,
            dst_queue_family_index: u32::MAX,
            buffer: BUFFER,
            offset: 0,
            size: 64,
        }],
        image_barriers: Vec::new(),
    });
    let before = packet.clone();

    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    assert_eq!(packet, before);

    // Idempotence: the untouched packet replays again with the same
    // outcome.
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    assert_eq!(packet, before);
}

#[test]
fn bind_vertex_buffers_packet_survives_replay_unchanged() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    command_setup(&mut replayer);

    let packet = Packet::new(VulkanCall::CmdBindVertexBuffers {
        command_buffer: CB,
        first_binding: 0,
        buffers: vec![BUFFER],
        offsets: vec![0],
    });
    let before = packet.clone();
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    assert_eq!(packet, before);
}

#[test]
fn submit_packet_survives_a_failed_remap_unchanged() {
    let mut replayer = replayer();
    bring_up_with_queue(&mut replayer);

    let packet = Packet::new(VulkanCall::QueueSubmit {
        queue: QUEUE,
        submits: vec![SerializedSubmitInfo {
            wait_semaphores: vec![RecordedHandle(0xdead)],
            wait_dst_stage_masks: vec![0x1],
            command_buffers: Vec::new(),
            signal_semaphores: Vec::new(),
        }],
        fence: RecordedHandle::NULL,
    });
    let before = packet.clone();

    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert_eq!(packet, before);
}

#[test]
fn blob_backed_packet_survives_replay_unchanged() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let mut blob = Blob::default();
    let data = blob.push_bytes(&[1, 2, 3, 4]);
    let allocate = Packet::new(VulkanCall::AllocateMemory {
        device: DEVICE,
        allocation_size: 4,
        memory_type_index: 0,
        recorded_memory: RecordedHandle(0x700),
    });
    let map = Packet::new(VulkanCall::MapMemory {
        device: DEVICE,
        memory: RecordedHandle(0x700),
        offset: 0,
        size: 4,
        flags: 0,
    });
    let unmap = Packet {
        call: VulkanCall::UnmapMemory {
            device: DEVICE,
            memory: RecordedHandle(0x700),
            data,
        },
        recorded_result: 0,
        blob,
    };
    let before = unmap.clone();

    for packet in [&allocate, &map, &unmap] {
        assert_eq!(replayer.replay_packet(packet), CallStatus::Success);
    }
    assert_eq!(unmap, before);
}
