//! Memory-shadow write-through: bytes the trace recorded at unmap/flush
//! time must land in driver-visible memory, immediately in the default mode
//! and via staged shadow buffers in adjust-for-GPU mode.

mod common;

use common::*;
use vkr_core::{CallStatus, ReplaySettings};
use vkr_protocol::calls::{SerializedBufferCreateInfo, SerializedMappedMemoryRange};
use vkr_protocol::{Blob, Packet, RecordedHandle, VulkanCall};

const MEMORY: RecordedHandle = RecordedHandle(0x100);
const BUFFER: RecordedHandle = RecordedHandle(0x101);
const ALLOC_SIZE: u64 = 4096;

fn ramp(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xff) as u8).collect()
}

fn allocate_packet() -> Packet {
    Packet::new(VulkanCall::AllocateMemory {
        device: DEVICE,
        allocation_size: ALLOC_SIZE,
        memory_type_index: 0,
        recorded_memory: MEMORY,
    })
}

fn map_packet(offset: u64, size: u64) -> Packet {
    Packet::new(VulkanCall::MapMemory {
        device: DEVICE,
        memory: MEMORY,
        offset,
        size,
        flags: 0,
    })
}

fn unmap_packet(bytes: &[u8]) -> Packet {
    let mut blob = Blob::default();
    let data = blob.push_bytes(bytes);
    Packet {
        call: VulkanCall::UnmapMemory {
            device: DEVICE,
            memory: MEMORY,
            data,
        },
        recorded_result: 0,
        blob,
    }
}

fn flush_packet(offset: u64, bytes: &[u8]) -> Packet {
    let mut blob = Blob::default();
    let data = blob.push_bytes(bytes);
    Packet {
        call: VulkanCall::FlushMappedMemoryRanges {
            device: DEVICE,
            ranges: vec![SerializedMappedMemoryRange {
                memory: MEMORY,
                offset,
                size: bytes.len() as u64,
                data,
            }],
        },
        recorded_result: 0,
        blob,
    }
}

fn buffer_packets() -> Vec<Packet> {
    vec![
        Packet::new(VulkanCall::CreateBuffer {
            device: DEVICE,
            create_info: SerializedBufferCreateInfo {
                flags: 0,
                size: ALLOC_SIZE,
                usage: 0x20,
                sharing_mode: 0,
                queue_family_indices: Vec::new(),
            },
            recorded_buffer: BUFFER,
        }),
        Packet::new(VulkanCall::BindBufferMemory {
            device: DEVICE,
            buffer: BUFFER,
            memory: MEMORY,
            offset: 0,
        }),
    ]
}

#[test]
fn unmap_writes_recorded_bytes_through() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let bytes = ramp(ALLOC_SIZE as usize);
    for packet in [allocate_packet(), map_packet(0, ALLOC_SIZE), unmap_packet(&bytes)] {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    let live = replayer
        .memory_shadow()
        .entry(MEMORY)
        .expect("allocation record missing")
        .live();
    let backing = replayer
        .driver()
        .memory_bytes(live)
        .expect("driver has no backing store");
    assert_eq!(backing, &bytes[..]);
}

#[test]
fn flush_writes_each_range_through() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    for packet in [allocate_packet(), map_packet(0, ALLOC_SIZE)] {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    let bytes = ramp(256);
    assert_eq!(
        replayer.replay_packet(&flush_packet(512, &bytes)),
        CallStatus::Success
    );
    assert!(replayer.driver().invoked("vkFlushMappedMemoryRanges"));

    let live = replayer.memory_shadow().entry(MEMORY).unwrap().live();
    let backing = replayer.driver().memory_bytes(live).unwrap();
    assert_eq!(&backing[512..768], &bytes[..]);
    assert!(backing[..512].iter().all(|b| *b == 0));
}

#[test]
fn whole_size_mapping_resolves_against_allocation() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    let bytes = ramp(ALLOC_SIZE as usize);
    for packet in [
        allocate_packet(),
        map_packet(0, ash::vk::WHOLE_SIZE),
        unmap_packet(&bytes),
    ] {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    let live = replayer.memory_shadow().entry(MEMORY).unwrap().live();
    assert_eq!(replayer.driver().memory_bytes(live).unwrap(), &bytes[..]);
}

#[test]
fn adjust_for_gpu_defers_the_allocation() {
    let settings = ReplaySettings {
        adjust_for_gpu: true,
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);
    bring_up(&mut replayer);

    let bytes = ramp(ALLOC_SIZE as usize);
    for packet in [allocate_packet(), map_packet(0, ALLOC_SIZE), unmap_packet(&bytes)] {
        assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    }

    // Nothing driver-backed yet; the bytes are staged in the shadow buffer.
    assert!(!replayer.driver().invoked("vkAllocateMemory"));
    let entry = replayer.memory_shadow().entry(MEMORY).unwrap();
    assert!(entry.is_pending());
    assert_eq!(entry.shadow_bytes().unwrap(), &bytes[..]);
}

#[test]
fn first_bind_materializes_and_replays_staged_bytes() {
    let settings = ReplaySettings {
        adjust_for_gpu: true,
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);
    bring_up(&mut replayer);

    let bytes = ramp(ALLOC_SIZE as usize);
    let mut packets = vec![allocate_packet(), map_packet(0, ALLOC_SIZE), unmap_packet(&bytes)];
    packets.extend(buffer_packets());
    for packet in &packets {
        assert_eq!(replayer.replay_packet(packet), CallStatus::Success);
    }

    assert!(replayer.driver().invoked("vkAllocateMemory"));
    assert!(replayer.driver().invoked("vkBindBufferMemory"));

    let entry = replayer.memory_shadow().entry(MEMORY).unwrap();
    assert!(!entry.is_pending());
    let backing = replayer.driver().memory_bytes(entry.live()).unwrap();
    assert_eq!(backing, &bytes[..]);
}

#[test]
fn free_releases_the_record() {
    let mut replayer = replayer();
    bring_up(&mut replayer);

    assert_eq!(replayer.replay_packet(&allocate_packet()), CallStatus::Success);
    assert_eq!(replayer.memory_shadow().len(), 1);
    assert_eq!(replayer.driver().live_allocations(), 1);

    let free = Packet::new(VulkanCall::FreeMemory {
        device: DEVICE,
        memory: MEMORY,
    });
    assert_eq!(replayer.replay_packet(&free), CallStatus::Success);
    assert!(replayer.memory_shadow().is_empty());
    assert_eq!(replayer.driver().live_allocations(), 0);
}
