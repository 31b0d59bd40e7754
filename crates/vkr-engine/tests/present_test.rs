//! Surface/swapchain rebinding and per-swapchain present result
//! comparison.

mod common;

use common::*;
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use vkr_core::{CallStatus, DisplayConfig, ReplaySettings};
use vkr_engine::{DisplayAdapter, FakeCall, FakeDriver, VulkanReplayer};
use vkr_protocol::calls::{
    SerializedExtent2D, SerializedPresentInfo, SerializedSwapchainCreateInfo,
};
use vkr_protocol::{Packet, RecordedHandle, VulkanCall};

const SURFACE: RecordedHandle = RecordedHandle(0x300);
const SWAPCHAIN: RecordedHandle = RecordedHandle(0x301);
const IMAGE_0: RecordedHandle = RecordedHandle(0x310);
const IMAGE_1: RecordedHandle = RecordedHandle(0x311);
const IMAGE_2: RecordedHandle = RecordedHandle(0x312);

fn replayer_with_display() -> VulkanReplayer<FakeDriver> {
    // The embedder-supplied-window path: no live window is opened.
    let display = RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0));
    let window = RawWindowHandle::Xlib(XlibWindowHandle::new(0x5005));
    let adapter = DisplayAdapter::from_raw_handles(display, window, &DisplayConfig::default());
    VulkanReplayer::new(FakeDriver::new(), ReplaySettings::default(), Some(adapter))
}

fn surface_packet() -> Packet {
    // Recorded window-system parameters are junk on this host by
    // definition; the handler must discard them.
    Packet::new(VulkanCall::CreateXcbSurface {
        instance: INSTANCE,
        connection: 0xdead_beef,
        window: 7,
        recorded_surface: SURFACE,
    })
}

fn swapchain_packet() -> Packet {
    Packet::new(VulkanCall::CreateSwapchain {
        device: DEVICE,
        create_info: SerializedSwapchainCreateInfo {
            surface: SURFACE,
            min_image_count: 3,
            image_format: 44,
            image_color_space: 0,
            image_extent: SerializedExtent2D {
                width: 640,
                height: 480,
            },
            image_array_layers: 1,
            image_usage: 0x10,
            image_sharing_mode: 0,
            queue_family_indices: Vec::new(),
            pre_transform: 1,
            composite_alpha: 1,
            present_mode: 2,
            clipped: true,
            old_swapchain: RecordedHandle::NULL,
        },
        recorded_swapchain: SWAPCHAIN,
    })
}

fn images_packet() -> Packet {
    Packet::new(VulkanCall::GetSwapchainImages {
        device: DEVICE,
        swapchain: SWAPCHAIN,
        recorded_images: vec![IMAGE_0, IMAGE_1, IMAGE_2],
    })
}

fn present_packet(recorded_results: Option<Vec<i32>>) -> Packet {
    Packet::new(VulkanCall::QueuePresent {
        queue: QUEUE,
        present_info: SerializedPresentInfo {
            wait_semaphores: Vec::new(),
            swapchains: vec![SWAPCHAIN],
            image_indices: vec![0],
            results: recorded_results,
        },
    })
}

fn bring_up_swapchain(replayer: &mut VulkanReplayer<FakeDriver>) {
    bring_up_with_queue(replayer);
    for packet in [surface_packet(), swapchain_packet(), images_packet()] {
        assert_eq!(
            replayer.replay_packet(&packet),
            CallStatus::Success,
            "failed replaying {}",
            packet.entry_point()
        );
    }
}

#[test]
fn recorded_window_parameters_are_discarded() {
    let mut replayer = replayer_with_display();
    bring_up_swapchain(&mut replayer);

    assert!(replayer.driver().invoked("vkCreateSurfaceKHR"));
    assert!(replayer.object_maps().surfaces.contains(SURFACE));
    assert!(replayer.object_maps().swapchains.contains(SWAPCHAIN));
    assert!(replayer.object_maps().images.contains(IMAGE_0));
    assert!(replayer.object_maps().images.contains(IMAGE_2));
}

#[test]
fn surface_packet_without_display_is_an_error() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    assert_eq!(replayer.replay_packet(&surface_packet()), CallStatus::Error);
    assert!(!replayer.driver().invoked("vkCreateSurfaceKHR"));
}

#[test]
fn present_remaps_swapchains_and_counts_frames() {
    let mut replayer = replayer_with_display();
    bring_up_swapchain(&mut replayer);

    assert_eq!(replayer.replay_packet(&present_packet(None)), CallStatus::Success);
    assert_eq!(replayer.frame_number(), 1);
    assert_eq!(replayer.result_mismatches(), 0);

    use ash::vk::Handle;
    let live_swapchain = replayer.object_maps().swapchains.lookup(SWAPCHAIN).as_raw();
    let presented = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            FakeCall::QueuePresent { swapchains, .. } => Some(swapchains.clone()),
            _ => None,
        })
        .expect("driver never saw vkQueuePresentKHR");
    assert_eq!(presented, vec![live_swapchain]);
}

#[test]
fn mismatched_present_result_is_reported_once() {
    let mut replayer = replayer_with_display();
    bring_up_swapchain(&mut replayer);

    replayer
        .driver_mut()
        .script_present_results(vec![ash::vk::Result::ERROR_OUT_OF_DATE_KHR]);

    let recorded = Some(vec![ash::vk::Result::SUCCESS.as_raw()]);
    let status = replayer.replay_packet(&present_packet(recorded));

    // The call-level result still matched; only the per-swapchain slot
    // differs, which logs one error and keeps the run going.
    assert_eq!(status, CallStatus::Success);
    assert_eq!(replayer.result_mismatches(), 1);
    assert_eq!(replayer.frame_number(), 1);
}

#[test]
fn matching_present_results_report_nothing() {
    let mut replayer = replayer_with_display();
    bring_up_swapchain(&mut replayer);

    let recorded = Some(vec![ash::vk::Result::SUCCESS.as_raw()]);
    let status = replayer.replay_packet(&present_packet(recorded));
    assert_eq!(status, CallStatus::Success);
    assert_eq!(replayer.result_mismatches(), 0);
    assert_eq!(replayer.frame_number(), 1);
}

#[test]
fn present_with_unknown_wait_semaphore_is_skipped() {
    let mut replayer = replayer_with_display();
    bring_up_swapchain(&mut replayer);

    let packet = Packet::new(VulkanCall::QueuePresent {
        queue: QUEUE,
        present_info: SerializedPresentInfo {
            wait_semaphores: vec![RecordedHandle(0xdead)],
            swapchains: vec![SWAPCHAIN],
            image_indices: vec![0],
            results: None,
        },
    });
    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkQueuePresentKHR"));
    assert_eq!(replayer.frame_number(), 0);
}
