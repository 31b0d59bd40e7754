//! Instance/device creation rewriting: platform extension substitution and
//! screenshot-layer injection, with the packet left untouched.

mod common;

use common::*;
use vkr_core::{CallStatus, ReplaySettings};
use vkr_engine::{FakeCall, HOST_SURFACE_EXTENSION, SCREENSHOT_LAYER};

fn instance_extensions_seen(driver_calls: &[FakeCall]) -> Vec<String> {
    driver_calls
        .iter()
        .find_map(|c| match c {
            FakeCall::CreateInstance { extensions, .. } => Some(extensions.clone()),
            _ => None,
        })
        .expect("driver never saw vkCreateInstance")
}

fn instance_layers_seen(driver_calls: &[FakeCall]) -> Vec<String> {
    driver_calls
        .iter()
        .find_map(|c| match c {
            FakeCall::CreateInstance { layers, .. } => Some(layers.clone()),
            _ => None,
        })
        .expect("driver never saw vkCreateInstance")
}

#[cfg(not(target_os = "windows"))]
#[test]
fn foreign_surface_extension_is_substituted() {
    let mut replayer = replayer();
    let packet = instance_create_packet(&[], &["VK_KHR_win32_surface"]);
    let before = packet.clone();

    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let seen = instance_extensions_seen(&replayer.driver().calls);
    assert_eq!(seen, vec![HOST_SURFACE_EXTENSION.to_string()]);
    // The packet is immutable by contract.
    assert_eq!(packet, before);
}

#[test]
fn unrelated_extensions_pass_through() {
    let mut replayer = replayer();
    let packet = instance_create_packet(
        &[],
        &["VK_KHR_get_physical_device_properties2", HOST_SURFACE_EXTENSION],
    );
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let seen = instance_extensions_seen(&replayer.driver().calls);
    assert_eq!(
        seen,
        vec![
            HOST_SURFACE_EXTENSION.to_string(),
            "VK_KHR_get_physical_device_properties2".to_string(),
        ]
    );
}

#[test]
fn screenshot_layer_is_injected_when_installed() {
    let settings = ReplaySettings {
        screenshot_list: Some("0-10".to_string()),
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);
    replayer.driver_mut().install_layer(SCREENSHOT_LAYER);

    let packet = instance_create_packet(&[], &[]);
    let before = packet.clone();
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let layers = instance_layers_seen(&replayer.driver().calls);
    assert_eq!(layers, vec![SCREENSHOT_LAYER.to_string()]);
    assert_eq!(packet, before);
}

#[test]
fn screenshot_layer_is_skipped_when_not_installed() {
    let settings = ReplaySettings {
        screenshot_list: Some("0-10".to_string()),
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);

    let packet = instance_create_packet(&[], &[]);
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let layers = instance_layers_seen(&replayer.driver().calls);
    assert!(layers.is_empty());
}

#[test]
fn screenshot_layer_is_not_duplicated() {
    let settings = ReplaySettings {
        screenshot_list: Some("0".to_string()),
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);
    replayer.driver_mut().install_layer(SCREENSHOT_LAYER);

    let packet = instance_create_packet(&[SCREENSHOT_LAYER], &[]);
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let layers = instance_layers_seen(&replayer.driver().calls);
    assert_eq!(layers, vec![SCREENSHOT_LAYER.to_string()]);
}

#[test]
fn device_creation_injects_screenshot_layer() {
    let settings = ReplaySettings {
        screenshot_list: Some("0".to_string()),
        ..Default::default()
    };
    let mut replayer = replayer_with(settings);
    replayer.driver_mut().install_layer(SCREENSHOT_LAYER);
    bring_up(&mut replayer);

    let layers = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            FakeCall::CreateDevice { layers, .. } => Some(layers.clone()),
            _ => None,
        })
        .expect("driver never saw vkCreateDevice");
    assert_eq!(layers, vec![SCREENSHOT_LAYER.to_string()]);
}
