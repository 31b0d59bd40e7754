//! Instance bring-up and teardown.
//!
//! Instance creation is the one place the recorded call cannot be forwarded
//! verbatim: the record platform's windowing extension has to be replaced
//! with the replay host's, and a screenshot layer may be injected when the
//! settings ask for one and the host has it installed.

use std::ffi::CString;

use ash::vk;
use tracing::{error, info, warn};
use vkr_core::ReplayError;
use vkr_protocol::calls::SerializedInstanceCreateInfo;
use vkr_protocol::RecordedHandle;

use super::to_cstring;
use crate::driver::{ApplicationDesc, VulkanDriver};
use crate::messages;
use crate::replayer::VulkanReplayer;

/// Layer injected when a screenshot frame list is configured.
pub const SCREENSHOT_LAYER: &str = "VK_LAYER_LUNARG_screenshot";

/// Surface extension of the replay host's windowing system.
#[cfg(target_os = "windows")]
pub const HOST_SURFACE_EXTENSION: &str = "VK_KHR_win32_surface";
#[cfg(target_os = "macos")]
pub const HOST_SURFACE_EXTENSION: &str = "VK_EXT_metal_surface";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const HOST_SURFACE_EXTENSION: &str = "VK_KHR_xcb_surface";

/// Windowing extensions from other platforms, dropped from recorded lists.
#[cfg(target_os = "windows")]
const FOREIGN_SURFACE_EXTENSIONS: &[&str] = &[
    "VK_KHR_xlib_surface",
    "VK_KHR_xcb_surface",
    "VK_KHR_wayland_surface",
    "VK_KHR_mir_surface",
];
#[cfg(target_os = "macos")]
const FOREIGN_SURFACE_EXTENSIONS: &[&str] = &[
    "VK_KHR_win32_surface",
    "VK_KHR_xlib_surface",
    "VK_KHR_xcb_surface",
    "VK_KHR_wayland_surface",
];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const FOREIGN_SURFACE_EXTENSIONS: &[&str] = &["VK_KHR_win32_surface"];

/// Rewrite a recorded extension list for the replay host: the host's
/// surface extension is always enabled, extensions foreign to this platform
/// are dropped, everything else passes through.
fn filter_surface_extensions(recorded: &[String]) -> Result<Vec<CString>, ReplayError> {
    let mut names = vec![to_cstring(HOST_SURFACE_EXTENSION)?];
    for ext in recorded {
        if ext == HOST_SURFACE_EXTENSION || FOREIGN_SURFACE_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        names.push(to_cstring(ext)?);
    }
    Ok(names)
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_instance(
        &mut self,
        info: &SerializedInstanceCreateInfo,
        recorded_instance: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let mut layers = Vec::with_capacity(info.enabled_layers.len() + 1);
        for name in &info.enabled_layers {
            layers.push(to_cstring(name)?);
        }
        if self.settings.screenshot_list.is_some()
            && !info.enabled_layers.iter().any(|l| l == SCREENSHOT_LAYER)
        {
            let available = self.driver.enumerate_instance_layers();
            if available.iter().any(|l| l == SCREENSHOT_LAYER) {
                info!("enabling {SCREENSHOT_LAYER}");
                layers.push(to_cstring(SCREENSHOT_LAYER)?);
            }
        }

        let extensions = filter_surface_extensions(&info.enabled_extensions)?;
        let app = ApplicationDesc {
            application_name: info
                .application_name
                .as_deref()
                .map(to_cstring)
                .transpose()?,
            application_version: info.application_version,
            engine_name: info.engine_name.as_deref().map(to_cstring).transpose()?,
            engine_version: info.engine_version,
            api_version: info.api_version,
        };

        let (result, instance) = self.driver.create_instance(&app, &layers, &extensions);
        if result == vk::Result::SUCCESS {
            self.maps.instances.insert(recorded_instance, instance);
        }
        Ok(result)
    }

    pub(crate) fn destroy_instance(
        &mut self,
        instance: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.instances.remap(instance)?;
        self.driver.destroy_instance(live);
        self.maps.instances.remove(instance);
        if self.maps.instances.is_empty() {
            // Physical devices have no destroy call; they die with their
            // instance.
            self.maps.physical_devices.clear();
        }
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn enumerate_physical_devices(
        &mut self,
        instance: RecordedHandle,
        recorded_devices: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.instances.remap(instance)?;
        let (result, devices) = self.driver.enumerate_physical_devices(live);
        if result != vk::Result::SUCCESS {
            return Ok(result);
        }

        if devices.is_empty() {
            error!("vkEnumeratePhysicalDevices found zero GPUs");
        } else if devices.len() != recorded_devices.len() {
            warn!(
                "number of physical devices mismatched in replay {} versus trace {}",
                devices.len(),
                recorded_devices.len()
            );
        }
        // Correlation is by index; a replay on different hardware keeps
        // going with whatever lines up.
        for (recorded, live) in recorded_devices.iter().zip(devices.iter()) {
            self.maps.physical_devices.insert(*recorded, *live);
        }
        Ok(result)
    }

    pub(crate) fn create_debug_report_callback(
        &mut self,
        instance: RecordedHandle,
        flags: u32,
        recorded_callback: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live_instance = self.maps.instances.remap(instance)?;
        if !self.capture_validation {
            // No message sink registered: accept the packet and discard it.
            return Ok(vk::Result::SUCCESS);
        }

        let (result, callback) = self.driver.create_debug_report_callback(
            live_instance,
            vk::DebugReportFlagsEXT::from_raw(flags),
            Some(messages::debug_report_callback),
            self.messages.user_data(),
        );
        if result == vk::Result::SUCCESS && !recorded_callback.is_null() {
            self.maps.debug_callbacks.insert(recorded_callback, callback);
        }
        Ok(result)
    }

    pub(crate) fn destroy_debug_report_callback(
        &mut self,
        instance: RecordedHandle,
        callback: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live_instance = self.maps.instances.remap(instance)?;
        if !self.capture_validation {
            return Ok(vk::Result::SUCCESS);
        }
        let live = self.maps.debug_callbacks.remap(callback)?;
        self.driver.destroy_debug_report_callback(live_instance, live);
        self.maps.debug_callbacks.remove(callback);
        Ok(vk::Result::SUCCESS)
    }
}
