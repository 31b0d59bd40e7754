//! Surfaces, swapchains, and presentation.
//!
//! Surface-creation packets discard the recorded window-system parameters
//! entirely; the display adapter's live window stands in for whatever
//! connection/window the recording machine used. Extent-bearing calls
//! resize the replay window to match the recording.

use ash::vk;
use tracing::{debug, error, warn};
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedExtent2D, SerializedPresentInfo, SerializedSwapchainCreateInfo,
};
use vkr_protocol::RecordedHandle;

use super::extent_2d;
use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

impl<D: VulkanDriver> VulkanReplayer<D> {
    /// Shared by the per-windowing-system surface packets; all of them
    /// collapse onto the replay host's one window.
    pub(crate) fn create_window_surface(
        &mut self,
        instance: RecordedHandle,
        recorded_surface: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live_instance = self.maps.instances.remap(instance)?;
        let display = self.display.as_ref().ok_or_else(|| {
            ReplayError::Display("surface packet replayed without a display adapter".into())
        })?;
        let display_handle = display.raw_display_handle()?;
        let window_handle = display.raw_window_handle()?;

        let (result, surface) =
            self.driver
                .create_window_surface(live_instance, display_handle, window_handle);
        if result == vk::Result::SUCCESS {
            self.maps.surfaces.insert(recorded_surface, surface);
        }
        Ok(result)
    }

    pub(crate) fn destroy_surface(
        &mut self,
        instance: RecordedHandle,
        surface: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live_instance = self.maps.instances.remap(instance)?;
        let live_surface = self.maps.surfaces.remap(surface)?;
        self.driver.destroy_surface(live_instance, live_surface);
        self.maps.surfaces.remove(surface);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn get_surface_support(
        &mut self,
        physical_device: RecordedHandle,
        queue_family_index: u32,
        surface: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let pd = self.maps.physical_devices.remap(physical_device)?;
        let live_surface = self.maps.surfaces.remap(surface)?;
        let (result, supported) = self
            .driver
            .get_surface_support(pd, queue_family_index, live_surface);
        if result == vk::Result::SUCCESS && !supported {
            warn!(
                queue_family_index,
                "replay surface is not presentable from the recorded queue family"
            );
        }
        Ok(result)
    }

    pub(crate) fn get_surface_capabilities(
        &mut self,
        physical_device: RecordedHandle,
        surface: RecordedHandle,
        recorded_current_extent: SerializedExtent2D,
    ) -> Result<vk::Result, ReplayError> {
        let pd = self.maps.physical_devices.remap(physical_device)?;
        let live_surface = self.maps.surfaces.remap(surface)?;
        if let Some(display) = self.display.as_mut() {
            display.resize(recorded_current_extent.width, recorded_current_extent.height);
        }
        let (result, _caps) = self.driver.get_surface_capabilities(pd, live_surface);
        Ok(result)
    }

    pub(crate) fn get_surface_formats(
        &mut self,
        physical_device: RecordedHandle,
        surface: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let pd = self.maps.physical_devices.remap(physical_device)?;
        let live_surface = self.maps.surfaces.remap(surface)?;
        let (result, _formats) = self.driver.get_surface_formats(pd, live_surface);
        Ok(result)
    }

    pub(crate) fn get_surface_present_modes(
        &mut self,
        physical_device: RecordedHandle,
        surface: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let pd = self.maps.physical_devices.remap(physical_device)?;
        let live_surface = self.maps.surfaces.remap(surface)?;
        let (result, _modes) = self.driver.get_surface_present_modes(pd, live_surface);
        Ok(result)
    }

    pub(crate) fn create_swapchain(
        &mut self,
        device: RecordedHandle,
        info: &SerializedSwapchainCreateInfo,
        recorded_swapchain: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let surface = self.maps.surfaces.remap(info.surface)?;
        let old_swapchain = self.maps.swapchains.remap(info.old_swapchain)?;

        if let Some(display) = self.display.as_mut() {
            display.resize(info.image_extent.width, info.image_extent.height);
        }

        let vk_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(info.min_image_count)
            .image_format(vk::Format::from_raw(info.image_format))
            .image_color_space(vk::ColorSpaceKHR::from_raw(info.image_color_space))
            .image_extent(extent_2d(&info.image_extent))
            .image_array_layers(info.image_array_layers)
            .image_usage(vk::ImageUsageFlags::from_raw(info.image_usage))
            .image_sharing_mode(vk::SharingMode::from_raw(info.image_sharing_mode))
            .queue_family_indices(&info.queue_family_indices)
            .pre_transform(vk::SurfaceTransformFlagsKHR::from_raw(info.pre_transform))
            .composite_alpha(vk::CompositeAlphaFlagsKHR::from_raw(info.composite_alpha))
            .present_mode(vk::PresentModeKHR::from_raw(info.present_mode))
            .clipped(info.clipped)
            .old_swapchain(old_swapchain);

        let (result, swapchain) = self.driver.create_swapchain(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.swapchains.insert(recorded_swapchain, swapchain);
        }
        Ok(result)
    }

    pub(crate) fn destroy_swapchain(
        &mut self,
        device: RecordedHandle,
        swapchain: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_swapchain = self.maps.swapchains.remap(swapchain)?;
        self.driver.destroy_swapchain(live, live_swapchain);
        self.maps.swapchains.remove(swapchain);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn get_swapchain_images(
        &mut self,
        device: RecordedHandle,
        swapchain: RecordedHandle,
        recorded_images: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_swapchain = self.maps.swapchains.remap(swapchain)?;
        let (result, images) = self.driver.get_swapchain_images(live, live_swapchain);
        if result == vk::Result::SUCCESS {
            if images.len() != recorded_images.len() {
                warn!(
                    "swapchain image count mismatched in replay {} versus trace {}",
                    images.len(),
                    recorded_images.len()
                );
            }
            for (recorded, image) in recorded_images.iter().zip(images.iter()) {
                self.maps.images.insert(*recorded, *image);
            }
        }
        Ok(result)
    }

    pub(crate) fn acquire_next_image(
        &mut self,
        device: RecordedHandle,
        swapchain: RecordedHandle,
        timeout: u64,
        semaphore: RecordedHandle,
        fence: RecordedHandle,
        recorded_image_index: u32,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_swapchain = self.maps.swapchains.remap(swapchain)?;
        let live_semaphore = self.maps.semaphores.remap(semaphore)?;
        let live_fence = self.maps.fences.remap(fence)?;

        let (result, index) =
            self.driver
                .acquire_next_image(live, live_swapchain, timeout, live_semaphore, live_fence);
        if result == vk::Result::SUCCESS && index != recorded_image_index {
            debug!(
                "acquired swapchain image {index}, trace recorded {recorded_image_index}"
            );
        }
        Ok(result)
    }

    pub(crate) fn queue_present(
        &mut self,
        queue: RecordedHandle,
        present_info: &SerializedPresentInfo,
    ) -> Result<vk::Result, ReplayError> {
        let live_queue = self.maps.queues.remap(queue)?;
        let swapchains = present_info
            .swapchains
            .iter()
            .map(|h| self.maps.swapchains.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        let wait_semaphores = present_info
            .wait_semaphores
            .iter()
            .map(|h| self.maps.semaphores.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;

        let mut live_results = vec![vk::Result::SUCCESS; swapchains.len()];
        let mut vk_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&present_info.image_indices);
        // The trace only gets per-swapchain results if the recorded call
        // asked for them.
        let compare_results = present_info.results.is_some();
        if compare_results {
            vk_info = vk_info.results(&mut live_results);
        }

        let result = self.driver.queue_present(live_queue, &vk_info);
        self.frame_number += 1;

        if let Some(recorded) = &present_info.results {
            for (i, (live, recorded)) in live_results.iter().zip(recorded.iter()).enumerate() {
                if live.as_raw() != *recorded {
                    error!(
                        "return value {:?} from API call (vkQueuePresentKHR) does not match return value from trace file {:?} for swapchain {}",
                        live,
                        vk::Result::from_raw(*recorded),
                        i
                    );
                    self.result_mismatches += 1;
                }
            }
        }
        Ok(result)
    }
}
