//! Device creation and the queue-level calls dispatched on it.

use ash::vk;
use tracing::{info, warn};
use vkr_core::ReplayError;
use vkr_protocol::calls::{SerializedDeviceCreateInfo, SerializedSubmitInfo};
use vkr_protocol::{Blob, RecordedHandle};

use super::instance::SCREENSHOT_LAYER;
use super::to_cstring;
use crate::driver::{QueueRequest, VulkanDriver};
use crate::replayer::VulkanReplayer;

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_device(
        &mut self,
        physical_device: RecordedHandle,
        info: &SerializedDeviceCreateInfo,
        recorded_device: RecordedHandle,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let physical_device = self.maps.physical_devices.remap(physical_device)?;

        let mut layers = Vec::with_capacity(info.enabled_layers.len() + 1);
        for name in &info.enabled_layers {
            layers.push(to_cstring(name)?);
        }
        if self.settings.screenshot_list.is_some()
            && !info.enabled_layers.iter().any(|l| l == SCREENSHOT_LAYER)
        {
            let available = self.driver.enumerate_device_layers(physical_device);
            if available.iter().any(|l| l == SCREENSHOT_LAYER) {
                info!("enabling {SCREENSHOT_LAYER} on the device");
                layers.push(to_cstring(SCREENSHOT_LAYER)?);
            }
        }

        let mut extensions = Vec::with_capacity(info.enabled_extensions.len());
        for name in &info.enabled_extensions {
            extensions.push(to_cstring(name)?);
        }

        let queues: Vec<QueueRequest> = info
            .queue_create_infos
            .iter()
            .map(|q| QueueRequest {
                queue_family_index: q.queue_family_index,
                priorities: q.queue_priorities.clone(),
            })
            .collect();

        let features = match info.enabled_features {
            Some(range) => {
                let raw = blob.bytes(range)?;
                if raw.len() == std::mem::size_of::<vk::PhysicalDeviceFeatures>() {
                    Some(unsafe {
                        std::ptr::read_unaligned(raw.as_ptr() as *const vk::PhysicalDeviceFeatures)
                    })
                } else {
                    warn!(
                        "recorded VkPhysicalDeviceFeatures has {} bytes, expected {}",
                        raw.len(),
                        std::mem::size_of::<vk::PhysicalDeviceFeatures>()
                    );
                    None
                }
            }
            None => None,
        };

        let (result, device) =
            self.driver
                .create_device(physical_device, &queues, &layers, &extensions, features.as_ref());
        if result == vk::Result::SUCCESS {
            self.maps.devices.insert(recorded_device, device);
        }
        Ok(result)
    }

    pub(crate) fn destroy_device(
        &mut self,
        device: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        self.driver.destroy_device(live);
        self.maps.devices.remove(device);
        if self.maps.devices.is_empty() {
            // Queues are obtained, never destroyed; they die with their
            // device.
            self.maps.queues.clear();
        }
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn get_device_queue(
        &mut self,
        device: RecordedHandle,
        queue_family_index: u32,
        queue_index: u32,
        recorded_queue: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let queue = self
            .driver
            .get_device_queue(live, queue_family_index, queue_index);
        if !recorded_queue.is_null() && queue != vk::Queue::null() {
            self.maps.queues.insert(recorded_queue, queue);
        }
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn device_wait_idle(
        &mut self,
        device: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        Ok(self.driver.device_wait_idle(live))
    }

    pub(crate) fn queue_submit(
        &mut self,
        queue: RecordedHandle,
        submits: &[SerializedSubmitInfo],
        fence: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let queue = self.maps.queues.remap(queue)?;
        let fence = self.maps.fences.remap(fence)?;

        // Deep copy: every submit's handle arrays are rebuilt before the
        // driver sees any of them, so a failed remap forwards nothing.
        struct SubmitScratch {
            command_buffers: Vec<vk::CommandBuffer>,
            wait_semaphores: Vec<vk::Semaphore>,
            wait_stage_masks: Vec<vk::PipelineStageFlags>,
            signal_semaphores: Vec<vk::Semaphore>,
        }

        let mut scratch = Vec::with_capacity(submits.len());
        for submit in submits {
            let command_buffers = submit
                .command_buffers
                .iter()
                .map(|h| self.maps.command_buffers.remap(*h))
                .collect::<Result<Vec<_>, _>>()?;
            let wait_semaphores = submit
                .wait_semaphores
                .iter()
                .map(|h| self.maps.semaphores.remap(*h))
                .collect::<Result<Vec<_>, _>>()?;
            let signal_semaphores = submit
                .signal_semaphores
                .iter()
                .map(|h| self.maps.semaphores.remap(*h))
                .collect::<Result<Vec<_>, _>>()?;
            let wait_stage_masks = submit
                .wait_dst_stage_masks
                .iter()
                .map(|m| vk::PipelineStageFlags::from_raw(*m))
                .collect();
            scratch.push(SubmitScratch {
                command_buffers,
                wait_semaphores,
                wait_stage_masks,
                signal_semaphores,
            });
        }

        let infos: Vec<vk::SubmitInfo> = scratch
            .iter()
            .map(|s| {
                vk::SubmitInfo::default()
                    .wait_semaphores(&s.wait_semaphores)
                    .wait_dst_stage_mask(&s.wait_stage_masks)
                    .command_buffers(&s.command_buffers)
                    .signal_semaphores(&s.signal_semaphores)
            })
            .collect();

        Ok(self.driver.queue_submit(queue, &infos, fence))
    }

    pub(crate) fn queue_wait_idle(
        &mut self,
        queue: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.queues.remap(queue)?;
        Ok(self.driver.queue_wait_idle(live))
    }
}
