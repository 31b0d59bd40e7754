//! Fences, semaphores, and events.

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::RecordedHandle;

use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_fence(
        &mut self,
        device: RecordedHandle,
        signaled: bool,
        recorded_fence: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let (result, fence) = self.driver.create_fence(live, signaled);
        if result == vk::Result::SUCCESS {
            self.maps.fences.insert(recorded_fence, fence);
        }
        Ok(result)
    }

    pub(crate) fn destroy_fence(
        &mut self,
        device: RecordedHandle,
        fence: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_fence = self.maps.fences.remap(fence)?;
        self.driver.destroy_fence(live, live_fence);
        self.maps.fences.remove(fence);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn wait_for_fences(
        &mut self,
        device: RecordedHandle,
        fences: &[RecordedHandle],
        wait_all: bool,
        timeout: u64,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_fences = fences
            .iter()
            .map(|h| self.maps.fences.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .driver
            .wait_for_fences(live, &live_fences, wait_all, timeout))
    }

    pub(crate) fn reset_fences(
        &mut self,
        device: RecordedHandle,
        fences: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_fences = fences
            .iter()
            .map(|h| self.maps.fences.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.driver.reset_fences(live, &live_fences))
    }

    pub(crate) fn get_fence_status(
        &mut self,
        device: RecordedHandle,
        fence: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_fence = self.maps.fences.remap(fence)?;
        Ok(self.driver.get_fence_status(live, live_fence))
    }

    pub(crate) fn create_semaphore(
        &mut self,
        device: RecordedHandle,
        recorded_semaphore: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let (result, semaphore) = self.driver.create_semaphore(live);
        if result == vk::Result::SUCCESS {
            self.maps.semaphores.insert(recorded_semaphore, semaphore);
        }
        Ok(result)
    }

    pub(crate) fn destroy_semaphore(
        &mut self,
        device: RecordedHandle,
        semaphore: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_semaphore = self.maps.semaphores.remap(semaphore)?;
        self.driver.destroy_semaphore(live, live_semaphore);
        self.maps.semaphores.remove(semaphore);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_event(
        &mut self,
        device: RecordedHandle,
        recorded_event: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let (result, event) = self.driver.create_event(live);
        if result == vk::Result::SUCCESS {
            self.maps.events.insert(recorded_event, event);
        }
        Ok(result)
    }

    pub(crate) fn destroy_event(
        &mut self,
        device: RecordedHandle,
        event: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_event = self.maps.events.remap(event)?;
        self.driver.destroy_event(live, live_event);
        self.maps.events.remove(event);
        Ok(vk::Result::SUCCESS)
    }
}
