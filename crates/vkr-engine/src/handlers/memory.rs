//! Device-memory packets, routed through the memory shadow.

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::SerializedMappedMemoryRange;
use vkr_protocol::{Blob, BlobRange, RecordedHandle};

use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn allocate_memory(
        &mut self,
        device: RecordedHandle,
        allocation_size: u64,
        memory_type_index: u32,
        recorded_memory: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        Ok(self.memory.on_allocate(
            &mut self.driver,
            live,
            recorded_memory,
            allocation_size,
            memory_type_index,
        ))
    }

    pub(crate) fn free_memory(
        &mut self,
        device: RecordedHandle,
        memory: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        self.memory.on_free(&mut self.driver, live, memory)?;
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn map_memory(
        &mut self,
        device: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
        size: u64,
        flags: u32,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        self.memory
            .on_map(&mut self.driver, live, memory, offset, size, flags)
    }

    pub(crate) fn unmap_memory(
        &mut self,
        device: RecordedHandle,
        memory: RecordedHandle,
        data: BlobRange,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let bytes = blob.bytes(data)?;
        self.memory.on_unmap(&mut self.driver, live, memory, bytes)?;
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn flush_mapped_memory_ranges(
        &mut self,
        device: RecordedHandle,
        ranges: &[SerializedMappedMemoryRange],
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;

        let mut vk_ranges = Vec::with_capacity(ranges.len());
        for range in ranges {
            let bytes = blob.bytes(range.data)?;
            if let Some(vk_range) =
                self.memory
                    .write_range(range.memory, range.offset, range.size, bytes)?
            {
                vk_ranges.push(vk_range);
            }
        }

        // Every range may be staged into pending shadows; then there is
        // nothing for the driver to flush yet.
        if vk_ranges.is_empty() {
            return Ok(vk::Result::SUCCESS);
        }
        Ok(self.driver.flush_mapped_ranges(live, &vk_ranges))
    }
}
