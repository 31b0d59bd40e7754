//! Buffers, images, views, samplers, and shader modules.

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedBufferCreateInfo, SerializedBufferViewCreateInfo, SerializedImageCreateInfo,
    SerializedImageViewCreateInfo, SerializedSamplerCreateInfo,
};
use vkr_protocol::{Blob, BlobRange, RecordedHandle};

use super::{extent_3d, subresource_range};
use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_buffer(
        &mut self,
        device: RecordedHandle,
        info: &SerializedBufferCreateInfo,
        recorded_buffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let vk_info = vk::BufferCreateInfo::default()
            .flags(vk::BufferCreateFlags::from_raw(info.flags))
            .size(info.size)
            .usage(vk::BufferUsageFlags::from_raw(info.usage))
            .sharing_mode(vk::SharingMode::from_raw(info.sharing_mode))
            .queue_family_indices(&info.queue_family_indices);
        let (result, buffer) = self.driver.create_buffer(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.buffers.insert(recorded_buffer, buffer);
        }
        Ok(result)
    }

    pub(crate) fn destroy_buffer(
        &mut self,
        device: RecordedHandle,
        buffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_buffer = self.maps.buffers.remap(buffer)?;
        self.driver.destroy_buffer(live, live_buffer);
        self.maps.buffers.remove(buffer);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn bind_buffer_memory(
        &mut self,
        device: RecordedHandle,
        buffer: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_buffer = self.maps.buffers.remap(buffer)?;
        let alloc_result = self.memory.materialize(&mut self.driver, live, memory)?;
        if alloc_result != vk::Result::SUCCESS {
            return Ok(alloc_result);
        }
        let live_memory = self.memory.remap(memory)?;
        Ok(self
            .driver
            .bind_buffer_memory(live, live_buffer, live_memory, offset))
    }

    pub(crate) fn create_image(
        &mut self,
        device: RecordedHandle,
        info: &SerializedImageCreateInfo,
        recorded_image: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let vk_info = vk::ImageCreateInfo::default()
            .flags(vk::ImageCreateFlags::from_raw(info.flags))
            .image_type(vk::ImageType::from_raw(info.image_type))
            .format(vk::Format::from_raw(info.format))
            .extent(extent_3d(&info.extent))
            .mip_levels(info.mip_levels)
            .array_layers(info.array_layers)
            .samples(vk::SampleCountFlags::from_raw(info.samples))
            .tiling(vk::ImageTiling::from_raw(info.tiling))
            .usage(vk::ImageUsageFlags::from_raw(info.usage))
            .sharing_mode(vk::SharingMode::from_raw(info.sharing_mode))
            .queue_family_indices(&info.queue_family_indices)
            .initial_layout(vk::ImageLayout::from_raw(info.initial_layout));
        let (result, image) = self.driver.create_image(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.images.insert(recorded_image, image);
        }
        Ok(result)
    }

    pub(crate) fn destroy_image(
        &mut self,
        device: RecordedHandle,
        image: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_image = self.maps.images.remap(image)?;
        self.driver.destroy_image(live, live_image);
        self.maps.images.remove(image);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn bind_image_memory(
        &mut self,
        device: RecordedHandle,
        image: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_image = self.maps.images.remap(image)?;
        let alloc_result = self.memory.materialize(&mut self.driver, live, memory)?;
        if alloc_result != vk::Result::SUCCESS {
            return Ok(alloc_result);
        }
        let live_memory = self.memory.remap(memory)?;
        Ok(self
            .driver
            .bind_image_memory(live, live_image, live_memory, offset))
    }

    pub(crate) fn create_image_view(
        &mut self,
        device: RecordedHandle,
        info: &SerializedImageViewCreateInfo,
        recorded_view: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let image = self.maps.images.remap(info.image)?;
        let vk_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::from_raw(info.view_type))
            .format(vk::Format::from_raw(info.format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::from_raw(info.components[0]),
                g: vk::ComponentSwizzle::from_raw(info.components[1]),
                b: vk::ComponentSwizzle::from_raw(info.components[2]),
                a: vk::ComponentSwizzle::from_raw(info.components[3]),
            })
            .subresource_range(subresource_range(&info.subresource_range));
        let (result, view) = self.driver.create_image_view(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.image_views.insert(recorded_view, view);
        }
        Ok(result)
    }

    pub(crate) fn destroy_image_view(
        &mut self,
        device: RecordedHandle,
        image_view: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_view = self.maps.image_views.remap(image_view)?;
        self.driver.destroy_image_view(live, live_view);
        self.maps.image_views.remove(image_view);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_buffer_view(
        &mut self,
        device: RecordedHandle,
        info: &SerializedBufferViewCreateInfo,
        recorded_view: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let buffer = self.maps.buffers.remap(info.buffer)?;
        let vk_info = vk::BufferViewCreateInfo::default()
            .buffer(buffer)
            .format(vk::Format::from_raw(info.format))
            .offset(info.offset)
            .range(info.range);
        let (result, view) = self.driver.create_buffer_view(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.buffer_views.insert(recorded_view, view);
        }
        Ok(result)
    }

    pub(crate) fn destroy_buffer_view(
        &mut self,
        device: RecordedHandle,
        buffer_view: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_view = self.maps.buffer_views.remap(buffer_view)?;
        self.driver.destroy_buffer_view(live, live_view);
        self.maps.buffer_views.remove(buffer_view);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_sampler(
        &mut self,
        device: RecordedHandle,
        info: &SerializedSamplerCreateInfo,
        recorded_sampler: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let vk_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::from_raw(info.mag_filter))
            .min_filter(vk::Filter::from_raw(info.min_filter))
            .mipmap_mode(vk::SamplerMipmapMode::from_raw(info.mipmap_mode))
            .address_mode_u(vk::SamplerAddressMode::from_raw(info.address_mode_u))
            .address_mode_v(vk::SamplerAddressMode::from_raw(info.address_mode_v))
            .address_mode_w(vk::SamplerAddressMode::from_raw(info.address_mode_w))
            .mip_lod_bias(info.mip_lod_bias)
            .anisotropy_enable(info.anisotropy_enable)
            .max_anisotropy(info.max_anisotropy)
            .compare_enable(info.compare_enable)
            .compare_op(vk::CompareOp::from_raw(info.compare_op))
            .min_lod(info.min_lod)
            .max_lod(info.max_lod)
            .border_color(vk::BorderColor::from_raw(info.border_color))
            .unnormalized_coordinates(info.unnormalized_coordinates);
        let (result, sampler) = self.driver.create_sampler(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.samplers.insert(recorded_sampler, sampler);
        }
        Ok(result)
    }

    pub(crate) fn destroy_sampler(
        &mut self,
        device: RecordedHandle,
        sampler: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_sampler = self.maps.samplers.remap(sampler)?;
        self.driver.destroy_sampler(live, live_sampler);
        self.maps.samplers.remove(sampler);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_shader_module(
        &mut self,
        device: RecordedHandle,
        code: BlobRange,
        recorded_module: RecordedHandle,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let words: Vec<u32> = blob.typed(code)?;
        let (result, module) = self.driver.create_shader_module(live, &words);
        if result == vk::Result::SUCCESS {
            self.maps.shader_modules.insert(recorded_module, module);
        }
        Ok(result)
    }

    pub(crate) fn destroy_shader_module(
        &mut self,
        device: RecordedHandle,
        shader_module: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_module = self.maps.shader_modules.remap(shader_module)?;
        self.driver.destroy_shader_module(live, live_module);
        self.maps.shader_modules.remove(shader_module);
        Ok(vk::Result::SUCCESS)
    }
}
