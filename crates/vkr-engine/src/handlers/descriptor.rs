//! Descriptor layouts, pools, sets, and updates.
//!
//! Descriptor updates are the canonical deep-copy handler: each write's
//! image/buffer/texel-view array is cloned with its handles remapped by
//! descriptor type before anything reaches the driver.

use ash::vk::{self, Handle};
use tracing::warn;
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedCopyDescriptorSet, SerializedDescriptorPoolSize,
    SerializedDescriptorSetLayoutCreateInfo, SerializedWriteDescriptorSet,
};
use vkr_protocol::RecordedHandle;

use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

struct WriteScratch {
    dst_set: vk::DescriptorSet,
    descriptor_type: vk::DescriptorType,
    image_infos: Vec<vk::DescriptorImageInfo>,
    buffer_infos: Vec<vk::DescriptorBufferInfo>,
    texel_views: Vec<vk::BufferView>,
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_descriptor_set_layout(
        &mut self,
        device: RecordedHandle,
        info: &SerializedDescriptorSetLayoutCreateInfo,
        recorded_layout: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;

        let mut sampler_scratch = Vec::with_capacity(info.bindings.len());
        for binding in &info.bindings {
            let samplers = binding
                .immutable_samplers
                .iter()
                .map(|h| self.maps.samplers.remap(*h))
                .collect::<Result<Vec<_>, _>>()?;
            sampler_scratch.push(samplers);
        }

        let bindings: Vec<vk::DescriptorSetLayoutBinding> = info
            .bindings
            .iter()
            .zip(&sampler_scratch)
            .map(|(b, samplers)| {
                let mut out = vk::DescriptorSetLayoutBinding::default()
                    .binding(b.binding)
                    .descriptor_type(vk::DescriptorType::from_raw(b.descriptor_type))
                    .descriptor_count(b.descriptor_count)
                    .stage_flags(vk::ShaderStageFlags::from_raw(b.stage_flags));
                if !samplers.is_empty() {
                    out = out.immutable_samplers(samplers);
                }
                out
            })
            .collect();

        let vk_info = vk::DescriptorSetLayoutCreateInfo::default()
            .flags(vk::DescriptorSetLayoutCreateFlags::from_raw(info.flags))
            .bindings(&bindings);
        let (result, layout) = self.driver.create_descriptor_set_layout(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.descriptor_set_layouts.insert(recorded_layout, layout);
        }
        Ok(result)
    }

    pub(crate) fn destroy_descriptor_set_layout(
        &mut self,
        device: RecordedHandle,
        layout: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_layout = self.maps.descriptor_set_layouts.remap(layout)?;
        self.driver.destroy_descriptor_set_layout(live, live_layout);
        self.maps.descriptor_set_layouts.remove(layout);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_descriptor_pool(
        &mut self,
        device: RecordedHandle,
        flags: u32,
        max_sets: u32,
        pool_sizes: &[SerializedDescriptorPoolSize],
        recorded_pool: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let sizes: Vec<vk::DescriptorPoolSize> = pool_sizes
            .iter()
            .map(|s| vk::DescriptorPoolSize {
                ty: vk::DescriptorType::from_raw(s.descriptor_type),
                descriptor_count: s.descriptor_count,
            })
            .collect();
        let vk_info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::from_raw(flags))
            .max_sets(max_sets)
            .pool_sizes(&sizes);
        let (result, pool) = self.driver.create_descriptor_pool(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.descriptor_pools.insert(recorded_pool, pool);
        }
        Ok(result)
    }

    pub(crate) fn destroy_descriptor_pool(
        &mut self,
        device: RecordedHandle,
        pool: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_pool = self.maps.descriptor_pools.remap(pool)?;
        self.driver.destroy_descriptor_pool(live, live_pool);
        self.maps.descriptor_pools.remove(pool);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn allocate_descriptor_sets(
        &mut self,
        device: RecordedHandle,
        descriptor_pool: RecordedHandle,
        set_layouts: &[RecordedHandle],
        recorded_sets: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let pool = self.maps.descriptor_pools.remap(descriptor_pool)?;
        let layouts = set_layouts
            .iter()
            .map(|h| self.maps.descriptor_set_layouts.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;

        let (result, sets) = self.driver.allocate_descriptor_sets(live, pool, &layouts);
        if result == vk::Result::SUCCESS {
            if sets.len() != recorded_sets.len() {
                warn!(
                    "descriptor set count mismatched in replay {} versus trace {}",
                    sets.len(),
                    recorded_sets.len()
                );
            }
            for (recorded, set) in recorded_sets.iter().zip(sets.iter()) {
                self.maps.descriptor_sets.insert(*recorded, *set);
            }
        }
        Ok(result)
    }

    pub(crate) fn free_descriptor_sets(
        &mut self,
        device: RecordedHandle,
        descriptor_pool: RecordedHandle,
        descriptor_sets: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let pool = self.maps.descriptor_pools.remap(descriptor_pool)?;
        let sets = descriptor_sets
            .iter()
            .map(|h| self.maps.descriptor_sets.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;

        let result = self.driver.free_descriptor_sets(live, pool, &sets);
        if result == vk::Result::SUCCESS {
            for recorded in descriptor_sets {
                self.maps.descriptor_sets.remove(*recorded);
            }
        }
        Ok(result)
    }

    pub(crate) fn update_descriptor_sets(
        &mut self,
        device: RecordedHandle,
        writes: &[SerializedWriteDescriptorSet],
        copies: &[SerializedCopyDescriptorSet],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;

        let mut scratch = Vec::with_capacity(writes.len());
        for write in writes {
            scratch.push(self.write_scratch(write)?);
        }

        let vk_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .zip(&scratch)
            .map(|(w, s)| {
                let mut out = vk::WriteDescriptorSet::default()
                    .dst_set(s.dst_set)
                    .dst_binding(w.dst_binding)
                    .dst_array_element(w.dst_array_element)
                    .descriptor_type(s.descriptor_type);
                if !s.image_infos.is_empty() {
                    out = out.image_info(&s.image_infos);
                }
                if !s.buffer_infos.is_empty() {
                    out = out.buffer_info(&s.buffer_infos);
                }
                if !s.texel_views.is_empty() {
                    out = out.texel_buffer_view(&s.texel_views);
                }
                out
            })
            .collect();

        let mut vk_copies = Vec::with_capacity(copies.len());
        for copy in copies {
            vk_copies.push(
                vk::CopyDescriptorSet::default()
                    .src_set(self.maps.descriptor_sets.remap(copy.src_set)?)
                    .src_binding(copy.src_binding)
                    .src_array_element(copy.src_array_element)
                    .dst_set(self.maps.descriptor_sets.remap(copy.dst_set)?)
                    .dst_binding(copy.dst_binding)
                    .dst_array_element(copy.dst_array_element)
                    .descriptor_count(copy.descriptor_count),
            );
        }

        self.driver.update_descriptor_sets(live, &vk_writes, &vk_copies);
        Ok(vk::Result::SUCCESS)
    }

    /// Clone one write's info array with its handles remapped by descriptor
    /// type. Fields the type does not use keep their recorded values; the
    /// driver never reads them.
    fn write_scratch(
        &self,
        write: &SerializedWriteDescriptorSet,
    ) -> Result<WriteScratch, ReplayError> {
        let descriptor_type = vk::DescriptorType::from_raw(write.descriptor_type);
        let mut scratch = WriteScratch {
            dst_set: self.maps.descriptor_sets.remap(write.dst_set)?,
            descriptor_type,
            image_infos: Vec::new(),
            buffer_infos: Vec::new(),
            texel_views: Vec::new(),
        };

        match descriptor_type {
            vk::DescriptorType::SAMPLER => {
                for info in &write.image_infos {
                    scratch.image_infos.push(vk::DescriptorImageInfo {
                        sampler: self.maps.samplers.remap(info.sampler)?,
                        image_view: vk::ImageView::from_raw(info.image_view.raw()),
                        image_layout: vk::ImageLayout::from_raw(info.image_layout),
                    });
                }
            }
            vk::DescriptorType::SAMPLED_IMAGE
            | vk::DescriptorType::STORAGE_IMAGE
            | vk::DescriptorType::INPUT_ATTACHMENT => {
                for info in &write.image_infos {
                    scratch.image_infos.push(vk::DescriptorImageInfo {
                        sampler: vk::Sampler::from_raw(info.sampler.raw()),
                        image_view: self.maps.image_views.remap(info.image_view)?,
                        image_layout: vk::ImageLayout::from_raw(info.image_layout),
                    });
                }
            }
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER => {
                for info in &write.image_infos {
                    scratch.image_infos.push(vk::DescriptorImageInfo {
                        sampler: self.maps.samplers.remap(info.sampler)?,
                        image_view: self.maps.image_views.remap(info.image_view)?,
                        image_layout: vk::ImageLayout::from_raw(info.image_layout),
                    });
                }
            }
            vk::DescriptorType::UNIFORM_TEXEL_BUFFER | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
                for view in &write.texel_buffer_views {
                    scratch.texel_views.push(self.maps.buffer_views.remap(*view)?);
                }
            }
            _ => {
                for info in &write.buffer_infos {
                    scratch.buffer_infos.push(vk::DescriptorBufferInfo {
                        buffer: self.maps.buffers.remap(info.buffer)?,
                        offset: info.offset,
                        range: info.range,
                    });
                }
            }
        }
        Ok(scratch)
    }
}
