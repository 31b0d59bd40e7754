//! Command pools, command buffers, and the recorded command-buffer calls
//! that embed handles.
//!
//! The C form of these handlers rewrites handles inside the packet and
//! restores them afterwards; here every barrier, buffer list, and begin
//! info is rebuilt in locals instead, which gives the same idempotent
//! replay without the restore pass.

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedBufferCopy, SerializedBufferImageCopy, SerializedBufferMemoryBarrier,
    SerializedCommandBufferInheritanceInfo, SerializedImageMemoryBarrier, SerializedMemoryBarrier,
    SerializedRenderPassBeginInfo,
};
use vkr_protocol::{Blob, BlobRange, RecordedHandle, ScissorRect, Viewport};

use super::{extent_3d, offset_3d, rect_2d, subresource_layers, subresource_range};
use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

fn memory_barriers(barriers: &[SerializedMemoryBarrier]) -> Vec<vk::MemoryBarrier<'static>> {
    barriers
        .iter()
        .map(|b| {
            vk::MemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::from_raw(b.src_access_mask))
                .dst_access_mask(vk::AccessFlags::from_raw(b.dst_access_mask))
        })
        .collect()
}

fn buffer_copies(regions: &[SerializedBufferCopy]) -> Vec<vk::BufferCopy> {
    regions
        .iter()
        .map(|r| vk::BufferCopy {
            src_offset: r.src_offset,
            dst_offset: r.dst_offset,
            size: r.size,
        })
        .collect()
}

fn buffer_image_copies(regions: &[SerializedBufferImageCopy]) -> Vec<vk::BufferImageCopy> {
    regions
        .iter()
        .map(|r| vk::BufferImageCopy {
            buffer_offset: r.buffer_offset,
            buffer_row_length: r.buffer_row_length,
            buffer_image_height: r.buffer_image_height,
            image_subresource: subresource_layers(&r.image_subresource),
            image_offset: offset_3d(&r.image_offset),
            image_extent: extent_3d(&r.image_extent),
        })
        .collect()
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    /// Remap the target handle of every buffer and image barrier. Each
    /// barrier list is rebuilt in full before the call is issued.
    fn remap_barriers(
        &self,
        buffer_barriers: &[SerializedBufferMemoryBarrier],
        image_barriers: &[SerializedImageMemoryBarrier],
    ) -> Result<
        (
            Vec<vk::BufferMemoryBarrier<'static>>,
            Vec<vk::ImageMemoryBarrier<'static>>,
        ),
        ReplayError,
    > {
        let mut buffers = Vec::with_capacity(buffer_barriers.len());
        for b in buffer_barriers {
            buffers.push(
                vk::BufferMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::from_raw(b.src_access_mask))
                    .dst_access_mask(vk::AccessFlags::from_raw(b.dst_access_mask))
                    .src_queue_family_index(b.src_queue_family_index)
                    .dst_queue_family_index(b.dst_queue_family_index)
                    .buffer(self.maps.buffers.remap(b.buffer)?)
                    .offset(b.offset)
                    .size(b.size),
            );
        }
        let mut images = Vec::with_capacity(image_barriers.len());
        for b in image_barriers {
            images.push(
                vk::ImageMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::from_raw(b.src_access_mask))
                    .dst_access_mask(vk::AccessFlags::from_raw(b.dst_access_mask))
                    .old_layout(vk::ImageLayout::from_raw(b.old_layout))
                    .new_layout(vk::ImageLayout::from_raw(b.new_layout))
                    .src_queue_family_index(b.src_queue_family_index)
                    .dst_queue_family_index(b.dst_queue_family_index)
                    .image(self.maps.images.remap(b.image)?)
                    .subresource_range(subresource_range(&b.subresource_range)),
            );
        }
        Ok((buffers, images))
    }

    pub(crate) fn create_command_pool(
        &mut self,
        device: RecordedHandle,
        queue_family_index: u32,
        flags: u32,
        recorded_pool: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let vk_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::from_raw(flags))
            .queue_family_index(queue_family_index);
        let (result, pool) = self.driver.create_command_pool(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.command_pools.insert(recorded_pool, pool);
        }
        Ok(result)
    }

    pub(crate) fn destroy_command_pool(
        &mut self,
        device: RecordedHandle,
        pool: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_pool = self.maps.command_pools.remap(pool)?;
        self.driver.destroy_command_pool(live, live_pool);
        self.maps.command_pools.remove(pool);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn reset_command_pool(
        &mut self,
        device: RecordedHandle,
        pool: RecordedHandle,
        flags: u32,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_pool = self.maps.command_pools.remap(pool)?;
        Ok(self.driver.reset_command_pool(
            live,
            live_pool,
            vk::CommandPoolResetFlags::from_raw(flags),
        ))
    }

    pub(crate) fn allocate_command_buffers(
        &mut self,
        device: RecordedHandle,
        command_pool: RecordedHandle,
        level: i32,
        recorded_buffers: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let pool = self.maps.command_pools.remap(command_pool)?;
        let (result, buffers) = self.driver.allocate_command_buffers(
            live,
            pool,
            vk::CommandBufferLevel::from_raw(level),
            recorded_buffers.len() as u32,
        );
        if result == vk::Result::SUCCESS {
            for (recorded, cb) in recorded_buffers.iter().zip(buffers.iter()) {
                self.maps.command_buffers.insert(*recorded, *cb);
                self.dump.record_command_buffer(*recorded, command_pool);
            }
        }
        Ok(result)
    }

    pub(crate) fn free_command_buffers(
        &mut self,
        device: RecordedHandle,
        command_pool: RecordedHandle,
        command_buffers: &[RecordedHandle],
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let pool = self.maps.command_pools.remap(command_pool)?;
        let buffers = command_buffers
            .iter()
            .map(|h| self.maps.command_buffers.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        self.driver.free_command_buffers(live, pool, &buffers);
        for recorded in command_buffers {
            self.maps.command_buffers.remove(*recorded);
            self.dump.forget_command_buffer(*recorded);
        }
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn begin_command_buffer(
        &mut self,
        command_buffer: RecordedHandle,
        flags: u32,
        inheritance: Option<&SerializedCommandBufferInheritanceInfo>,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let inheritance_info = match inheritance {
            Some(inh) => Some(
                vk::CommandBufferInheritanceInfo::default()
                    .render_pass(self.maps.render_passes.remap(inh.render_pass)?)
                    .subpass(inh.subpass)
                    .framebuffer(self.maps.framebuffers.remap(inh.framebuffer)?)
                    .occlusion_query_enable(inh.occlusion_query_enable)
                    .query_flags(vk::QueryControlFlags::from_raw(inh.query_flags))
                    .pipeline_statistics(vk::QueryPipelineStatisticFlags::from_raw(
                        inh.pipeline_statistics,
                    )),
            ),
            None => None,
        };
        let mut begin = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::from_raw(flags));
        if let Some(inh) = inheritance_info.as_ref() {
            begin = begin.inheritance_info(inh);
        }
        Ok(self.driver.begin_command_buffer(cb, &begin))
    }

    pub(crate) fn end_command_buffer(
        &mut self,
        command_buffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        Ok(self.driver.end_command_buffer(cb))
    }

    pub(crate) fn reset_command_buffer(
        &mut self,
        command_buffer: RecordedHandle,
        flags: u32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        Ok(self
            .driver
            .reset_command_buffer(cb, vk::CommandBufferResetFlags::from_raw(flags)))
    }

    pub(crate) fn cmd_bind_pipeline(
        &mut self,
        command_buffer: RecordedHandle,
        pipeline_bind_point: i32,
        pipeline: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_pipeline = self.maps.pipelines.remap(pipeline)?;
        self.driver.cmd_bind_pipeline(
            cb,
            vk::PipelineBindPoint::from_raw(pipeline_bind_point),
            live_pipeline,
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_bind_descriptor_sets(
        &mut self,
        command_buffer: RecordedHandle,
        pipeline_bind_point: i32,
        layout: RecordedHandle,
        first_set: u32,
        descriptor_sets: &[RecordedHandle],
        dynamic_offsets: &[u32],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_layout = self.maps.pipeline_layouts.remap(layout)?;
        let sets = descriptor_sets
            .iter()
            .map(|h| self.maps.descriptor_sets.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        self.driver.cmd_bind_descriptor_sets(
            cb,
            vk::PipelineBindPoint::from_raw(pipeline_bind_point),
            live_layout,
            first_set,
            &sets,
            dynamic_offsets,
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_bind_vertex_buffers(
        &mut self,
        command_buffer: RecordedHandle,
        first_binding: u32,
        buffers: &[RecordedHandle],
        offsets: &[u64],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_buffers = buffers
            .iter()
            .map(|h| self.maps.buffers.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        self.driver
            .cmd_bind_vertex_buffers(cb, first_binding, &live_buffers, offsets);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_bind_index_buffer(
        &mut self,
        command_buffer: RecordedHandle,
        buffer: RecordedHandle,
        offset: u64,
        index_type: i32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_buffer = self.maps.buffers.remap(buffer)?;
        self.driver.cmd_bind_index_buffer(
            cb,
            live_buffer,
            offset,
            vk::IndexType::from_raw(index_type),
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_begin_render_pass(
        &mut self,
        command_buffer: RecordedHandle,
        begin_info: &SerializedRenderPassBeginInfo,
        contents: i32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let render_pass = self.maps.render_passes.remap(begin_info.render_pass)?;
        let framebuffer = self.maps.framebuffers.remap(begin_info.framebuffer)?;
        let clear_values: Vec<vk::ClearValue> = begin_info
            .clear_values
            .iter()
            .map(|cv| vk::ClearValue {
                color: vk::ClearColorValue { uint32: cv.raw },
            })
            .collect();
        let vk_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(rect_2d(&begin_info.render_area))
            .clear_values(&clear_values);
        self.driver
            .cmd_begin_render_pass(cb, &vk_info, vk::SubpassContents::from_raw(contents));
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_next_subpass(
        &mut self,
        command_buffer: RecordedHandle,
        contents: i32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        self.driver
            .cmd_next_subpass(cb, vk::SubpassContents::from_raw(contents));
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_end_render_pass(
        &mut self,
        command_buffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        self.driver.cmd_end_render_pass(cb);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_draw(
        &mut self,
        command_buffer: RecordedHandle,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        self.driver
            .cmd_draw(cb, vertex_count, instance_count, first_vertex, first_instance);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_draw_indexed(
        &mut self,
        command_buffer: RecordedHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        self.driver.cmd_draw_indexed(
            cb,
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_dispatch(
        &mut self,
        command_buffer: RecordedHandle,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        self.driver
            .cmd_dispatch(cb, group_count_x, group_count_y, group_count_z);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_copy_buffer(
        &mut self,
        command_buffer: RecordedHandle,
        src_buffer: RecordedHandle,
        dst_buffer: RecordedHandle,
        regions: &[SerializedBufferCopy],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let src = self.maps.buffers.remap(src_buffer)?;
        let dst = self.maps.buffers.remap(dst_buffer)?;
        self.driver.cmd_copy_buffer(cb, src, dst, &buffer_copies(regions));
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_copy_buffer_to_image(
        &mut self,
        command_buffer: RecordedHandle,
        src_buffer: RecordedHandle,
        dst_image: RecordedHandle,
        dst_image_layout: i32,
        regions: &[SerializedBufferImageCopy],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let src = self.maps.buffers.remap(src_buffer)?;
        let dst = self.maps.images.remap(dst_image)?;
        self.driver.cmd_copy_buffer_to_image(
            cb,
            src,
            dst,
            vk::ImageLayout::from_raw(dst_image_layout),
            &buffer_image_copies(regions),
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_copy_image_to_buffer(
        &mut self,
        command_buffer: RecordedHandle,
        src_image: RecordedHandle,
        src_image_layout: i32,
        dst_buffer: RecordedHandle,
        regions: &[SerializedBufferImageCopy],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let src = self.maps.images.remap(src_image)?;
        let dst = self.maps.buffers.remap(dst_buffer)?;
        self.driver.cmd_copy_image_to_buffer(
            cb,
            src,
            vk::ImageLayout::from_raw(src_image_layout),
            dst,
            &buffer_image_copies(regions),
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_pipeline_barrier(
        &mut self,
        command_buffer: RecordedHandle,
        src_stage_mask: u32,
        dst_stage_mask: u32,
        dependency_flags: u32,
        mem: &[SerializedMemoryBarrier],
        buf: &[SerializedBufferMemoryBarrier],
        img: &[SerializedImageMemoryBarrier],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let vk_mem = memory_barriers(mem);
        let (vk_buf, vk_img) = self.remap_barriers(buf, img)?;
        self.driver.cmd_pipeline_barrier(
            cb,
            vk::PipelineStageFlags::from_raw(src_stage_mask),
            vk::PipelineStageFlags::from_raw(dst_stage_mask),
            vk::DependencyFlags::from_raw(dependency_flags),
            &vk_mem,
            &vk_buf,
            &vk_img,
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_wait_events(
        &mut self,
        command_buffer: RecordedHandle,
        events: &[RecordedHandle],
        src_stage_mask: u32,
        dst_stage_mask: u32,
        mem: &[SerializedMemoryBarrier],
        buf: &[SerializedBufferMemoryBarrier],
        img: &[SerializedImageMemoryBarrier],
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_events = events
            .iter()
            .map(|h| self.maps.events.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        let vk_mem = memory_barriers(mem);
        let (vk_buf, vk_img) = self.remap_barriers(buf, img)?;
        self.driver.cmd_wait_events(
            cb,
            &live_events,
            vk::PipelineStageFlags::from_raw(src_stage_mask),
            vk::PipelineStageFlags::from_raw(dst_stage_mask),
            &vk_mem,
            &vk_buf,
            &vk_img,
        );
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_set_viewport(
        &mut self,
        command_buffer: RecordedHandle,
        first_viewport: u32,
        viewports: BlobRange,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let vk_viewports: Vec<vk::Viewport> = blob
            .typed::<Viewport>(viewports)?
            .iter()
            .map(|v| vk::Viewport {
                x: v.x,
                y: v.y,
                width: v.width,
                height: v.height,
                min_depth: v.min_depth,
                max_depth: v.max_depth,
            })
            .collect();
        self.driver.cmd_set_viewport(cb, first_viewport, &vk_viewports);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_set_scissor(
        &mut self,
        command_buffer: RecordedHandle,
        first_scissor: u32,
        scissors: BlobRange,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let vk_scissors: Vec<vk::Rect2D> = blob
            .typed::<ScissorRect>(scissors)?
            .iter()
            .map(|s| vk::Rect2D {
                offset: vk::Offset2D { x: s.x, y: s.y },
                extent: vk::Extent2D {
                    width: s.width,
                    height: s.height,
                },
            })
            .collect();
        self.driver.cmd_set_scissor(cb, first_scissor, &vk_scissors);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn cmd_push_constants(
        &mut self,
        command_buffer: RecordedHandle,
        layout: RecordedHandle,
        stage_flags: u32,
        offset: u32,
        values: BlobRange,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let cb = self.maps.command_buffers.remap(command_buffer)?;
        let live_layout = self.maps.pipeline_layouts.remap(layout)?;
        let data = blob.bytes(values)?;
        self.driver.cmd_push_constants(
            cb,
            live_layout,
            vk::ShaderStageFlags::from_raw(stage_flags),
            offset,
            data,
        );
        Ok(vk::Result::SUCCESS)
    }
}
