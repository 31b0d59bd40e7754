//! The replay driver: pulls packets, dispatches them to the entry handlers,
//! compares recorded and live return codes, and aggregates a run-wide
//! status.

use ash::vk;
use tracing::{error, info, warn};
use vkr_core::{CallStatus, ReplayError, ReplaySettings, ReplaySummary};
use vkr_protocol::{Packet, VulkanCall};

use crate::display::DisplayAdapter;
use crate::driver::VulkanDriver;
use crate::dump::StateDump;
use crate::memory_shadow::MemoryShadow;
use crate::messages::MessageQueue;
use crate::object_map::ObjectMap;

pub struct VulkanReplayer<D> {
    pub(crate) driver: D,
    pub(crate) maps: ObjectMap,
    pub(crate) memory: MemoryShadow,
    pub(crate) display: Option<DisplayAdapter>,
    pub(crate) settings: ReplaySettings,
    pub(crate) messages: MessageQueue,
    /// Whether a host debug-report callback should be installed when the
    /// trace creates one. Without it those packets are accepted and
    /// discarded.
    pub(crate) capture_validation: bool,
    pub(crate) frame_number: u64,
    pub(crate) dump: StateDump,
    /// Per-swapchain present results that differed from the recording.
    pub(crate) result_mismatches: u64,
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub fn new(driver: D, settings: ReplaySettings, display: Option<DisplayAdapter>) -> Self {
        let adjust_for_gpu = settings.adjust_for_gpu;
        Self {
            driver,
            maps: ObjectMap::new(),
            memory: MemoryShadow::new(adjust_for_gpu),
            display,
            settings,
            messages: MessageQueue::new(),
            capture_validation: false,
            frame_number: 0,
            dump: StateDump::default(),
            result_mismatches: 0,
        }
    }

    /// Install the host debug-report callback when the trace asks for one.
    pub fn capture_validation(&mut self, enabled: bool) {
        self.capture_validation = enabled;
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn object_maps(&self) -> &ObjectMap {
        &self.maps
    }

    pub fn memory_shadow(&self) -> &MemoryShadow {
        &self.memory
    }

    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn result_mismatches(&self) -> u64 {
        self.result_mismatches
    }

    pub fn state_dump(&self) -> &StateDump {
        &self.dump
    }

    /// Replay an entire packet stream in recorded order.
    pub fn replay<'p>(&mut self, packets: impl IntoIterator<Item = &'p Packet>) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for packet in packets {
            summary.record(self.replay_packet(packet));
        }
        info!(
            calls = summary.calls,
            frames = self.frame_number,
            status = ?summary.worst(),
            "replay finished"
        );
        summary
    }

    /// Replay one packet and report its status. Never panics on trace
    /// malformations; a failed call is logged and skipped.
    pub fn replay_packet(&mut self, packet: &Packet) -> CallStatus {
        let entry = packet.entry_point();
        let status = match self.dispatch(packet) {
            Ok(live) => {
                self.check_result(entry, live, vk::Result::from_raw(packet.recorded_result))
            }
            Err(ReplayError::InvalidRemap { kind, handle }) => {
                error!(
                    "skipping {entry}: no live {kind:?} for recorded handle {handle:#x}"
                );
                CallStatus::ValidationError
            }
            Err(ReplayError::OutOfMemory) => {
                error!("skipping {entry}: scratch allocation failed");
                CallStatus::OutOfMemory
            }
            Err(err) => {
                error!("skipping {entry}: {err}");
                CallStatus::Error
            }
        };

        let pending = self.messages.drain();
        if pending.is_empty() {
            return status;
        }
        for message in &pending {
            warn!(
                layer = %message.layer_prefix,
                code = message.message_code,
                "{entry}: {}",
                message.message
            );
        }
        if status == CallStatus::Success {
            CallStatus::ValidationError
        } else {
            status
        }
    }

    /// Mirror of the recorded-versus-live return comparison: any mismatch is
    /// an error and a bad-return status; a failed live result additionally
    /// warns even when the recording failed the same way.
    fn check_result(
        &mut self,
        entry: &'static str,
        live: vk::Result,
        recorded: vk::Result,
    ) -> CallStatus {
        let mut status = CallStatus::Success;
        if live != recorded {
            error!(
                "return value {live:?} from API call ({entry}) does not match return value from trace file {recorded:?}"
            );
            status = CallStatus::BadReturn;
        }
        if live != vk::Result::SUCCESS && live != vk::Result::NOT_READY {
            warn!("API call ({entry}) returned failed result {live:?}");
        }
        status
    }

    fn dispatch(&mut self, packet: &Packet) -> Result<vk::Result, ReplayError> {
        use VulkanCall::*;
        let blob = &packet.blob;
        match &packet.call {
            CreateInstance {
                create_info,
                recorded_instance,
            } => self.create_instance(create_info, *recorded_instance),
            DestroyInstance { instance } => self.destroy_instance(*instance),
            EnumeratePhysicalDevices {
                instance,
                recorded_devices,
            } => self.enumerate_physical_devices(*instance, recorded_devices),
            CreateDebugReportCallback {
                instance,
                flags,
                recorded_callback,
            } => self.create_debug_report_callback(*instance, *flags, *recorded_callback),
            DestroyDebugReportCallback { instance, callback } => {
                self.destroy_debug_report_callback(*instance, *callback)
            }

            CreateDevice {
                physical_device,
                create_info,
                recorded_device,
            } => self.create_device(*physical_device, create_info, *recorded_device, blob),
            DestroyDevice { device } => self.destroy_device(*device),
            GetDeviceQueue {
                device,
                queue_family_index,
                queue_index,
                recorded_queue,
            } => self.get_device_queue(*device, *queue_family_index, *queue_index, *recorded_queue),
            DeviceWaitIdle { device } => self.device_wait_idle(*device),
            QueueSubmit {
                queue,
                submits,
                fence,
            } => self.queue_submit(*queue, submits, *fence),
            QueueWaitIdle { queue } => self.queue_wait_idle(*queue),

            AllocateMemory {
                device,
                allocation_size,
                memory_type_index,
                recorded_memory,
            } => self.allocate_memory(*device, *allocation_size, *memory_type_index, *recorded_memory),
            FreeMemory { device, memory } => self.free_memory(*device, *memory),
            MapMemory {
                device,
                memory,
                offset,
                size,
                flags,
            } => self.map_memory(*device, *memory, *offset, *size, *flags),
            UnmapMemory {
                device,
                memory,
                data,
            } => self.unmap_memory(*device, *memory, *data, blob),
            FlushMappedMemoryRanges { device, ranges } => {
                self.flush_mapped_memory_ranges(*device, ranges, blob)
            }

            CreateBuffer {
                device,
                create_info,
                recorded_buffer,
            } => self.create_buffer(*device, create_info, *recorded_buffer),
            DestroyBuffer { device, buffer } => self.destroy_buffer(*device, *buffer),
            BindBufferMemory {
                device,
                buffer,
                memory,
                offset,
            } => self.bind_buffer_memory(*device, *buffer, *memory, *offset),
            CreateImage {
                device,
                create_info,
                recorded_image,
            } => self.create_image(*device, create_info, *recorded_image),
            DestroyImage { device, image } => self.destroy_image(*device, *image),
            BindImageMemory {
                device,
                image,
                memory,
                offset,
            } => self.bind_image_memory(*device, *image, *memory, *offset),
            CreateImageView {
                device,
                create_info,
                recorded_view,
            } => self.create_image_view(*device, create_info, *recorded_view),
            DestroyImageView { device, image_view } => {
                self.destroy_image_view(*device, *image_view)
            }
            CreateBufferView {
                device,
                create_info,
                recorded_view,
            } => self.create_buffer_view(*device, create_info, *recorded_view),
            DestroyBufferView {
                device,
                buffer_view,
            } => self.destroy_buffer_view(*device, *buffer_view),
            CreateSampler {
                device,
                create_info,
                recorded_sampler,
            } => self.create_sampler(*device, create_info, *recorded_sampler),
            DestroySampler { device, sampler } => self.destroy_sampler(*device, *sampler),
            CreateShaderModule {
                device,
                code,
                recorded_module,
            } => self.create_shader_module(*device, *code, *recorded_module, blob),
            DestroyShaderModule {
                device,
                shader_module,
            } => self.destroy_shader_module(*device, *shader_module),

            CreateDescriptorSetLayout {
                device,
                create_info,
                recorded_layout,
            } => self.create_descriptor_set_layout(*device, create_info, *recorded_layout),
            DestroyDescriptorSetLayout { device, layout } => {
                self.destroy_descriptor_set_layout(*device, *layout)
            }
            CreateDescriptorPool {
                device,
                flags,
                max_sets,
                pool_sizes,
                recorded_pool,
            } => self.create_descriptor_pool(*device, *flags, *max_sets, pool_sizes, *recorded_pool),
            DestroyDescriptorPool { device, pool } => self.destroy_descriptor_pool(*device, *pool),
            AllocateDescriptorSets {
                device,
                descriptor_pool,
                set_layouts,
                recorded_sets,
            } => self.allocate_descriptor_sets(*device, *descriptor_pool, set_layouts, recorded_sets),
            FreeDescriptorSets {
                device,
                descriptor_pool,
                descriptor_sets,
            } => self.free_descriptor_sets(*device, *descriptor_pool, descriptor_sets),
            UpdateDescriptorSets {
                device,
                writes,
                copies,
            } => self.update_descriptor_sets(*device, writes, copies),

            CreatePipelineLayout {
                device,
                set_layouts,
                push_constant_ranges,
                recorded_layout,
            } => self.create_pipeline_layout(*device, set_layouts, push_constant_ranges, *recorded_layout),
            DestroyPipelineLayout { device, layout } => {
                self.destroy_pipeline_layout(*device, *layout)
            }
            CreatePipelineCache {
                device,
                initial_data,
                recorded_cache,
            } => self.create_pipeline_cache(*device, *initial_data, *recorded_cache, blob),
            DestroyPipelineCache { device, cache } => self.destroy_pipeline_cache(*device, *cache),
            GetPipelineCacheData { device, cache } => self.get_pipeline_cache_data(*device, *cache),
            CreateGraphicsPipelines {
                device,
                pipeline_cache,
                create_infos,
                recorded_pipelines,
            } => self.create_graphics_pipelines(
                *device,
                *pipeline_cache,
                create_infos,
                recorded_pipelines,
                blob,
            ),
            CreateComputePipelines {
                device,
                pipeline_cache,
                create_infos,
                recorded_pipelines,
            } => self.create_compute_pipelines(
                *device,
                *pipeline_cache,
                create_infos,
                recorded_pipelines,
                blob,
            ),
            DestroyPipeline { device, pipeline } => self.destroy_pipeline(*device, *pipeline),

            CreateRenderPass {
                device,
                create_info,
                recorded_render_pass,
            } => self.create_render_pass(*device, create_info, *recorded_render_pass),
            DestroyRenderPass {
                device,
                render_pass,
            } => self.destroy_render_pass(*device, *render_pass),
            CreateFramebuffer {
                device,
                create_info,
                recorded_framebuffer,
            } => self.create_framebuffer(*device, create_info, *recorded_framebuffer),
            DestroyFramebuffer {
                device,
                framebuffer,
            } => self.destroy_framebuffer(*device, *framebuffer),

            CreateCommandPool {
                device,
                queue_family_index,
                flags,
                recorded_pool,
            } => self.create_command_pool(*device, *queue_family_index, *flags, *recorded_pool),
            DestroyCommandPool { device, pool } => self.destroy_command_pool(*device, *pool),
            ResetCommandPool {
                device,
                pool,
                flags,
            } => self.reset_command_pool(*device, *pool, *flags),
            AllocateCommandBuffers {
                device,
                command_pool,
                level,
                recorded_buffers,
            } => self.allocate_command_buffers(*device, *command_pool, *level, recorded_buffers),
            FreeCommandBuffers {
                device,
                command_pool,
                command_buffers,
            } => self.free_command_buffers(*device, *command_pool, command_buffers),
            BeginCommandBuffer {
                command_buffer,
                flags,
                inheritance,
            } => self.begin_command_buffer(*command_buffer, *flags, inheritance.as_ref()),
            EndCommandBuffer { command_buffer } => self.end_command_buffer(*command_buffer),
            ResetCommandBuffer {
                command_buffer,
                flags,
            } => self.reset_command_buffer(*command_buffer, *flags),
            CmdBindPipeline {
                command_buffer,
                pipeline_bind_point,
                pipeline,
            } => self.cmd_bind_pipeline(*command_buffer, *pipeline_bind_point, *pipeline),
            CmdBindDescriptorSets {
                command_buffer,
                pipeline_bind_point,
                layout,
                first_set,
                descriptor_sets,
                dynamic_offsets,
            } => self.cmd_bind_descriptor_sets(
                *command_buffer,
                *pipeline_bind_point,
                *layout,
                *first_set,
                descriptor_sets,
                dynamic_offsets,
            ),
            CmdBindVertexBuffers {
                command_buffer,
                first_binding,
                buffers,
                offsets,
            } => self.cmd_bind_vertex_buffers(*command_buffer, *first_binding, buffers, offsets),
            CmdBindIndexBuffer {
                command_buffer,
                buffer,
                offset,
                index_type,
            } => self.cmd_bind_index_buffer(*command_buffer, *buffer, *offset, *index_type),
            CmdBeginRenderPass {
                command_buffer,
                begin_info,
                contents,
            } => self.cmd_begin_render_pass(*command_buffer, begin_info, *contents),
            CmdNextSubpass {
                command_buffer,
                contents,
            } => self.cmd_next_subpass(*command_buffer, *contents),
            CmdEndRenderPass { command_buffer } => self.cmd_end_render_pass(*command_buffer),
            CmdDraw {
                command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => self.cmd_draw(
                *command_buffer,
                *vertex_count,
                *instance_count,
                *first_vertex,
                *first_instance,
            ),
            CmdDrawIndexed {
                command_buffer,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => self.cmd_draw_indexed(
                *command_buffer,
                *index_count,
                *instance_count,
                *first_index,
                *vertex_offset,
                *first_instance,
            ),
            CmdDispatch {
                command_buffer,
                group_count_x,
                group_count_y,
                group_count_z,
            } => self.cmd_dispatch(*command_buffer, *group_count_x, *group_count_y, *group_count_z),
            CmdCopyBuffer {
                command_buffer,
                src_buffer,
                dst_buffer,
                regions,
            } => self.cmd_copy_buffer(*command_buffer, *src_buffer, *dst_buffer, regions),
            CmdCopyBufferToImage {
                command_buffer,
                src_buffer,
                dst_image,
                dst_image_layout,
                regions,
            } => self.cmd_copy_buffer_to_image(
                *command_buffer,
                *src_buffer,
                *dst_image,
                *dst_image_layout,
                regions,
            ),
            CmdCopyImageToBuffer {
                command_buffer,
                src_image,
                src_image_layout,
                dst_buffer,
                regions,
            } => self.cmd_copy_image_to_buffer(
                *command_buffer,
                *src_image,
                *src_image_layout,
                *dst_buffer,
                regions,
            ),
            CmdPipelineBarrier {
                command_buffer,
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            } => self.cmd_pipeline_barrier(
                *command_buffer,
                *src_stage_mask,
                *dst_stage_mask,
                *dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            ),
            CmdWaitEvents {
                command_buffer,
                events,
                src_stage_mask,
                dst_stage_mask,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            } => self.cmd_wait_events(
                *command_buffer,
                events,
                *src_stage_mask,
                *dst_stage_mask,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            ),
            CmdSetViewport {
                command_buffer,
                first_viewport,
                viewports,
            } => self.cmd_set_viewport(*command_buffer, *first_viewport, *viewports, blob),
            CmdSetScissor {
                command_buffer,
                first_scissor,
                scissors,
            } => self.cmd_set_scissor(*command_buffer, *first_scissor, *scissors, blob),
            CmdPushConstants {
                command_buffer,
                layout,
                stage_flags,
                offset,
                values,
            } => self.cmd_push_constants(*command_buffer, *layout, *stage_flags, *offset, *values, blob),

            CreateFence {
                device,
                signaled,
                recorded_fence,
            } => self.create_fence(*device, *signaled, *recorded_fence),
            DestroyFence { device, fence } => self.destroy_fence(*device, *fence),
            WaitForFences {
                device,
                fences,
                wait_all,
                timeout,
            } => self.wait_for_fences(*device, fences, *wait_all, *timeout),
            ResetFences { device, fences } => self.reset_fences(*device, fences),
            GetFenceStatus { device, fence } => self.get_fence_status(*device, *fence),
            CreateSemaphore {
                device,
                recorded_semaphore,
            } => self.create_semaphore(*device, *recorded_semaphore),
            DestroySemaphore { device, semaphore } => self.destroy_semaphore(*device, *semaphore),
            CreateEvent {
                device,
                recorded_event,
            } => self.create_event(*device, *recorded_event),
            DestroyEvent { device, event } => self.destroy_event(*device, *event),

            CreateXcbSurface {
                instance,
                recorded_surface,
                ..
            }
            | CreateXlibSurface {
                instance,
                recorded_surface,
                ..
            }
            | CreateWin32Surface {
                instance,
                recorded_surface,
                ..
            } => self.create_window_surface(*instance, *recorded_surface),
            DestroySurface { instance, surface } => self.destroy_surface(*instance, *surface),
            GetPhysicalDeviceSurfaceSupport {
                physical_device,
                queue_family_index,
                surface,
            } => self.get_surface_support(*physical_device, *queue_family_index, *surface),
            GetPhysicalDeviceSurfaceCapabilities {
                physical_device,
                surface,
                recorded_current_extent,
            } => self.get_surface_capabilities(*physical_device, *surface, *recorded_current_extent),
            GetPhysicalDeviceSurfaceFormats {
                physical_device,
                surface,
            } => self.get_surface_formats(*physical_device, *surface),
            GetPhysicalDeviceSurfacePresentModes {
                physical_device,
                surface,
            } => self.get_surface_present_modes(*physical_device, *surface),
            CreateSwapchain {
                device,
                create_info,
                recorded_swapchain,
            } => self.create_swapchain(*device, create_info, *recorded_swapchain),
            DestroySwapchain { device, swapchain } => self.destroy_swapchain(*device, *swapchain),
            GetSwapchainImages {
                device,
                swapchain,
                recorded_images,
            } => self.get_swapchain_images(*device, *swapchain, recorded_images),
            AcquireNextImage {
                device,
                swapchain,
                timeout,
                semaphore,
                fence,
                recorded_image_index,
            } => self.acquire_next_image(
                *device,
                *swapchain,
                *timeout,
                *semaphore,
                *fence,
                *recorded_image_index,
            ),
            QueuePresent {
                queue,
                present_info,
            } => self.queue_present(*queue, present_info),
        }
    }

    /// Destroy what the trace left alive, in device-then-instance order, so
    /// the driver library is closed only after the last driver object is
    /// gone. Traces normally destroy everything themselves; leftovers are
    /// reported.
    pub fn shutdown(&mut self) {
        if !self.maps.is_empty() {
            warn!(
                live = self.maps.live_objects(),
                "trace left driver objects alive at end of replay"
            );
        }
        for device in self.maps.devices.drain_live() {
            self.driver.device_wait_idle(device);
            self.driver.destroy_device(device);
        }
        for instance in self.maps.instances.drain_live() {
            self.driver.destroy_instance(instance);
        }
    }
}
