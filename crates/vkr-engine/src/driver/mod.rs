//! The loaded driver's entry-point table.
//!
//! Handlers never call into Vulkan directly; every forwarded call goes
//! through [`VulkanDriver`], which stands in for the function-pointer table
//! resolved from the dynamically opened driver library. [`AshDriver`] is the
//! real table; [`FakeDriver`] is the in-process stand-in the test suite
//! replays synthetic traces against.

mod fake;
mod vulkan;

use std::ffi::{c_void, CString};

use ash::vk;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

pub use fake::{FakeCall, FakeDescriptorWrite, FakeDriver};
pub use vulkan::AshDriver;

/// Application identity fields from a recorded instance-create packet.
#[derive(Debug, Default, Clone)]
pub struct ApplicationDesc {
    pub application_name: Option<CString>,
    pub application_version: u32,
    pub engine_name: Option<CString>,
    pub engine_version: u32,
    pub api_version: u32,
}

/// One queue-family request from a recorded device-create packet.
#[derive(Debug, Clone)]
pub struct QueueRequest {
    pub queue_family_index: u32,
    pub priorities: Vec<f32>,
}

/// The entry points handlers forward to, one method per recorded call.
///
/// Calls that create objects return the raw result alongside the new live
/// handle(s); the handle is null/empty unless the result is `SUCCESS`.
pub trait VulkanDriver {
    // ── Instance ────────────────────────────────────────────
    fn create_instance(
        &mut self,
        app: &ApplicationDesc,
        layers: &[CString],
        extensions: &[CString],
    ) -> (vk::Result, vk::Instance);
    fn destroy_instance(&mut self, instance: vk::Instance);
    fn enumerate_physical_devices(
        &mut self,
        instance: vk::Instance,
    ) -> (vk::Result, Vec<vk::PhysicalDevice>);
    /// Layer names installed on the host, for screenshot-layer injection.
    fn enumerate_instance_layers(&mut self) -> Vec<String>;
    fn enumerate_device_layers(&mut self, physical_device: vk::PhysicalDevice) -> Vec<String>;
    fn create_debug_report_callback(
        &mut self,
        instance: vk::Instance,
        flags: vk::DebugReportFlagsEXT,
        callback: vk::PFN_vkDebugReportCallbackEXT,
        user_data: *mut c_void,
    ) -> (vk::Result, vk::DebugReportCallbackEXT);
    fn destroy_debug_report_callback(
        &mut self,
        instance: vk::Instance,
        callback: vk::DebugReportCallbackEXT,
    );

    // ── Device ──────────────────────────────────────────────
    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        queues: &[QueueRequest],
        layers: &[CString],
        extensions: &[CString],
        features: Option<&vk::PhysicalDeviceFeatures>,
    ) -> (vk::Result, vk::Device);
    fn destroy_device(&mut self, device: vk::Device);
    fn get_device_queue(&mut self, device: vk::Device, family: u32, index: u32) -> vk::Queue;
    fn device_wait_idle(&mut self, device: vk::Device) -> vk::Result;

    // ── Queue ───────────────────────────────────────────────
    fn queue_submit(
        &mut self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
    ) -> vk::Result;
    fn queue_wait_idle(&mut self, queue: vk::Queue) -> vk::Result;
    fn queue_present(&mut self, queue: vk::Queue, present: &vk::PresentInfoKHR<'_>) -> vk::Result;

    // ── Memory ──────────────────────────────────────────────
    fn allocate_memory(
        &mut self,
        device: vk::Device,
        size: u64,
        memory_type_index: u32,
    ) -> (vk::Result, vk::DeviceMemory);
    fn free_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory);
    fn map_memory(
        &mut self,
        device: vk::Device,
        memory: vk::DeviceMemory,
        offset: u64,
        size: u64,
        flags: vk::MemoryMapFlags,
    ) -> (vk::Result, *mut u8);
    fn unmap_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory);
    fn flush_mapped_ranges(
        &mut self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
    ) -> vk::Result;

    // ── Buffers, images, views, samplers, shaders ───────────
    fn create_buffer(
        &mut self,
        device: vk::Device,
        info: &vk::BufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Buffer);
    fn destroy_buffer(&mut self, device: vk::Device, buffer: vk::Buffer);
    fn bind_buffer_memory(
        &mut self,
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> vk::Result;
    fn create_image(
        &mut self,
        device: vk::Device,
        info: &vk::ImageCreateInfo<'_>,
    ) -> (vk::Result, vk::Image);
    fn destroy_image(&mut self, device: vk::Device, image: vk::Image);
    fn bind_image_memory(
        &mut self,
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> vk::Result;
    fn create_image_view(
        &mut self,
        device: vk::Device,
        info: &vk::ImageViewCreateInfo<'_>,
    ) -> (vk::Result, vk::ImageView);
    fn destroy_image_view(&mut self, device: vk::Device, view: vk::ImageView);
    fn create_buffer_view(
        &mut self,
        device: vk::Device,
        info: &vk::BufferViewCreateInfo<'_>,
    ) -> (vk::Result, vk::BufferView);
    fn destroy_buffer_view(&mut self, device: vk::Device, view: vk::BufferView);
    fn create_sampler(
        &mut self,
        device: vk::Device,
        info: &vk::SamplerCreateInfo<'_>,
    ) -> (vk::Result, vk::Sampler);
    fn destroy_sampler(&mut self, device: vk::Device, sampler: vk::Sampler);
    fn create_shader_module(
        &mut self,
        device: vk::Device,
        code: &[u32],
    ) -> (vk::Result, vk::ShaderModule);
    fn destroy_shader_module(&mut self, device: vk::Device, module: vk::ShaderModule);

    // ── Descriptors ─────────────────────────────────────────
    fn create_descriptor_set_layout(
        &mut self,
        device: vk::Device,
        info: &vk::DescriptorSetLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorSetLayout);
    fn destroy_descriptor_set_layout(&mut self, device: vk::Device, layout: vk::DescriptorSetLayout);
    fn create_descriptor_pool(
        &mut self,
        device: vk::Device,
        info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorPool);
    fn destroy_descriptor_pool(&mut self, device: vk::Device, pool: vk::DescriptorPool);
    fn allocate_descriptor_sets(
        &mut self,
        device: vk::Device,
        pool: vk::DescriptorPool,
        layouts: &[vk::DescriptorSetLayout],
    ) -> (vk::Result, Vec<vk::DescriptorSet>);
    fn free_descriptor_sets(
        &mut self,
        device: vk::Device,
        pool: vk::DescriptorPool,
        sets: &[vk::DescriptorSet],
    ) -> vk::Result;
    fn update_descriptor_sets(
        &mut self,
        device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        copies: &[vk::CopyDescriptorSet<'_>],
    );

    // ── Pipelines ───────────────────────────────────────────
    fn create_pipeline_layout(
        &mut self,
        device: vk::Device,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::PipelineLayout);
    fn destroy_pipeline_layout(&mut self, device: vk::Device, layout: vk::PipelineLayout);
    fn create_pipeline_cache(
        &mut self,
        device: vk::Device,
        initial_data: &[u8],
    ) -> (vk::Result, vk::PipelineCache);
    fn destroy_pipeline_cache(&mut self, device: vk::Device, cache: vk::PipelineCache);
    fn get_pipeline_cache_data(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
    ) -> (vk::Result, Vec<u8>);
    fn create_graphics_pipelines(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
        infos: &[vk::GraphicsPipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>);
    fn create_compute_pipelines(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
        infos: &[vk::ComputePipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>);
    fn destroy_pipeline(&mut self, device: vk::Device, pipeline: vk::Pipeline);

    // ── Render passes and framebuffers ──────────────────────
    fn create_render_pass(
        &mut self,
        device: vk::Device,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> (vk::Result, vk::RenderPass);
    fn destroy_render_pass(&mut self, device: vk::Device, render_pass: vk::RenderPass);
    fn create_framebuffer(
        &mut self,
        device: vk::Device,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Framebuffer);
    fn destroy_framebuffer(&mut self, device: vk::Device, framebuffer: vk::Framebuffer);

    // ── Command pools and buffers ───────────────────────────
    fn create_command_pool(
        &mut self,
        device: vk::Device,
        info: &vk::CommandPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::CommandPool);
    fn destroy_command_pool(&mut self, device: vk::Device, pool: vk::CommandPool);
    fn reset_command_pool(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags,
    ) -> vk::Result;
    fn allocate_command_buffers(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> (vk::Result, Vec<vk::CommandBuffer>);
    fn free_command_buffers(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        buffers: &[vk::CommandBuffer],
    );
    fn begin_command_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        info: &vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result;
    fn end_command_buffer(&mut self, cb: vk::CommandBuffer) -> vk::Result;
    fn reset_command_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        flags: vk::CommandBufferResetFlags,
    ) -> vk::Result;

    fn cmd_bind_pipeline(
        &mut self,
        cb: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    );
    fn cmd_bind_descriptor_sets(
        &mut self,
        cb: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
        dynamic_offsets: &[u32],
    );
    fn cmd_bind_vertex_buffers(
        &mut self,
        cb: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[u64],
    );
    fn cmd_bind_index_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: u64,
        index_type: vk::IndexType,
    );
    fn cmd_begin_render_pass(
        &mut self,
        cb: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents,
    );
    fn cmd_next_subpass(&mut self, cb: vk::CommandBuffer, contents: vk::SubpassContents);
    fn cmd_end_render_pass(&mut self, cb: vk::CommandBuffer);
    fn cmd_draw(
        &mut self,
        cb: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );
    fn cmd_draw_indexed(
        &mut self,
        cb: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
    fn cmd_dispatch(&mut self, cb: vk::CommandBuffer, x: u32, y: u32, z: u32);
    fn cmd_copy_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        regions: &[vk::BufferCopy],
    );
    fn cmd_copy_buffer_to_image(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Image,
        dst_layout: vk::ImageLayout,
        regions: &[vk::BufferImageCopy],
    );
    fn cmd_copy_image_to_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Image,
        src_layout: vk::ImageLayout,
        dst: vk::Buffer,
        regions: &[vk::BufferImageCopy],
    );
    fn cmd_pipeline_barrier(
        &mut self,
        cb: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    );
    fn cmd_wait_events(
        &mut self,
        cb: vk::CommandBuffer,
        events: &[vk::Event],
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    );
    fn cmd_set_viewport(&mut self, cb: vk::CommandBuffer, first: u32, viewports: &[vk::Viewport]);
    fn cmd_set_scissor(&mut self, cb: vk::CommandBuffer, first: u32, scissors: &[vk::Rect2D]);
    fn cmd_push_constants(
        &mut self,
        cb: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    );

    // ── Synchronization ─────────────────────────────────────
    fn create_fence(&mut self, device: vk::Device, signaled: bool) -> (vk::Result, vk::Fence);
    fn destroy_fence(&mut self, device: vk::Device, fence: vk::Fence);
    fn wait_for_fences(
        &mut self,
        device: vk::Device,
        fences: &[vk::Fence],
        wait_all: bool,
        timeout: u64,
    ) -> vk::Result;
    fn reset_fences(&mut self, device: vk::Device, fences: &[vk::Fence]) -> vk::Result;
    fn get_fence_status(&mut self, device: vk::Device, fence: vk::Fence) -> vk::Result;
    fn create_semaphore(&mut self, device: vk::Device) -> (vk::Result, vk::Semaphore);
    fn destroy_semaphore(&mut self, device: vk::Device, semaphore: vk::Semaphore);
    fn create_event(&mut self, device: vk::Device) -> (vk::Result, vk::Event);
    fn destroy_event(&mut self, device: vk::Device, event: vk::Event);

    // ── Window-system integration ───────────────────────────
    fn create_window_surface(
        &mut self,
        instance: vk::Instance,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> (vk::Result, vk::SurfaceKHR);
    fn destroy_surface(&mut self, instance: vk::Instance, surface: vk::SurfaceKHR);
    fn get_surface_support(
        &mut self,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, bool);
    fn get_surface_capabilities(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, vk::SurfaceCapabilitiesKHR);
    fn get_surface_formats(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::SurfaceFormatKHR>);
    fn get_surface_present_modes(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::PresentModeKHR>);
    fn create_swapchain(
        &mut self,
        device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> (vk::Result, vk::SwapchainKHR);
    fn destroy_swapchain(&mut self, device: vk::Device, swapchain: vk::SwapchainKHR);
    fn get_swapchain_images(
        &mut self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> (vk::Result, Vec<vk::Image>);
    fn acquire_next_image(
        &mut self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
    ) -> (vk::Result, u32);
}
