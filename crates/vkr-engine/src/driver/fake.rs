//! In-process driver stand-in for replaying synthetic traces without a GPU.
//!
//! Hands out monotonically increasing handle values, keeps byte backing
//! stores for memory allocations so mapped-memory write-through is
//! observable, records every invocation with the argument values the driver
//! actually saw, and lets a test script the result of the next call per
//! entry point.

use std::collections::HashMap;
use std::ffi::{c_void, CString};

use ash::vk::{self, Handle};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::{ApplicationDesc, QueueRequest, VulkanDriver};

/// Invocation record kept by [`FakeDriver`]. Entries that tests assert on
/// carry decoded arguments; everything else is recorded by name only.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    CreateInstance {
        layers: Vec<String>,
        extensions: Vec<String>,
    },
    CreateDevice {
        physical_device: u64,
        layers: Vec<String>,
        extensions: Vec<String>,
    },
    QueueSubmit {
        queue: u64,
        command_buffers: Vec<u64>,
        wait_semaphores: Vec<u64>,
        signal_semaphores: Vec<u64>,
        fence: u64,
    },
    AllocateMemory {
        size: u64,
        memory_type_index: u32,
    },
    MapMemory {
        memory: u64,
        offset: u64,
        size: u64,
    },
    UnmapMemory {
        memory: u64,
    },
    FlushMappedRanges {
        memories: Vec<u64>,
    },
    UpdateDescriptorSets {
        writes: Vec<FakeDescriptorWrite>,
    },
    CreateGraphicsPipelines {
        stage_modules: Vec<u64>,
        layouts: Vec<u64>,
        render_passes: Vec<u64>,
    },
    CreateComputePipelines {
        stage_modules: Vec<u64>,
        layouts: Vec<u64>,
    },
    CreateFramebuffer {
        render_pass: u64,
        attachments: Vec<u64>,
    },
    CmdPipelineBarrier {
        buffers: Vec<u64>,
        images: Vec<u64>,
    },
    CmdWaitEvents {
        events: Vec<u64>,
        buffers: Vec<u64>,
        images: Vec<u64>,
    },
    CmdBindVertexBuffers {
        buffers: Vec<u64>,
    },
    CmdBindDescriptorSets {
        layout: u64,
        sets: Vec<u64>,
    },
    QueuePresent {
        swapchains: Vec<u64>,
        wait_semaphores: Vec<u64>,
    },
    Generic(&'static str),
}

impl FakeCall {
    pub fn entry_point(&self) -> &'static str {
        match self {
            FakeCall::CreateInstance { .. } => "vkCreateInstance",
            FakeCall::CreateDevice { .. } => "vkCreateDevice",
            FakeCall::QueueSubmit { .. } => "vkQueueSubmit",
            FakeCall::AllocateMemory { .. } => "vkAllocateMemory",
            FakeCall::MapMemory { .. } => "vkMapMemory",
            FakeCall::UnmapMemory { .. } => "vkUnmapMemory",
            FakeCall::FlushMappedRanges { .. } => "vkFlushMappedMemoryRanges",
            FakeCall::UpdateDescriptorSets { .. } => "vkUpdateDescriptorSets",
            FakeCall::CreateGraphicsPipelines { .. } => "vkCreateGraphicsPipelines",
            FakeCall::CreateComputePipelines { .. } => "vkCreateComputePipelines",
            FakeCall::CreateFramebuffer { .. } => "vkCreateFramebuffer",
            FakeCall::CmdPipelineBarrier { .. } => "vkCmdPipelineBarrier",
            FakeCall::CmdWaitEvents { .. } => "vkCmdWaitEvents",
            FakeCall::CmdBindVertexBuffers { .. } => "vkCmdBindVertexBuffers",
            FakeCall::CmdBindDescriptorSets { .. } => "vkCmdBindDescriptorSets",
            FakeCall::QueuePresent { .. } => "vkQueuePresentKHR",
            FakeCall::Generic(name) => name,
        }
    }
}

/// One decoded `VkWriteDescriptorSet` as the fake driver saw it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeDescriptorWrite {
    pub dst_set: u64,
    pub dst_binding: u32,
    pub descriptor_type: i32,
    pub samplers: Vec<u64>,
    pub image_views: Vec<u64>,
    pub buffers: Vec<u64>,
    pub texel_views: Vec<u64>,
}

pub struct FakeDriver {
    next_handle: u64,
    pub calls: Vec<FakeCall>,
    forced: HashMap<&'static str, vk::Result>,
    allocations: HashMap<u64, Box<[u8]>>,
    installed_layers: Vec<String>,
    physical_device_count: usize,
    swapchain_image_count: usize,
    present_results: Option<Vec<vk::Result>>,
}

unsafe fn decoded<'a, T>(ptr: *const T, len: u32) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len as usize)
    }
}

fn raw_of<T: Handle + Copy>(handles: &[T]) -> Vec<u64> {
    handles.iter().map(|h| h.as_raw()).collect()
}

fn decode_names(names: &[CString]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

macro_rules! fake_create {
    ($self:ident, $entry:literal, $ty:ty) => {{
        $self.calls.push(FakeCall::Generic($entry));
        let result = $self.result_for($entry);
        if result == vk::Result::SUCCESS {
            (result, $self.alloc::<$ty>())
        } else {
            (result, <$ty>::null())
        }
    }};
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            next_handle: 0x1000,
            calls: Vec::new(),
            forced: HashMap::new(),
            allocations: HashMap::new(),
            installed_layers: Vec::new(),
            physical_device_count: 1,
            swapchain_image_count: 3,
            present_results: None,
        }
    }

    fn alloc<T: Handle>(&mut self) -> T {
        self.next_handle += 1;
        T::from_raw(self.next_handle)
    }

    fn result_for(&mut self, entry: &'static str) -> vk::Result {
        self.forced.remove(entry).unwrap_or(vk::Result::SUCCESS)
    }

    /// Script the result of the next invocation of `entry`.
    pub fn fail_next(&mut self, entry: &'static str, result: vk::Result) {
        self.forced.insert(entry, result);
    }

    /// Make a layer visible to host layer enumeration.
    pub fn install_layer(&mut self, name: &str) {
        self.installed_layers.push(name.to_string());
    }

    pub fn set_physical_device_count(&mut self, count: usize) {
        self.physical_device_count = count;
    }

    pub fn set_swapchain_image_count(&mut self, count: usize) {
        self.swapchain_image_count = count;
    }

    /// Script the per-swapchain results written by the next present.
    pub fn script_present_results(&mut self, results: Vec<vk::Result>) {
        self.present_results = Some(results);
    }

    /// Backing bytes of an allocation, for write-through assertions.
    pub fn memory_bytes(&self, memory: vk::DeviceMemory) -> Option<&[u8]> {
        self.allocations.get(&memory.as_raw()).map(|b| &b[..])
    }

    pub fn live_allocations(&self) -> usize {
        self.allocations.len()
    }

    pub fn invoked(&self, entry: &str) -> bool {
        self.calls.iter().any(|c| c.entry_point() == entry)
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VulkanDriver for FakeDriver {
    fn create_instance(
        &mut self,
        _app: &ApplicationDesc,
        layers: &[CString],
        extensions: &[CString],
    ) -> (vk::Result, vk::Instance) {
        self.calls.push(FakeCall::CreateInstance {
            layers: decode_names(layers),
            extensions: decode_names(extensions),
        });
        let result = self.result_for("vkCreateInstance");
        if result == vk::Result::SUCCESS {
            (result, self.alloc())
        } else {
            (result, vk::Instance::null())
        }
    }

    fn destroy_instance(&mut self, _instance: vk::Instance) {
        self.calls.push(FakeCall::Generic("vkDestroyInstance"));
    }

    fn enumerate_physical_devices(
        &mut self,
        _instance: vk::Instance,
    ) -> (vk::Result, Vec<vk::PhysicalDevice>) {
        self.calls
            .push(FakeCall::Generic("vkEnumeratePhysicalDevices"));
        let result = self.result_for("vkEnumeratePhysicalDevices");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let devices = (0..self.physical_device_count)
            .map(|_| self.alloc())
            .collect();
        (vk::Result::SUCCESS, devices)
    }

    fn enumerate_instance_layers(&mut self) -> Vec<String> {
        self.installed_layers.clone()
    }

    fn enumerate_device_layers(&mut self, _physical_device: vk::PhysicalDevice) -> Vec<String> {
        self.installed_layers.clone()
    }

    fn create_debug_report_callback(
        &mut self,
        _instance: vk::Instance,
        _flags: vk::DebugReportFlagsEXT,
        _callback: vk::PFN_vkDebugReportCallbackEXT,
        _user_data: *mut c_void,
    ) -> (vk::Result, vk::DebugReportCallbackEXT) {
        fake_create!(self, "vkCreateDebugReportCallbackEXT", vk::DebugReportCallbackEXT)
    }

    fn destroy_debug_report_callback(
        &mut self,
        _instance: vk::Instance,
        _callback: vk::DebugReportCallbackEXT,
    ) {
        self.calls
            .push(FakeCall::Generic("vkDestroyDebugReportCallbackEXT"));
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        _queues: &[QueueRequest],
        layers: &[CString],
        extensions: &[CString],
        _features: Option<&vk::PhysicalDeviceFeatures>,
    ) -> (vk::Result, vk::Device) {
        self.calls.push(FakeCall::CreateDevice {
            physical_device: physical_device.as_raw(),
            layers: decode_names(layers),
            extensions: decode_names(extensions),
        });
        let result = self.result_for("vkCreateDevice");
        if result == vk::Result::SUCCESS {
            (result, self.alloc())
        } else {
            (result, vk::Device::null())
        }
    }

    fn destroy_device(&mut self, _device: vk::Device) {
        self.calls.push(FakeCall::Generic("vkDestroyDevice"));
    }

    fn get_device_queue(&mut self, _device: vk::Device, _family: u32, _index: u32) -> vk::Queue {
        self.calls.push(FakeCall::Generic("vkGetDeviceQueue"));
        self.alloc()
    }

    fn device_wait_idle(&mut self, _device: vk::Device) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkDeviceWaitIdle"));
        self.result_for("vkDeviceWaitIdle")
    }

    fn queue_submit(
        &mut self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
    ) -> vk::Result {
        let mut command_buffers = Vec::new();
        let mut wait_semaphores = Vec::new();
        let mut signal_semaphores = Vec::new();
        for submit in submits {
            unsafe {
                command_buffers.extend(raw_of(decoded(
                    submit.p_command_buffers,
                    submit.command_buffer_count,
                )));
                wait_semaphores.extend(raw_of(decoded(
                    submit.p_wait_semaphores,
                    submit.wait_semaphore_count,
                )));
                signal_semaphores.extend(raw_of(decoded(
                    submit.p_signal_semaphores,
                    submit.signal_semaphore_count,
                )));
            }
        }
        self.calls.push(FakeCall::QueueSubmit {
            queue: queue.as_raw(),
            command_buffers,
            wait_semaphores,
            signal_semaphores,
            fence: fence.as_raw(),
        });
        self.result_for("vkQueueSubmit")
    }

    fn queue_wait_idle(&mut self, _queue: vk::Queue) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkQueueWaitIdle"));
        self.result_for("vkQueueWaitIdle")
    }

    fn queue_present(&mut self, _queue: vk::Queue, present: &vk::PresentInfoKHR<'_>) -> vk::Result {
        let (swapchains, wait_semaphores) = unsafe {
            (
                raw_of(decoded(present.p_swapchains, present.swapchain_count)),
                raw_of(decoded(
                    present.p_wait_semaphores,
                    present.wait_semaphore_count,
                )),
            )
        };
        if !present.p_results.is_null() {
            let scripted = self.present_results.take();
            for i in 0..present.swapchain_count as usize {
                let value = scripted
                    .as_ref()
                    .and_then(|r| r.get(i).copied())
                    .unwrap_or(vk::Result::SUCCESS);
                unsafe { *present.p_results.add(i) = value };
            }
        }
        self.calls.push(FakeCall::QueuePresent {
            swapchains,
            wait_semaphores,
        });
        self.result_for("vkQueuePresentKHR")
    }

    fn allocate_memory(
        &mut self,
        _device: vk::Device,
        size: u64,
        memory_type_index: u32,
    ) -> (vk::Result, vk::DeviceMemory) {
        self.calls.push(FakeCall::AllocateMemory {
            size,
            memory_type_index,
        });
        let result = self.result_for("vkAllocateMemory");
        if result != vk::Result::SUCCESS {
            return (result, vk::DeviceMemory::null());
        }
        let memory: vk::DeviceMemory = self.alloc();
        self.allocations
            .insert(memory.as_raw(), vec![0u8; size as usize].into_boxed_slice());
        (vk::Result::SUCCESS, memory)
    }

    fn free_memory(&mut self, _device: vk::Device, memory: vk::DeviceMemory) {
        self.calls.push(FakeCall::Generic("vkFreeMemory"));
        self.allocations.remove(&memory.as_raw());
    }

    fn map_memory(
        &mut self,
        _device: vk::Device,
        memory: vk::DeviceMemory,
        offset: u64,
        size: u64,
        _flags: vk::MemoryMapFlags,
    ) -> (vk::Result, *mut u8) {
        self.calls.push(FakeCall::MapMemory {
            memory: memory.as_raw(),
            offset,
            size,
        });
        let result = self.result_for("vkMapMemory");
        if result != vk::Result::SUCCESS {
            return (result, std::ptr::null_mut());
        }
        match self.allocations.get_mut(&memory.as_raw()) {
            Some(bytes) if (offset as usize) < bytes.len() => {
                let ptr = unsafe { bytes.as_mut_ptr().add(offset as usize) };
                (vk::Result::SUCCESS, ptr)
            }
            _ => (vk::Result::ERROR_MEMORY_MAP_FAILED, std::ptr::null_mut()),
        }
    }

    fn unmap_memory(&mut self, _device: vk::Device, memory: vk::DeviceMemory) {
        self.calls.push(FakeCall::UnmapMemory {
            memory: memory.as_raw(),
        });
    }

    fn flush_mapped_ranges(
        &mut self,
        _device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
    ) -> vk::Result {
        self.calls.push(FakeCall::FlushMappedRanges {
            memories: ranges.iter().map(|r| r.memory.as_raw()).collect(),
        });
        self.result_for("vkFlushMappedMemoryRanges")
    }

    fn create_buffer(
        &mut self,
        _device: vk::Device,
        _info: &vk::BufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Buffer) {
        fake_create!(self, "vkCreateBuffer", vk::Buffer)
    }

    fn destroy_buffer(&mut self, _device: vk::Device, _buffer: vk::Buffer) {
        self.calls.push(FakeCall::Generic("vkDestroyBuffer"));
    }

    fn bind_buffer_memory(
        &mut self,
        _device: vk::Device,
        _buffer: vk::Buffer,
        _memory: vk::DeviceMemory,
        _offset: u64,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkBindBufferMemory"));
        self.result_for("vkBindBufferMemory")
    }

    fn create_image(
        &mut self,
        _device: vk::Device,
        _info: &vk::ImageCreateInfo<'_>,
    ) -> (vk::Result, vk::Image) {
        fake_create!(self, "vkCreateImage", vk::Image)
    }

    fn destroy_image(&mut self, _device: vk::Device, _image: vk::Image) {
        self.calls.push(FakeCall::Generic("vkDestroyImage"));
    }

    fn bind_image_memory(
        &mut self,
        _device: vk::Device,
        _image: vk::Image,
        _memory: vk::DeviceMemory,
        _offset: u64,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkBindImageMemory"));
        self.result_for("vkBindImageMemory")
    }

    fn create_image_view(
        &mut self,
        _device: vk::Device,
        _info: &vk::ImageViewCreateInfo<'_>,
    ) -> (vk::Result, vk::ImageView) {
        fake_create!(self, "vkCreateImageView", vk::ImageView)
    }

    fn destroy_image_view(&mut self, _device: vk::Device, _view: vk::ImageView) {
        self.calls.push(FakeCall::Generic("vkDestroyImageView"));
    }

    fn create_buffer_view(
        &mut self,
        _device: vk::Device,
        _info: &vk::BufferViewCreateInfo<'_>,
    ) -> (vk::Result, vk::BufferView) {
        fake_create!(self, "vkCreateBufferView", vk::BufferView)
    }

    fn destroy_buffer_view(&mut self, _device: vk::Device, _view: vk::BufferView) {
        self.calls.push(FakeCall::Generic("vkDestroyBufferView"));
    }

    fn create_sampler(
        &mut self,
        _device: vk::Device,
        _info: &vk::SamplerCreateInfo<'_>,
    ) -> (vk::Result, vk::Sampler) {
        fake_create!(self, "vkCreateSampler", vk::Sampler)
    }

    fn destroy_sampler(&mut self, _device: vk::Device, _sampler: vk::Sampler) {
        self.calls.push(FakeCall::Generic("vkDestroySampler"));
    }

    fn create_shader_module(
        &mut self,
        _device: vk::Device,
        _code: &[u32],
    ) -> (vk::Result, vk::ShaderModule) {
        fake_create!(self, "vkCreateShaderModule", vk::ShaderModule)
    }

    fn destroy_shader_module(&mut self, _device: vk::Device, _module: vk::ShaderModule) {
        self.calls.push(FakeCall::Generic("vkDestroyShaderModule"));
    }

    fn create_descriptor_set_layout(
        &mut self,
        _device: vk::Device,
        _info: &vk::DescriptorSetLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorSetLayout) {
        fake_create!(self, "vkCreateDescriptorSetLayout", vk::DescriptorSetLayout)
    }

    fn destroy_descriptor_set_layout(
        &mut self,
        _device: vk::Device,
        _layout: vk::DescriptorSetLayout,
    ) {
        self.calls
            .push(FakeCall::Generic("vkDestroyDescriptorSetLayout"));
    }

    fn create_descriptor_pool(
        &mut self,
        _device: vk::Device,
        _info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorPool) {
        fake_create!(self, "vkCreateDescriptorPool", vk::DescriptorPool)
    }

    fn destroy_descriptor_pool(&mut self, _device: vk::Device, _pool: vk::DescriptorPool) {
        self.calls.push(FakeCall::Generic("vkDestroyDescriptorPool"));
    }

    fn allocate_descriptor_sets(
        &mut self,
        _device: vk::Device,
        _pool: vk::DescriptorPool,
        layouts: &[vk::DescriptorSetLayout],
    ) -> (vk::Result, Vec<vk::DescriptorSet>) {
        self.calls.push(FakeCall::Generic("vkAllocateDescriptorSets"));
        let result = self.result_for("vkAllocateDescriptorSets");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let sets = layouts.iter().map(|_| self.alloc()).collect();
        (vk::Result::SUCCESS, sets)
    }

    fn free_descriptor_sets(
        &mut self,
        _device: vk::Device,
        _pool: vk::DescriptorPool,
        _sets: &[vk::DescriptorSet],
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkFreeDescriptorSets"));
        self.result_for("vkFreeDescriptorSets")
    }

    fn update_descriptor_sets(
        &mut self,
        _device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        _copies: &[vk::CopyDescriptorSet<'_>],
    ) {
        let mut decoded_writes = Vec::with_capacity(writes.len());
        for write in writes {
            let mut record = FakeDescriptorWrite {
                dst_set: write.dst_set.as_raw(),
                dst_binding: write.dst_binding,
                descriptor_type: write.descriptor_type.as_raw(),
                ..Default::default()
            };
            unsafe {
                match write.descriptor_type {
                    vk::DescriptorType::SAMPLER
                    | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
                    | vk::DescriptorType::SAMPLED_IMAGE
                    | vk::DescriptorType::STORAGE_IMAGE
                    | vk::DescriptorType::INPUT_ATTACHMENT => {
                        for info in decoded(write.p_image_info, write.descriptor_count) {
                            record.samplers.push(info.sampler.as_raw());
                            record.image_views.push(info.image_view.as_raw());
                        }
                    }
                    vk::DescriptorType::UNIFORM_TEXEL_BUFFER
                    | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
                        record.texel_views =
                            raw_of(decoded(write.p_texel_buffer_view, write.descriptor_count));
                    }
                    _ => {
                        for info in decoded(write.p_buffer_info, write.descriptor_count) {
                            record.buffers.push(info.buffer.as_raw());
                        }
                    }
                }
            }
            decoded_writes.push(record);
        }
        self.calls.push(FakeCall::UpdateDescriptorSets {
            writes: decoded_writes,
        });
    }

    fn create_pipeline_layout(
        &mut self,
        _device: vk::Device,
        _info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::PipelineLayout) {
        fake_create!(self, "vkCreatePipelineLayout", vk::PipelineLayout)
    }

    fn destroy_pipeline_layout(&mut self, _device: vk::Device, _layout: vk::PipelineLayout) {
        self.calls.push(FakeCall::Generic("vkDestroyPipelineLayout"));
    }

    fn create_pipeline_cache(
        &mut self,
        _device: vk::Device,
        _initial_data: &[u8],
    ) -> (vk::Result, vk::PipelineCache) {
        fake_create!(self, "vkCreatePipelineCache", vk::PipelineCache)
    }

    fn destroy_pipeline_cache(&mut self, _device: vk::Device, _cache: vk::PipelineCache) {
        self.calls.push(FakeCall::Generic("vkDestroyPipelineCache"));
    }

    fn get_pipeline_cache_data(
        &mut self,
        _device: vk::Device,
        _cache: vk::PipelineCache,
    ) -> (vk::Result, Vec<u8>) {
        self.calls.push(FakeCall::Generic("vkGetPipelineCacheData"));
        (self.result_for("vkGetPipelineCacheData"), Vec::new())
    }

    fn create_graphics_pipelines(
        &mut self,
        _device: vk::Device,
        _cache: vk::PipelineCache,
        infos: &[vk::GraphicsPipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>) {
        let mut stage_modules = Vec::new();
        let mut layouts = Vec::new();
        let mut render_passes = Vec::new();
        for info in infos {
            unsafe {
                for stage in decoded(info.p_stages, info.stage_count) {
                    stage_modules.push(stage.module.as_raw());
                }
            }
            layouts.push(info.layout.as_raw());
            render_passes.push(info.render_pass.as_raw());
        }
        self.calls.push(FakeCall::CreateGraphicsPipelines {
            stage_modules,
            layouts,
            render_passes,
        });
        let result = self.result_for("vkCreateGraphicsPipelines");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let pipelines = infos.iter().map(|_| self.alloc()).collect();
        (vk::Result::SUCCESS, pipelines)
    }

    fn create_compute_pipelines(
        &mut self,
        _device: vk::Device,
        _cache: vk::PipelineCache,
        infos: &[vk::ComputePipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>) {
        self.calls.push(FakeCall::CreateComputePipelines {
            stage_modules: infos.iter().map(|i| i.stage.module.as_raw()).collect(),
            layouts: infos.iter().map(|i| i.layout.as_raw()).collect(),
        });
        let result = self.result_for("vkCreateComputePipelines");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let pipelines = infos.iter().map(|_| self.alloc()).collect();
        (vk::Result::SUCCESS, pipelines)
    }

    fn destroy_pipeline(&mut self, _device: vk::Device, _pipeline: vk::Pipeline) {
        self.calls.push(FakeCall::Generic("vkDestroyPipeline"));
    }

    fn create_render_pass(
        &mut self,
        _device: vk::Device,
        _info: &vk::RenderPassCreateInfo<'_>,
    ) -> (vk::Result, vk::RenderPass) {
        fake_create!(self, "vkCreateRenderPass", vk::RenderPass)
    }

    fn destroy_render_pass(&mut self, _device: vk::Device, _render_pass: vk::RenderPass) {
        self.calls.push(FakeCall::Generic("vkDestroyRenderPass"));
    }

    fn create_framebuffer(
        &mut self,
        _device: vk::Device,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Framebuffer) {
        let attachments =
            unsafe { raw_of(decoded(info.p_attachments, info.attachment_count)) };
        self.calls.push(FakeCall::CreateFramebuffer {
            render_pass: info.render_pass.as_raw(),
            attachments,
        });
        let result = self.result_for("vkCreateFramebuffer");
        if result == vk::Result::SUCCESS {
            (result, self.alloc())
        } else {
            (result, vk::Framebuffer::null())
        }
    }

    fn destroy_framebuffer(&mut self, _device: vk::Device, _framebuffer: vk::Framebuffer) {
        self.calls.push(FakeCall::Generic("vkDestroyFramebuffer"));
    }

    fn create_command_pool(
        &mut self,
        _device: vk::Device,
        _info: &vk::CommandPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::CommandPool) {
        fake_create!(self, "vkCreateCommandPool", vk::CommandPool)
    }

    fn destroy_command_pool(&mut self, _device: vk::Device, _pool: vk::CommandPool) {
        self.calls.push(FakeCall::Generic("vkDestroyCommandPool"));
    }

    fn reset_command_pool(
        &mut self,
        _device: vk::Device,
        _pool: vk::CommandPool,
        _flags: vk::CommandPoolResetFlags,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkResetCommandPool"));
        self.result_for("vkResetCommandPool")
    }

    fn allocate_command_buffers(
        &mut self,
        _device: vk::Device,
        _pool: vk::CommandPool,
        _level: vk::CommandBufferLevel,
        count: u32,
    ) -> (vk::Result, Vec<vk::CommandBuffer>) {
        self.calls.push(FakeCall::Generic("vkAllocateCommandBuffers"));
        let result = self.result_for("vkAllocateCommandBuffers");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let buffers = (0..count).map(|_| self.alloc()).collect();
        (vk::Result::SUCCESS, buffers)
    }

    fn free_command_buffers(
        &mut self,
        _device: vk::Device,
        _pool: vk::CommandPool,
        _buffers: &[vk::CommandBuffer],
    ) {
        self.calls.push(FakeCall::Generic("vkFreeCommandBuffers"));
    }

    fn begin_command_buffer(
        &mut self,
        _cb: vk::CommandBuffer,
        _info: &vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkBeginCommandBuffer"));
        self.result_for("vkBeginCommandBuffer")
    }

    fn end_command_buffer(&mut self, _cb: vk::CommandBuffer) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkEndCommandBuffer"));
        self.result_for("vkEndCommandBuffer")
    }

    fn reset_command_buffer(
        &mut self,
        _cb: vk::CommandBuffer,
        _flags: vk::CommandBufferResetFlags,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkResetCommandBuffer"));
        self.result_for("vkResetCommandBuffer")
    }

    fn cmd_bind_pipeline(
        &mut self,
        _cb: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        _pipeline: vk::Pipeline,
    ) {
        self.calls.push(FakeCall::Generic("vkCmdBindPipeline"));
    }

    fn cmd_bind_descriptor_sets(
        &mut self,
        _cb: vk::CommandBuffer,
        _bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        _first_set: u32,
        sets: &[vk::DescriptorSet],
        _dynamic_offsets: &[u32],
    ) {
        self.calls.push(FakeCall::CmdBindDescriptorSets {
            layout: layout.as_raw(),
            sets: raw_of(sets),
        });
    }

    fn cmd_bind_vertex_buffers(
        &mut self,
        _cb: vk::CommandBuffer,
        _first_binding: u32,
        buffers: &[vk::Buffer],
        _offsets: &[u64],
    ) {
        self.calls.push(FakeCall::CmdBindVertexBuffers {
            buffers: raw_of(buffers),
        });
    }

    fn cmd_bind_index_buffer(
        &mut self,
        _cb: vk::CommandBuffer,
        _buffer: vk::Buffer,
        _offset: u64,
        _index_type: vk::IndexType,
    ) {
        self.calls.push(FakeCall::Generic("vkCmdBindIndexBuffer"));
    }

    fn cmd_begin_render_pass(
        &mut self,
        _cb: vk::CommandBuffer,
        _info: &vk::RenderPassBeginInfo<'_>,
        _contents: vk::SubpassContents,
    ) {
        self.calls.push(FakeCall::Generic("vkCmdBeginRenderPass"));
    }

    fn cmd_next_subpass(&mut self, _cb: vk::CommandBuffer, _contents: vk::SubpassContents) {
        self.calls.push(FakeCall::Generic("vkCmdNextSubpass"));
    }

    fn cmd_end_render_pass(&mut self, _cb: vk::CommandBuffer) {
        self.calls.push(FakeCall::Generic("vkCmdEndRenderPass"));
    }

    fn cmd_draw(
        &mut self,
        _cb: vk::CommandBuffer,
        _vertex_count: u32,
        _instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) {
        self.calls.push(FakeCall::Generic("vkCmdDraw"));
    }

    fn cmd_draw_indexed(
        &mut self,
        _cb: vk::CommandBuffer,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
        self.calls.push(FakeCall::Generic("vkCmdDrawIndexed"));
    }

    fn cmd_dispatch(&mut self, _cb: vk::CommandBuffer, _x: u32, _y: u32, _z: u32) {
        self.calls.push(FakeCall::Generic("vkCmdDispatch"));
    }

    fn cmd_copy_buffer(
        &mut self,
        _cb: vk::CommandBuffer,
        _src: vk::Buffer,
        _dst: vk::Buffer,
        _regions: &[vk::BufferCopy],
    ) {
        self.calls.push(FakeCall::Generic("vkCmdCopyBuffer"));
    }

    fn cmd_copy_buffer_to_image(
        &mut self,
        _cb: vk::CommandBuffer,
        _src: vk::Buffer,
        _dst: vk::Image,
        _dst_layout: vk::ImageLayout,
        _regions: &[vk::BufferImageCopy],
    ) {
        self.calls.push(FakeCall::Generic("vkCmdCopyBufferToImage"));
    }

    fn cmd_copy_image_to_buffer(
        &mut self,
        _cb: vk::CommandBuffer,
        _src: vk::Image,
        _src_layout: vk::ImageLayout,
        _dst: vk::Buffer,
        _regions: &[vk::BufferImageCopy],
    ) {
        self.calls.push(FakeCall::Generic("vkCmdCopyImageToBuffer"));
    }

    fn cmd_pipeline_barrier(
        &mut self,
        _cb: vk::CommandBuffer,
        _src_stage: vk::PipelineStageFlags,
        _dst_stage: vk::PipelineStageFlags,
        _dependency_flags: vk::DependencyFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        self.calls.push(FakeCall::CmdPipelineBarrier {
            buffers: buffer_barriers.iter().map(|b| b.buffer.as_raw()).collect(),
            images: image_barriers.iter().map(|b| b.image.as_raw()).collect(),
        });
    }

    fn cmd_wait_events(
        &mut self,
        _cb: vk::CommandBuffer,
        events: &[vk::Event],
        _src_stage: vk::PipelineStageFlags,
        _dst_stage: vk::PipelineStageFlags,
        _memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        self.calls.push(FakeCall::CmdWaitEvents {
            events: raw_of(events),
            buffers: buffer_barriers.iter().map(|b| b.buffer.as_raw()).collect(),
            images: image_barriers.iter().map(|b| b.image.as_raw()).collect(),
        });
    }

    fn cmd_set_viewport(&mut self, _cb: vk::CommandBuffer, _first: u32, _viewports: &[vk::Viewport]) {
        self.calls.push(FakeCall::Generic("vkCmdSetViewport"));
    }

    fn cmd_set_scissor(&mut self, _cb: vk::CommandBuffer, _first: u32, _scissors: &[vk::Rect2D]) {
        self.calls.push(FakeCall::Generic("vkCmdSetScissor"));
    }

    fn cmd_push_constants(
        &mut self,
        _cb: vk::CommandBuffer,
        _layout: vk::PipelineLayout,
        _stages: vk::ShaderStageFlags,
        _offset: u32,
        _data: &[u8],
    ) {
        self.calls.push(FakeCall::Generic("vkCmdPushConstants"));
    }

    fn create_fence(&mut self, _device: vk::Device, _signaled: bool) -> (vk::Result, vk::Fence) {
        fake_create!(self, "vkCreateFence", vk::Fence)
    }

    fn destroy_fence(&mut self, _device: vk::Device, _fence: vk::Fence) {
        self.calls.push(FakeCall::Generic("vkDestroyFence"));
    }

    fn wait_for_fences(
        &mut self,
        _device: vk::Device,
        _fences: &[vk::Fence],
        _wait_all: bool,
        _timeout: u64,
    ) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkWaitForFences"));
        self.result_for("vkWaitForFences")
    }

    fn reset_fences(&mut self, _device: vk::Device, _fences: &[vk::Fence]) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkResetFences"));
        self.result_for("vkResetFences")
    }

    fn get_fence_status(&mut self, _device: vk::Device, _fence: vk::Fence) -> vk::Result {
        self.calls.push(FakeCall::Generic("vkGetFenceStatus"));
        self.result_for("vkGetFenceStatus")
    }

    fn create_semaphore(&mut self, _device: vk::Device) -> (vk::Result, vk::Semaphore) {
        fake_create!(self, "vkCreateSemaphore", vk::Semaphore)
    }

    fn destroy_semaphore(&mut self, _device: vk::Device, _semaphore: vk::Semaphore) {
        self.calls.push(FakeCall::Generic("vkDestroySemaphore"));
    }

    fn create_event(&mut self, _device: vk::Device) -> (vk::Result, vk::Event) {
        fake_create!(self, "vkCreateEvent", vk::Event)
    }

    fn destroy_event(&mut self, _device: vk::Device, _event: vk::Event) {
        self.calls.push(FakeCall::Generic("vkDestroyEvent"));
    }

    fn create_window_surface(
        &mut self,
        _instance: vk::Instance,
        _display: RawDisplayHandle,
        _window: RawWindowHandle,
    ) -> (vk::Result, vk::SurfaceKHR) {
        fake_create!(self, "vkCreateSurfaceKHR", vk::SurfaceKHR)
    }

    fn destroy_surface(&mut self, _instance: vk::Instance, _surface: vk::SurfaceKHR) {
        self.calls.push(FakeCall::Generic("vkDestroySurfaceKHR"));
    }

    fn get_surface_support(
        &mut self,
        _physical_device: vk::PhysicalDevice,
        _queue_family: u32,
        _surface: vk::SurfaceKHR,
    ) -> (vk::Result, bool) {
        self.calls
            .push(FakeCall::Generic("vkGetPhysicalDeviceSurfaceSupportKHR"));
        (self.result_for("vkGetPhysicalDeviceSurfaceSupportKHR"), true)
    }

    fn get_surface_capabilities(
        &mut self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> (vk::Result, vk::SurfaceCapabilitiesKHR) {
        self.calls.push(FakeCall::Generic(
            "vkGetPhysicalDeviceSurfaceCapabilitiesKHR",
        ));
        let caps = vk::SurfaceCapabilitiesKHR {
            min_image_count: 1,
            max_image_count: 8,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            ..Default::default()
        };
        (
            self.result_for("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"),
            caps,
        )
    }

    fn get_surface_formats(
        &mut self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::SurfaceFormatKHR>) {
        self.calls
            .push(FakeCall::Generic("vkGetPhysicalDeviceSurfaceFormatsKHR"));
        let format = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        (
            self.result_for("vkGetPhysicalDeviceSurfaceFormatsKHR"),
            vec![format],
        )
    }

    fn get_surface_present_modes(
        &mut self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::PresentModeKHR>) {
        self.calls.push(FakeCall::Generic(
            "vkGetPhysicalDeviceSurfacePresentModesKHR",
        ));
        (
            self.result_for("vkGetPhysicalDeviceSurfacePresentModesKHR"),
            vec![vk::PresentModeKHR::FIFO],
        )
    }

    fn create_swapchain(
        &mut self,
        _device: vk::Device,
        _info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> (vk::Result, vk::SwapchainKHR) {
        fake_create!(self, "vkCreateSwapchainKHR", vk::SwapchainKHR)
    }

    fn destroy_swapchain(&mut self, _device: vk::Device, _swapchain: vk::SwapchainKHR) {
        self.calls.push(FakeCall::Generic("vkDestroySwapchainKHR"));
    }

    fn get_swapchain_images(
        &mut self,
        _device: vk::Device,
        _swapchain: vk::SwapchainKHR,
    ) -> (vk::Result, Vec<vk::Image>) {
        self.calls.push(FakeCall::Generic("vkGetSwapchainImagesKHR"));
        let result = self.result_for("vkGetSwapchainImagesKHR");
        if result != vk::Result::SUCCESS {
            return (result, Vec::new());
        }
        let images = (0..self.swapchain_image_count).map(|_| self.alloc()).collect();
        (vk::Result::SUCCESS, images)
    }

    fn acquire_next_image(
        &mut self,
        _device: vk::Device,
        _swapchain: vk::SwapchainKHR,
        _timeout: u64,
        _semaphore: vk::Semaphore,
        _fence: vk::Fence,
    ) -> (vk::Result, u32) {
        self.calls.push(FakeCall::Generic("vkAcquireNextImageKHR"));
        (self.result_for("vkAcquireNextImageKHR"), 0)
    }
}
