//! The real driver table, backed by the dynamically opened Vulkan library.
//!
//! The library is located by its fixed per-platform file name; the trace
//! never supplies a path. Per-instance and per-device function tables are
//! resolved at creation time and kept until the matching destroy call. The
//! `entry` field is declared last so the open library outlives every object
//! created through it.

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr, CString};

use ash::vk::{self, Handle};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use tracing::{error, info};
use vkr_core::ReplayError;

use super::{ApplicationDesc, QueueRequest, VulkanDriver};

pub struct AshDriver {
    instances: HashMap<u64, InstanceFns>,
    devices: HashMap<u64, DeviceFns>,
    physical_device_parent: HashMap<u64, u64>,
    queue_owner: HashMap<u64, u64>,
    command_buffer_owner: HashMap<u64, u64>,
    entry: ash::Entry,
}

struct InstanceFns {
    instance: ash::Instance,
    surface: ash::khr::surface::Instance,
    debug_report: ash::ext::debug_report::Instance,
}

struct DeviceFns {
    device: ash::Device,
    swapchain: ash::khr::swapchain::Device,
}

fn unit(result: Result<(), vk::Result>) -> vk::Result {
    match result {
        Ok(()) => vk::Result::SUCCESS,
        Err(e) => e,
    }
}

fn layer_name(props: &vk::LayerProperties) -> String {
    unsafe { CStr::from_ptr(props.layer_name.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

macro_rules! fns_or {
    ($lookup:expr, $name:literal, $fallback:expr) => {
        match $lookup {
            Some(fns) => fns,
            None => {
                error!("no resolved function table for {}", $name);
                return $fallback;
            }
        }
    };
}

impl AshDriver {
    /// Open the native driver library by its well-known name.
    /// Failure here is the fatal setup error of the whole replay.
    pub fn load() -> Result<Self, ReplayError> {
        let mut last_error = None;
        for name in vkr_common::platform::vulkan_library_candidates().iter().copied() {
            match unsafe { ash::Entry::load_from(name) } {
                Ok(entry) => {
                    info!(library = name, "opened native Vulkan driver library");
                    return Ok(Self {
                        instances: HashMap::new(),
                        devices: HashMap::new(),
                        physical_device_parent: HashMap::new(),
                        queue_owner: HashMap::new(),
                        command_buffer_owner: HashMap::new(),
                        entry,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(ReplayError::Loader(format!(
            "failed to open the Vulkan library ({:?}): {}",
            vkr_common::platform::vulkan_library_candidates(),
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn inst(&self, instance: vk::Instance) -> Option<&InstanceFns> {
        self.instances.get(&instance.as_raw())
    }

    fn dev(&self, device: vk::Device) -> Option<&DeviceFns> {
        self.devices.get(&device.as_raw())
    }

    fn dev_for_queue(&self, queue: vk::Queue) -> Option<&DeviceFns> {
        self.queue_owner
            .get(&queue.as_raw())
            .and_then(|raw| self.devices.get(raw))
    }

    fn dev_for_cb(&self, cb: vk::CommandBuffer) -> Option<&DeviceFns> {
        self.command_buffer_owner
            .get(&cb.as_raw())
            .and_then(|raw| self.devices.get(raw))
    }
}

impl VulkanDriver for AshDriver {
    fn create_instance(
        &mut self,
        app: &ApplicationDesc,
        layers: &[CString],
        extensions: &[CString],
    ) -> (vk::Result, vk::Instance) {
        let mut app_info = vk::ApplicationInfo::default()
            .application_version(app.application_version)
            .engine_version(app.engine_version)
            .api_version(if app.api_version == 0 {
                vk::make_api_version(0, 1, 0, 0)
            } else {
                app.api_version
            });
        if let Some(name) = app.application_name.as_deref() {
            app_info = app_info.application_name(name);
        }
        if let Some(name) = app.engine_name.as_deref() {
            app_info = app_info.engine_name(name);
        }

        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|l| l.as_ptr()).collect();
        let ext_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&ext_ptrs);

        match unsafe { self.entry.create_instance(&create_info, None) } {
            Ok(instance) => {
                let raw = instance.handle();
                let surface = ash::khr::surface::Instance::new(&self.entry, &instance);
                let debug_report = ash::ext::debug_report::Instance::new(&self.entry, &instance);
                self.instances.insert(
                    raw.as_raw(),
                    InstanceFns {
                        instance,
                        surface,
                        debug_report,
                    },
                );
                (vk::Result::SUCCESS, raw)
            }
            Err(e) => (e, vk::Instance::null()),
        }
    }

    fn destroy_instance(&mut self, instance: vk::Instance) {
        if let Some(fns) = self.instances.remove(&instance.as_raw()) {
            unsafe { fns.instance.destroy_instance(None) };
            self.physical_device_parent
                .retain(|_, parent| *parent != instance.as_raw());
        }
    }

    fn enumerate_physical_devices(
        &mut self,
        instance: vk::Instance,
    ) -> (vk::Result, Vec<vk::PhysicalDevice>) {
        let fns = fns_or!(
            self.instances.get(&instance.as_raw()),
            "instance",
            (vk::Result::ERROR_INITIALIZATION_FAILED, Vec::new())
        );
        match unsafe { fns.instance.enumerate_physical_devices() } {
            Ok(devices) => {
                for pd in &devices {
                    self.physical_device_parent
                        .insert(pd.as_raw(), instance.as_raw());
                }
                (vk::Result::SUCCESS, devices)
            }
            Err(e) => (e, Vec::new()),
        }
    }

    fn enumerate_instance_layers(&mut self) -> Vec<String> {
        unsafe { self.entry.enumerate_instance_layer_properties() }
            .map(|props| props.iter().map(layer_name).collect())
            .unwrap_or_default()
    }

    fn enumerate_device_layers(&mut self, physical_device: vk::PhysicalDevice) -> Vec<String> {
        let Some(fns) = self
            .physical_device_parent
            .get(&physical_device.as_raw())
            .and_then(|raw| self.instances.get(raw))
        else {
            return Vec::new();
        };
        unsafe { fns.instance.enumerate_device_layer_properties(physical_device) }
            .map(|props| props.iter().map(layer_name).collect())
            .unwrap_or_default()
    }

    fn create_debug_report_callback(
        &mut self,
        instance: vk::Instance,
        flags: vk::DebugReportFlagsEXT,
        callback: vk::PFN_vkDebugReportCallbackEXT,
        user_data: *mut c_void,
    ) -> (vk::Result, vk::DebugReportCallbackEXT) {
        let fns = fns_or!(
            self.inst(instance),
            "instance",
            (
                vk::Result::ERROR_INITIALIZATION_FAILED,
                vk::DebugReportCallbackEXT::null()
            )
        );
        let info = vk::DebugReportCallbackCreateInfoEXT::default()
            .flags(flags)
            .pfn_callback(callback)
            .user_data(user_data);
        match unsafe { fns.debug_report.create_debug_report_callback(&info, None) } {
            Ok(cb) => (vk::Result::SUCCESS, cb),
            Err(e) => (e, vk::DebugReportCallbackEXT::null()),
        }
    }

    fn destroy_debug_report_callback(
        &mut self,
        instance: vk::Instance,
        callback: vk::DebugReportCallbackEXT,
    ) {
        let fns = fns_or!(self.inst(instance), "instance", ());
        unsafe { fns.debug_report.destroy_debug_report_callback(callback, None) };
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        queues: &[QueueRequest],
        layers: &[CString],
        extensions: &[CString],
        features: Option<&vk::PhysicalDeviceFeatures>,
    ) -> (vk::Result, vk::Device) {
        let fns = fns_or!(
            self.physical_device_parent
                .get(&physical_device.as_raw())
                .and_then(|raw| self.instances.get(raw)),
            "physical device",
            (vk::Result::ERROR_INITIALIZATION_FAILED, vk::Device::null())
        );

        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = queues
            .iter()
            .map(|q| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(q.queue_family_index)
                    .queue_priorities(&q.priorities)
            })
            .collect();
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|l| l.as_ptr()).collect();
        let ext_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();

        let mut create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&ext_ptrs);
        if let Some(features) = features {
            create_info = create_info.enabled_features(features);
        }

        match unsafe { fns.instance.create_device(physical_device, &create_info, None) } {
            Ok(device) => {
                let raw = device.handle();
                let swapchain = ash::khr::swapchain::Device::new(&fns.instance, &device);
                self.devices
                    .insert(raw.as_raw(), DeviceFns { device, swapchain });
                (vk::Result::SUCCESS, raw)
            }
            Err(e) => (e, vk::Device::null()),
        }
    }

    fn destroy_device(&mut self, device: vk::Device) {
        if let Some(fns) = self.devices.remove(&device.as_raw()) {
            unsafe { fns.device.destroy_device(None) };
            self.queue_owner.retain(|_, owner| *owner != device.as_raw());
            self.command_buffer_owner
                .retain(|_, owner| *owner != device.as_raw());
        }
    }

    fn get_device_queue(&mut self, device: vk::Device, family: u32, index: u32) -> vk::Queue {
        let fns = fns_or!(self.dev(device), "device", vk::Queue::null());
        let queue = unsafe { fns.device.get_device_queue(family, index) };
        self.queue_owner.insert(queue.as_raw(), device.as_raw());
        queue
    }

    fn device_wait_idle(&mut self, device: vk::Device) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.device_wait_idle() })
    }

    fn queue_submit(
        &mut self,
        queue: vk::Queue,
        submits: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
    ) -> vk::Result {
        let fns = fns_or!(self.dev_for_queue(queue), "queue", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.queue_submit(queue, submits, fence) })
    }

    fn queue_wait_idle(&mut self, queue: vk::Queue) -> vk::Result {
        let fns = fns_or!(self.dev_for_queue(queue), "queue", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.queue_wait_idle(queue) })
    }

    fn queue_present(&mut self, queue: vk::Queue, present: &vk::PresentInfoKHR<'_>) -> vk::Result {
        let fns = fns_or!(self.dev_for_queue(queue), "queue", vk::Result::ERROR_DEVICE_LOST);
        match unsafe { fns.swapchain.queue_present(queue, present) } {
            Ok(false) => vk::Result::SUCCESS,
            Ok(true) => vk::Result::SUBOPTIMAL_KHR,
            Err(e) => e,
        }
    }

    fn allocate_memory(
        &mut self,
        device: vk::Device,
        size: u64,
        memory_type_index: u32,
    ) -> (vk::Result, vk::DeviceMemory) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::DeviceMemory::null())
        );
        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(size)
            .memory_type_index(memory_type_index);
        match unsafe { fns.device.allocate_memory(&info, None) } {
            Ok(memory) => (vk::Result::SUCCESS, memory),
            Err(e) => (e, vk::DeviceMemory::null()),
        }
    }

    fn free_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.free_memory(memory, None) };
    }

    fn map_memory(
        &mut self,
        device: vk::Device,
        memory: vk::DeviceMemory,
        offset: u64,
        size: u64,
        flags: vk::MemoryMapFlags,
    ) -> (vk::Result, *mut u8) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, std::ptr::null_mut())
        );
        match unsafe { fns.device.map_memory(memory, offset, size, flags) } {
            Ok(ptr) => (vk::Result::SUCCESS, ptr as *mut u8),
            Err(e) => (e, std::ptr::null_mut()),
        }
    }

    fn unmap_memory(&mut self, device: vk::Device, memory: vk::DeviceMemory) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.unmap_memory(memory) };
    }

    fn flush_mapped_ranges(
        &mut self,
        device: vk::Device,
        ranges: &[vk::MappedMemoryRange<'_>],
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.flush_mapped_memory_ranges(ranges) })
    }

    fn create_buffer(
        &mut self,
        device: vk::Device,
        info: &vk::BufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Buffer) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Buffer::null())
        );
        match unsafe { fns.device.create_buffer(info, None) } {
            Ok(buffer) => (vk::Result::SUCCESS, buffer),
            Err(e) => (e, vk::Buffer::null()),
        }
    }

    fn destroy_buffer(&mut self, device: vk::Device, buffer: vk::Buffer) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_buffer(buffer, None) };
    }

    fn bind_buffer_memory(
        &mut self,
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.bind_buffer_memory(buffer, memory, offset) })
    }

    fn create_image(
        &mut self,
        device: vk::Device,
        info: &vk::ImageCreateInfo<'_>,
    ) -> (vk::Result, vk::Image) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Image::null())
        );
        match unsafe { fns.device.create_image(info, None) } {
            Ok(image) => (vk::Result::SUCCESS, image),
            Err(e) => (e, vk::Image::null()),
        }
    }

    fn destroy_image(&mut self, device: vk::Device, image: vk::Image) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_image(image, None) };
    }

    fn bind_image_memory(
        &mut self,
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.bind_image_memory(image, memory, offset) })
    }

    fn create_image_view(
        &mut self,
        device: vk::Device,
        info: &vk::ImageViewCreateInfo<'_>,
    ) -> (vk::Result, vk::ImageView) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::ImageView::null())
        );
        match unsafe { fns.device.create_image_view(info, None) } {
            Ok(view) => (vk::Result::SUCCESS, view),
            Err(e) => (e, vk::ImageView::null()),
        }
    }

    fn destroy_image_view(&mut self, device: vk::Device, view: vk::ImageView) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_image_view(view, None) };
    }

    fn create_buffer_view(
        &mut self,
        device: vk::Device,
        info: &vk::BufferViewCreateInfo<'_>,
    ) -> (vk::Result, vk::BufferView) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::BufferView::null())
        );
        match unsafe { fns.device.create_buffer_view(info, None) } {
            Ok(view) => (vk::Result::SUCCESS, view),
            Err(e) => (e, vk::BufferView::null()),
        }
    }

    fn destroy_buffer_view(&mut self, device: vk::Device, view: vk::BufferView) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_buffer_view(view, None) };
    }

    fn create_sampler(
        &mut self,
        device: vk::Device,
        info: &vk::SamplerCreateInfo<'_>,
    ) -> (vk::Result, vk::Sampler) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Sampler::null())
        );
        match unsafe { fns.device.create_sampler(info, None) } {
            Ok(sampler) => (vk::Result::SUCCESS, sampler),
            Err(e) => (e, vk::Sampler::null()),
        }
    }

    fn destroy_sampler(&mut self, device: vk::Device, sampler: vk::Sampler) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_sampler(sampler, None) };
    }

    fn create_shader_module(
        &mut self,
        device: vk::Device,
        code: &[u32],
    ) -> (vk::Result, vk::ShaderModule) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::ShaderModule::null())
        );
        let info = vk::ShaderModuleCreateInfo::default().code(code);
        match unsafe { fns.device.create_shader_module(&info, None) } {
            Ok(module) => (vk::Result::SUCCESS, module),
            Err(e) => (e, vk::ShaderModule::null()),
        }
    }

    fn destroy_shader_module(&mut self, device: vk::Device, module: vk::ShaderModule) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_shader_module(module, None) };
    }

    fn create_descriptor_set_layout(
        &mut self,
        device: vk::Device,
        info: &vk::DescriptorSetLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorSetLayout) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::DescriptorSetLayout::null())
        );
        match unsafe { fns.device.create_descriptor_set_layout(info, None) } {
            Ok(layout) => (vk::Result::SUCCESS, layout),
            Err(e) => (e, vk::DescriptorSetLayout::null()),
        }
    }

    fn destroy_descriptor_set_layout(
        &mut self,
        device: vk::Device,
        layout: vk::DescriptorSetLayout,
    ) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_descriptor_set_layout(layout, None) };
    }

    fn create_descriptor_pool(
        &mut self,
        device: vk::Device,
        info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::DescriptorPool) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::DescriptorPool::null())
        );
        match unsafe { fns.device.create_descriptor_pool(info, None) } {
            Ok(pool) => (vk::Result::SUCCESS, pool),
            Err(e) => (e, vk::DescriptorPool::null()),
        }
    }

    fn destroy_descriptor_pool(&mut self, device: vk::Device, pool: vk::DescriptorPool) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_descriptor_pool(pool, None) };
    }

    fn allocate_descriptor_sets(
        &mut self,
        device: vk::Device,
        pool: vk::DescriptorPool,
        layouts: &[vk::DescriptorSetLayout],
    ) -> (vk::Result, Vec<vk::DescriptorSet>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        let info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(pool)
            .set_layouts(layouts);
        match unsafe { fns.device.allocate_descriptor_sets(&info) } {
            Ok(sets) => (vk::Result::SUCCESS, sets),
            Err(e) => (e, Vec::new()),
        }
    }

    fn free_descriptor_sets(
        &mut self,
        device: vk::Device,
        pool: vk::DescriptorPool,
        sets: &[vk::DescriptorSet],
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.free_descriptor_sets(pool, sets) })
    }

    fn update_descriptor_sets(
        &mut self,
        device: vk::Device,
        writes: &[vk::WriteDescriptorSet<'_>],
        copies: &[vk::CopyDescriptorSet<'_>],
    ) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.update_descriptor_sets(writes, copies) };
    }

    fn create_pipeline_layout(
        &mut self,
        device: vk::Device,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> (vk::Result, vk::PipelineLayout) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::PipelineLayout::null())
        );
        match unsafe { fns.device.create_pipeline_layout(info, None) } {
            Ok(layout) => (vk::Result::SUCCESS, layout),
            Err(e) => (e, vk::PipelineLayout::null()),
        }
    }

    fn destroy_pipeline_layout(&mut self, device: vk::Device, layout: vk::PipelineLayout) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_pipeline_layout(layout, None) };
    }

    fn create_pipeline_cache(
        &mut self,
        device: vk::Device,
        initial_data: &[u8],
    ) -> (vk::Result, vk::PipelineCache) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::PipelineCache::null())
        );
        let info = vk::PipelineCacheCreateInfo::default().initial_data(initial_data);
        match unsafe { fns.device.create_pipeline_cache(&info, None) } {
            Ok(cache) => (vk::Result::SUCCESS, cache),
            Err(e) => (e, vk::PipelineCache::null()),
        }
    }

    fn destroy_pipeline_cache(&mut self, device: vk::Device, cache: vk::PipelineCache) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_pipeline_cache(cache, None) };
    }

    fn get_pipeline_cache_data(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
    ) -> (vk::Result, Vec<u8>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        match unsafe { fns.device.get_pipeline_cache_data(cache) } {
            Ok(data) => (vk::Result::SUCCESS, data),
            Err(e) => (e, Vec::new()),
        }
    }

    fn create_graphics_pipelines(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
        infos: &[vk::GraphicsPipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        match unsafe { fns.device.create_graphics_pipelines(cache, infos, None) } {
            Ok(pipelines) => (vk::Result::SUCCESS, pipelines),
            Err((pipelines, e)) => (e, pipelines),
        }
    }

    fn create_compute_pipelines(
        &mut self,
        device: vk::Device,
        cache: vk::PipelineCache,
        infos: &[vk::ComputePipelineCreateInfo<'_>],
    ) -> (vk::Result, Vec<vk::Pipeline>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        match unsafe { fns.device.create_compute_pipelines(cache, infos, None) } {
            Ok(pipelines) => (vk::Result::SUCCESS, pipelines),
            Err((pipelines, e)) => (e, pipelines),
        }
    }

    fn destroy_pipeline(&mut self, device: vk::Device, pipeline: vk::Pipeline) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_pipeline(pipeline, None) };
    }

    fn create_render_pass(
        &mut self,
        device: vk::Device,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> (vk::Result, vk::RenderPass) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::RenderPass::null())
        );
        match unsafe { fns.device.create_render_pass(info, None) } {
            Ok(render_pass) => (vk::Result::SUCCESS, render_pass),
            Err(e) => (e, vk::RenderPass::null()),
        }
    }

    fn destroy_render_pass(&mut self, device: vk::Device, render_pass: vk::RenderPass) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_render_pass(render_pass, None) };
    }

    fn create_framebuffer(
        &mut self,
        device: vk::Device,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> (vk::Result, vk::Framebuffer) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Framebuffer::null())
        );
        match unsafe { fns.device.create_framebuffer(info, None) } {
            Ok(framebuffer) => (vk::Result::SUCCESS, framebuffer),
            Err(e) => (e, vk::Framebuffer::null()),
        }
    }

    fn destroy_framebuffer(&mut self, device: vk::Device, framebuffer: vk::Framebuffer) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_framebuffer(framebuffer, None) };
    }

    fn create_command_pool(
        &mut self,
        device: vk::Device,
        info: &vk::CommandPoolCreateInfo<'_>,
    ) -> (vk::Result, vk::CommandPool) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::CommandPool::null())
        );
        match unsafe { fns.device.create_command_pool(info, None) } {
            Ok(pool) => (vk::Result::SUCCESS, pool),
            Err(e) => (e, vk::CommandPool::null()),
        }
    }

    fn destroy_command_pool(&mut self, device: vk::Device, pool: vk::CommandPool) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_command_pool(pool, None) };
    }

    fn reset_command_pool(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags,
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.reset_command_pool(pool, flags) })
    }

    fn allocate_command_buffers(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> (vk::Result, Vec<vk::CommandBuffer>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(level)
            .command_buffer_count(count);
        match unsafe { fns.device.allocate_command_buffers(&info) } {
            Ok(buffers) => {
                for cb in &buffers {
                    self.command_buffer_owner.insert(cb.as_raw(), device.as_raw());
                }
                (vk::Result::SUCCESS, buffers)
            }
            Err(e) => (e, Vec::new()),
        }
    }

    fn free_command_buffers(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        buffers: &[vk::CommandBuffer],
    ) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.free_command_buffers(pool, buffers) };
        for cb in buffers {
            self.command_buffer_owner.remove(&cb.as_raw());
        }
    }

    fn begin_command_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        info: &vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.begin_command_buffer(cb, info) })
    }

    fn end_command_buffer(&mut self, cb: vk::CommandBuffer) -> vk::Result {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.end_command_buffer(cb) })
    }

    fn reset_command_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        flags: vk::CommandBufferResetFlags,
    ) -> vk::Result {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.reset_command_buffer(cb, flags) })
    }

    fn cmd_bind_pipeline(
        &mut self,
        cb: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_bind_pipeline(cb, bind_point, pipeline) };
    }

    fn cmd_bind_descriptor_sets(
        &mut self,
        cb: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
        dynamic_offsets: &[u32],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device
                .cmd_bind_descriptor_sets(cb, bind_point, layout, first_set, sets, dynamic_offsets)
        };
    }

    fn cmd_bind_vertex_buffers(
        &mut self,
        cb: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[u64],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device
                .cmd_bind_vertex_buffers(cb, first_binding, buffers, offsets)
        };
    }

    fn cmd_bind_index_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: u64,
        index_type: vk::IndexType,
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_bind_index_buffer(cb, buffer, offset, index_type) };
    }

    fn cmd_begin_render_pass(
        &mut self,
        cb: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents,
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_begin_render_pass(cb, info, contents) };
    }

    fn cmd_next_subpass(&mut self, cb: vk::CommandBuffer, contents: vk::SubpassContents) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_next_subpass(cb, contents) };
    }

    fn cmd_end_render_pass(&mut self, cb: vk::CommandBuffer) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_end_render_pass(cb) };
    }

    fn cmd_draw(
        &mut self,
        cb: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device
                .cmd_draw(cb, vertex_count, instance_count, first_vertex, first_instance)
        };
    }

    fn cmd_draw_indexed(
        &mut self,
        cb: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device.cmd_draw_indexed(
                cb,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            )
        };
    }

    fn cmd_dispatch(&mut self, cb: vk::CommandBuffer, x: u32, y: u32, z: u32) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_dispatch(cb, x, y, z) };
    }

    fn cmd_copy_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        regions: &[vk::BufferCopy],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_copy_buffer(cb, src, dst, regions) };
    }

    fn cmd_copy_buffer_to_image(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Image,
        dst_layout: vk::ImageLayout,
        regions: &[vk::BufferImageCopy],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device
                .cmd_copy_buffer_to_image(cb, src, dst, dst_layout, regions)
        };
    }

    fn cmd_copy_image_to_buffer(
        &mut self,
        cb: vk::CommandBuffer,
        src: vk::Image,
        src_layout: vk::ImageLayout,
        dst: vk::Buffer,
        regions: &[vk::BufferImageCopy],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device
                .cmd_copy_image_to_buffer(cb, src, src_layout, dst, regions)
        };
    }

    fn cmd_pipeline_barrier(
        &mut self,
        cb: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device.cmd_pipeline_barrier(
                cb,
                src_stage,
                dst_stage,
                dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            )
        };
    }

    fn cmd_wait_events(
        &mut self,
        cb: vk::CommandBuffer,
        events: &[vk::Event],
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe {
            fns.device.cmd_wait_events(
                cb,
                events,
                src_stage,
                dst_stage,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            )
        };
    }

    fn cmd_set_viewport(&mut self, cb: vk::CommandBuffer, first: u32, viewports: &[vk::Viewport]) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_set_viewport(cb, first, viewports) };
    }

    fn cmd_set_scissor(&mut self, cb: vk::CommandBuffer, first: u32, scissors: &[vk::Rect2D]) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_set_scissor(cb, first, scissors) };
    }

    fn cmd_push_constants(
        &mut self,
        cb: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        let fns = fns_or!(self.dev_for_cb(cb), "command buffer", ());
        unsafe { fns.device.cmd_push_constants(cb, layout, stages, offset, data) };
    }

    fn create_fence(&mut self, device: vk::Device, signaled: bool) -> (vk::Result, vk::Fence) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Fence::null())
        );
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let info = vk::FenceCreateInfo::default().flags(flags);
        match unsafe { fns.device.create_fence(&info, None) } {
            Ok(fence) => (vk::Result::SUCCESS, fence),
            Err(e) => (e, vk::Fence::null()),
        }
    }

    fn destroy_fence(&mut self, device: vk::Device, fence: vk::Fence) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_fence(fence, None) };
    }

    fn wait_for_fences(
        &mut self,
        device: vk::Device,
        fences: &[vk::Fence],
        wait_all: bool,
        timeout: u64,
    ) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.wait_for_fences(fences, wait_all, timeout) })
    }

    fn reset_fences(&mut self, device: vk::Device, fences: &[vk::Fence]) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        unit(unsafe { fns.device.reset_fences(fences) })
    }

    fn get_fence_status(&mut self, device: vk::Device, fence: vk::Fence) -> vk::Result {
        let fns = fns_or!(self.dev(device), "device", vk::Result::ERROR_DEVICE_LOST);
        match unsafe { fns.device.get_fence_status(fence) } {
            Ok(true) => vk::Result::SUCCESS,
            Ok(false) => vk::Result::NOT_READY,
            Err(e) => e,
        }
    }

    fn create_semaphore(&mut self, device: vk::Device) -> (vk::Result, vk::Semaphore) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Semaphore::null())
        );
        let info = vk::SemaphoreCreateInfo::default();
        match unsafe { fns.device.create_semaphore(&info, None) } {
            Ok(semaphore) => (vk::Result::SUCCESS, semaphore),
            Err(e) => (e, vk::Semaphore::null()),
        }
    }

    fn destroy_semaphore(&mut self, device: vk::Device, semaphore: vk::Semaphore) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_semaphore(semaphore, None) };
    }

    fn create_event(&mut self, device: vk::Device) -> (vk::Result, vk::Event) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::Event::null())
        );
        let info = vk::EventCreateInfo::default();
        match unsafe { fns.device.create_event(&info, None) } {
            Ok(event) => (vk::Result::SUCCESS, event),
            Err(e) => (e, vk::Event::null()),
        }
    }

    fn destroy_event(&mut self, device: vk::Device, event: vk::Event) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.device.destroy_event(event, None) };
    }

    fn create_window_surface(
        &mut self,
        instance: vk::Instance,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> (vk::Result, vk::SurfaceKHR) {
        let fns = fns_or!(
            self.inst(instance),
            "instance",
            (vk::Result::ERROR_INITIALIZATION_FAILED, vk::SurfaceKHR::null())
        );
        match unsafe {
            ash_window::create_surface(&self.entry, &fns.instance, display, window, None)
        } {
            Ok(surface) => (vk::Result::SUCCESS, surface),
            Err(e) => (e, vk::SurfaceKHR::null()),
        }
    }

    fn destroy_surface(&mut self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        let fns = fns_or!(self.inst(instance), "instance", ());
        unsafe { fns.surface.destroy_surface(surface, None) };
    }

    fn get_surface_support(
        &mut self,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, bool) {
        let fns = fns_or!(
            self.physical_device_parent
                .get(&physical_device.as_raw())
                .and_then(|raw| self.instances.get(raw)),
            "physical device",
            (vk::Result::ERROR_INITIALIZATION_FAILED, false)
        );
        match unsafe {
            fns.surface
                .get_physical_device_surface_support(physical_device, queue_family, surface)
        } {
            Ok(supported) => (vk::Result::SUCCESS, supported),
            Err(e) => (e, false),
        }
    }

    fn get_surface_capabilities(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, vk::SurfaceCapabilitiesKHR) {
        let fns = fns_or!(
            self.physical_device_parent
                .get(&physical_device.as_raw())
                .and_then(|raw| self.instances.get(raw)),
            "physical device",
            (
                vk::Result::ERROR_INITIALIZATION_FAILED,
                vk::SurfaceCapabilitiesKHR::default()
            )
        );
        match unsafe {
            fns.surface
                .get_physical_device_surface_capabilities(physical_device, surface)
        } {
            Ok(caps) => (vk::Result::SUCCESS, caps),
            Err(e) => (e, vk::SurfaceCapabilitiesKHR::default()),
        }
    }

    fn get_surface_formats(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::SurfaceFormatKHR>) {
        let fns = fns_or!(
            self.physical_device_parent
                .get(&physical_device.as_raw())
                .and_then(|raw| self.instances.get(raw)),
            "physical device",
            (vk::Result::ERROR_INITIALIZATION_FAILED, Vec::new())
        );
        match unsafe {
            fns.surface
                .get_physical_device_surface_formats(physical_device, surface)
        } {
            Ok(formats) => (vk::Result::SUCCESS, formats),
            Err(e) => (e, Vec::new()),
        }
    }

    fn get_surface_present_modes(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> (vk::Result, Vec<vk::PresentModeKHR>) {
        let fns = fns_or!(
            self.physical_device_parent
                .get(&physical_device.as_raw())
                .and_then(|raw| self.instances.get(raw)),
            "physical device",
            (vk::Result::ERROR_INITIALIZATION_FAILED, Vec::new())
        );
        match unsafe {
            fns.surface
                .get_physical_device_surface_present_modes(physical_device, surface)
        } {
            Ok(modes) => (vk::Result::SUCCESS, modes),
            Err(e) => (e, Vec::new()),
        }
    }

    fn create_swapchain(
        &mut self,
        device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> (vk::Result, vk::SwapchainKHR) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, vk::SwapchainKHR::null())
        );
        match unsafe { fns.swapchain.create_swapchain(info, None) } {
            Ok(swapchain) => (vk::Result::SUCCESS, swapchain),
            Err(e) => (e, vk::SwapchainKHR::null()),
        }
    }

    fn destroy_swapchain(&mut self, device: vk::Device, swapchain: vk::SwapchainKHR) {
        let fns = fns_or!(self.dev(device), "device", ());
        unsafe { fns.swapchain.destroy_swapchain(swapchain, None) };
    }

    fn get_swapchain_images(
        &mut self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> (vk::Result, Vec<vk::Image>) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, Vec::new())
        );
        match unsafe { fns.swapchain.get_swapchain_images(swapchain) } {
            Ok(images) => (vk::Result::SUCCESS, images),
            Err(e) => (e, Vec::new()),
        }
    }

    fn acquire_next_image(
        &mut self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
    ) -> (vk::Result, u32) {
        let fns = fns_or!(
            self.dev(device),
            "device",
            (vk::Result::ERROR_DEVICE_LOST, 0)
        );
        match unsafe {
            fns.swapchain
                .acquire_next_image(swapchain, timeout, semaphore, fence)
        } {
            Ok((index, false)) => (vk::Result::SUCCESS, index),
            Ok((index, true)) => (vk::Result::SUBOPTIMAL_KHR, index),
            Err(e) => (e, 0),
        }
    }
}
