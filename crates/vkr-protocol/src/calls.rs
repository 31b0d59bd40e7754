//! Serialized call arguments and the per-packet call enum.
//!
//! Enum and flag fields keep the raw `i32`/`u32` values the trace recorded;
//! the replay handlers convert them with `vk::*::from_raw` at dispatch time.
//! Handles embedded in arguments are [`RecordedHandle`] values and must be
//! remapped before the call can be forwarded to the driver.

use serde::{Deserialize, Serialize};

use crate::blob::{Blob, BlobRange};
use crate::handle::RecordedHandle;

/// One recorded API call plus the result the driver returned at record time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub call: VulkanCall,
    /// Raw `VkResult` observed at record time (0 for void entry points).
    pub recorded_result: i32,
    /// Byte payloads referenced by [`BlobRange`] fields inside `call`.
    #[serde(default)]
    pub blob: Blob,
}

impl Packet {
    pub fn new(call: VulkanCall) -> Self {
        Packet {
            call,
            recorded_result: 0,
            blob: Blob::default(),
        }
    }

    pub fn with_result(call: VulkanCall, recorded_result: i32) -> Self {
        Packet {
            call,
            recorded_result,
            blob: Blob::default(),
        }
    }

    pub fn entry_point(&self) -> &'static str {
        self.call.entry_point()
    }
}

// ============================================================================
// Serialized Vulkan structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedInstanceCreateInfo {
    pub application_name: Option<String>,
    pub application_version: u32,
    pub engine_name: Option<String>,
    pub engine_version: u32,
    pub api_version: u32,
    pub enabled_layers: Vec<String>,
    pub enabled_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDeviceQueueCreateInfo {
    pub queue_family_index: u32,
    pub queue_priorities: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDeviceCreateInfo {
    pub queue_create_infos: Vec<SerializedDeviceQueueCreateInfo>,
    pub enabled_layers: Vec<String>,
    pub enabled_extensions: Vec<String>,
    /// Raw `VkPhysicalDeviceFeatures` bytes, when the trace recorded one.
    pub enabled_features: Option<BlobRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSubmitInfo {
    pub wait_semaphores: Vec<RecordedHandle>,
    pub wait_dst_stage_masks: Vec<u32>,
    pub command_buffers: Vec<RecordedHandle>,
    pub signal_semaphores: Vec<RecordedHandle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedMappedMemoryRange {
    pub memory: RecordedHandle,
    pub offset: u64,
    pub size: u64,
    /// The flushed bytes as the trace captured them.
    pub data: BlobRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedExtent2D {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedExtent3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedOffset2D {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedOffset3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRect2D {
    pub offset: SerializedOffset2D,
    pub extent: SerializedExtent2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedBufferCreateInfo {
    pub flags: u32,
    pub size: u64,
    pub usage: u32,
    pub sharing_mode: i32,
    pub queue_family_indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedImageCreateInfo {
    pub flags: u32,
    pub image_type: i32,
    pub format: i32,
    pub extent: SerializedExtent3D,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub samples: u32,
    pub tiling: i32,
    pub usage: u32,
    pub sharing_mode: i32,
    pub queue_family_indices: Vec<u32>,
    pub initial_layout: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedImageSubresourceRange {
    pub aspect_mask: u32,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedImageSubresourceLayers {
    pub aspect_mask: u32,
    pub mip_level: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedImageViewCreateInfo {
    pub image: RecordedHandle,
    pub view_type: i32,
    pub format: i32,
    /// r/g/b/a component swizzles as raw `VkComponentSwizzle` values.
    pub components: [i32; 4],
    pub subresource_range: SerializedImageSubresourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedBufferViewCreateInfo {
    pub buffer: RecordedHandle,
    pub format: i32,
    pub offset: u64,
    pub range: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSamplerCreateInfo {
    pub mag_filter: i32,
    pub min_filter: i32,
    pub mipmap_mode: i32,
    pub address_mode_u: i32,
    pub address_mode_v: i32,
    pub address_mode_w: i32,
    pub mip_lod_bias: f32,
    pub anisotropy_enable: bool,
    pub max_anisotropy: f32,
    pub compare_enable: bool,
    pub compare_op: i32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub border_color: i32,
    pub unnormalized_coordinates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: i32,
    pub descriptor_count: u32,
    pub stage_flags: u32,
    pub immutable_samplers: Vec<RecordedHandle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDescriptorSetLayoutCreateInfo {
    pub flags: u32,
    pub bindings: Vec<SerializedDescriptorSetLayoutBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDescriptorPoolSize {
    pub descriptor_type: i32,
    pub descriptor_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedDescriptorImageInfo {
    pub sampler: RecordedHandle,
    pub image_view: RecordedHandle,
    pub image_layout: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedDescriptorBufferInfo {
    pub buffer: RecordedHandle,
    pub offset: u64,
    pub range: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedWriteDescriptorSet {
    pub dst_set: RecordedHandle,
    pub dst_binding: u32,
    pub dst_array_element: u32,
    pub descriptor_type: i32,
    /// Exactly one of the three arrays is populated, selected by
    /// `descriptor_type`; its length is the write's descriptor count.
    pub image_infos: Vec<SerializedDescriptorImageInfo>,
    pub buffer_infos: Vec<SerializedDescriptorBufferInfo>,
    pub texel_buffer_views: Vec<RecordedHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedCopyDescriptorSet {
    pub src_set: RecordedHandle,
    pub src_binding: u32,
    pub src_array_element: u32,
    pub dst_set: RecordedHandle,
    pub dst_binding: u32,
    pub dst_array_element: u32,
    pub descriptor_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPushConstantRange {
    pub stage_flags: u32,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSpecializationMapEntry {
    pub constant_id: u32,
    pub offset: u32,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSpecializationInfo {
    pub map_entries: Vec<SerializedSpecializationMapEntry>,
    pub data: BlobRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPipelineShaderStageCreateInfo {
    pub stage: u32,
    pub module: RecordedHandle,
    pub entry_point: String,
    pub specialization: Option<SerializedSpecializationInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedComputePipelineCreateInfo {
    pub flags: u32,
    pub stage: SerializedPipelineShaderStageCreateInfo,
    pub layout: RecordedHandle,
    pub base_pipeline: RecordedHandle,
    pub base_pipeline_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedVertexInputBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedVertexInputAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: i32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedVertexInputState {
    pub bindings: Vec<SerializedVertexInputBinding>,
    pub attributes: Vec<SerializedVertexInputAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedInputAssemblyState {
    pub topology: i32,
    pub primitive_restart_enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedViewportState {
    pub viewport_count: u32,
    pub scissor_count: u32,
    /// `Viewport` records in the packet blob; empty when the state is dynamic.
    pub viewports: BlobRange,
    /// `ScissorRect` records in the packet blob; empty when the state is dynamic.
    pub scissors: BlobRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedRasterizationState {
    pub depth_clamp_enable: bool,
    pub rasterizer_discard_enable: bool,
    pub polygon_mode: i32,
    pub cull_mode: u32,
    pub front_face: i32,
    pub depth_bias_enable: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_factor: f32,
    pub line_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedMultisampleState {
    pub rasterization_samples: u32,
    pub sample_shading_enable: bool,
    pub min_sample_shading: f32,
    /// `u32` sample-mask words in the packet blob; empty for no mask.
    pub sample_mask: BlobRange,
    pub alpha_to_coverage_enable: bool,
    pub alpha_to_one_enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedStencilOpState {
    pub fail_op: i32,
    pub pass_op: i32,
    pub depth_fail_op: i32,
    pub compare_op: i32,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedDepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: i32,
    pub depth_bounds_test_enable: bool,
    pub stencil_test_enable: bool,
    pub front: SerializedStencilOpState,
    pub back: SerializedStencilOpState,
    pub min_depth_bounds: f32,
    pub max_depth_bounds: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedColorBlendAttachment {
    pub blend_enable: bool,
    pub src_color_blend_factor: i32,
    pub dst_color_blend_factor: i32,
    pub color_blend_op: i32,
    pub src_alpha_blend_factor: i32,
    pub dst_alpha_blend_factor: i32,
    pub alpha_blend_op: i32,
    pub color_write_mask: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedColorBlendState {
    pub logic_op_enable: bool,
    pub logic_op: i32,
    pub attachments: Vec<SerializedColorBlendAttachment>,
    pub blend_constants: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraphicsPipelineCreateInfo {
    pub flags: u32,
    pub stages: Vec<SerializedPipelineShaderStageCreateInfo>,
    pub vertex_input: SerializedVertexInputState,
    pub input_assembly: SerializedInputAssemblyState,
    pub tessellation_patch_control_points: Option<u32>,
    pub viewport: Option<SerializedViewportState>,
    pub rasterization: SerializedRasterizationState,
    pub multisample: Option<SerializedMultisampleState>,
    pub depth_stencil: Option<SerializedDepthStencilState>,
    pub color_blend: Option<SerializedColorBlendState>,
    pub dynamic_states: Vec<i32>,
    pub layout: RecordedHandle,
    pub render_pass: RecordedHandle,
    pub subpass: u32,
    pub base_pipeline: RecordedHandle,
    pub base_pipeline_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAttachmentDescription {
    pub flags: u32,
    pub format: i32,
    pub samples: u32,
    pub load_op: i32,
    pub store_op: i32,
    pub stencil_load_op: i32,
    pub stencil_store_op: i32,
    pub initial_layout: i32,
    pub final_layout: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAttachmentReference {
    pub attachment: u32,
    pub layout: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSubpassDescription {
    pub pipeline_bind_point: i32,
    pub input_attachments: Vec<SerializedAttachmentReference>,
    pub color_attachments: Vec<SerializedAttachmentReference>,
    pub resolve_attachments: Vec<SerializedAttachmentReference>,
    pub depth_stencil_attachment: Option<SerializedAttachmentReference>,
    pub preserve_attachments: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSubpassDependency {
    pub src_subpass: u32,
    pub dst_subpass: u32,
    pub src_stage_mask: u32,
    pub dst_stage_mask: u32,
    pub src_access_mask: u32,
    pub dst_access_mask: u32,
    pub dependency_flags: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedRenderPassCreateInfo {
    pub attachments: Vec<SerializedAttachmentDescription>,
    pub subpasses: Vec<SerializedSubpassDescription>,
    pub dependencies: Vec<SerializedSubpassDependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFramebufferCreateInfo {
    pub render_pass: RecordedHandle,
    pub attachments: Vec<RecordedHandle>,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedCommandBufferInheritanceInfo {
    pub render_pass: RecordedHandle,
    pub subpass: u32,
    pub framebuffer: RecordedHandle,
    pub occlusion_query_enable: bool,
    pub query_flags: u32,
    pub pipeline_statistics: u32,
}

/// Clear value as raw words; the driver reinterprets them per attachment
/// format, so no typed view is needed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedClearValue {
    pub raw: [u32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedRenderPassBeginInfo {
    pub render_pass: RecordedHandle,
    pub framebuffer: RecordedHandle,
    pub render_area: SerializedRect2D,
    pub clear_values: Vec<SerializedClearValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMemoryBarrier {
    pub src_access_mask: u32,
    pub dst_access_mask: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedBufferMemoryBarrier {
    pub src_access_mask: u32,
    pub dst_access_mask: u32,
    pub src_queue_family_index: u32,
    pub dst_queue_family_index: u32,
    pub buffer: RecordedHandle,
    pub offset: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedImageMemoryBarrier {
    pub src_access_mask: u32,
    pub dst_access_mask: u32,
    pub old_layout: i32,
    pub new_layout: i32,
    pub src_queue_family_index: u32,
    pub dst_queue_family_index: u32,
    pub image: RecordedHandle,
    pub subresource_range: SerializedImageSubresourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedBufferCopy {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedBufferImageCopy {
    pub buffer_offset: u64,
    pub buffer_row_length: u32,
    pub buffer_image_height: u32,
    pub image_subresource: SerializedImageSubresourceLayers,
    pub image_offset: SerializedOffset3D,
    pub image_extent: SerializedExtent3D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSwapchainCreateInfo {
    pub surface: RecordedHandle,
    pub min_image_count: u32,
    pub image_format: i32,
    pub image_color_space: i32,
    pub image_extent: SerializedExtent2D,
    pub image_array_layers: u32,
    pub image_usage: u32,
    pub image_sharing_mode: i32,
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: u32,
    pub composite_alpha: u32,
    pub present_mode: i32,
    pub clipped: bool,
    pub old_swapchain: RecordedHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPresentInfo {
    pub wait_semaphores: Vec<RecordedHandle>,
    pub swapchains: Vec<RecordedHandle>,
    pub image_indices: Vec<u32>,
    /// Per-swapchain results as recorded, when the application asked for them.
    pub results: Option<Vec<i32>>,
}

// ============================================================================
// The call enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VulkanCall {
    // ── Instance ────────────────────────────────────────────
    CreateInstance {
        create_info: SerializedInstanceCreateInfo,
        recorded_instance: RecordedHandle,
    },
    DestroyInstance {
        instance: RecordedHandle,
    },
    EnumeratePhysicalDevices {
        instance: RecordedHandle,
        recorded_devices: Vec<RecordedHandle>,
    },
    CreateDebugReportCallback {
        instance: RecordedHandle,
        flags: u32,
        recorded_callback: RecordedHandle,
    },
    DestroyDebugReportCallback {
        instance: RecordedHandle,
        callback: RecordedHandle,
    },

    // ── Device ──────────────────────────────────────────────
    CreateDevice {
        physical_device: RecordedHandle,
        create_info: SerializedDeviceCreateInfo,
        recorded_device: RecordedHandle,
    },
    DestroyDevice {
        device: RecordedHandle,
    },
    GetDeviceQueue {
        device: RecordedHandle,
        queue_family_index: u32,
        queue_index: u32,
        recorded_queue: RecordedHandle,
    },
    DeviceWaitIdle {
        device: RecordedHandle,
    },
    QueueSubmit {
        queue: RecordedHandle,
        submits: Vec<SerializedSubmitInfo>,
        fence: RecordedHandle,
    },
    QueueWaitIdle {
        queue: RecordedHandle,
    },

    // ── Memory ──────────────────────────────────────────────
    AllocateMemory {
        device: RecordedHandle,
        allocation_size: u64,
        memory_type_index: u32,
        recorded_memory: RecordedHandle,
    },
    FreeMemory {
        device: RecordedHandle,
        memory: RecordedHandle,
    },
    MapMemory {
        device: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
        size: u64,
        flags: u32,
    },
    UnmapMemory {
        device: RecordedHandle,
        memory: RecordedHandle,
        /// Bytes the application wrote into the mapping, as recorded.
        data: BlobRange,
    },
    FlushMappedMemoryRanges {
        device: RecordedHandle,
        ranges: Vec<SerializedMappedMemoryRange>,
    },

    // ── Buffers, images, views, samplers, shaders ───────────
    CreateBuffer {
        device: RecordedHandle,
        create_info: SerializedBufferCreateInfo,
        recorded_buffer: RecordedHandle,
    },
    DestroyBuffer {
        device: RecordedHandle,
        buffer: RecordedHandle,
    },
    BindBufferMemory {
        device: RecordedHandle,
        buffer: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
    },
    CreateImage {
        device: RecordedHandle,
        create_info: SerializedImageCreateInfo,
        recorded_image: RecordedHandle,
    },
    DestroyImage {
        device: RecordedHandle,
        image: RecordedHandle,
    },
    BindImageMemory {
        device: RecordedHandle,
        image: RecordedHandle,
        memory: RecordedHandle,
        offset: u64,
    },
    CreateImageView {
        device: RecordedHandle,
        create_info: SerializedImageViewCreateInfo,
        recorded_view: RecordedHandle,
    },
    DestroyImageView {
        device: RecordedHandle,
        image_view: RecordedHandle,
    },
    CreateBufferView {
        device: RecordedHandle,
        create_info: SerializedBufferViewCreateInfo,
        recorded_view: RecordedHandle,
    },
    DestroyBufferView {
        device: RecordedHandle,
        buffer_view: RecordedHandle,
    },
    CreateSampler {
        device: RecordedHandle,
        create_info: SerializedSamplerCreateInfo,
        recorded_sampler: RecordedHandle,
    },
    DestroySampler {
        device: RecordedHandle,
        sampler: RecordedHandle,
    },
    CreateShaderModule {
        device: RecordedHandle,
        /// SPIR-V words in the packet blob.
        code: BlobRange,
        recorded_module: RecordedHandle,
    },
    DestroyShaderModule {
        device: RecordedHandle,
        shader_module: RecordedHandle,
    },

    // ── Descriptors ─────────────────────────────────────────
    CreateDescriptorSetLayout {
        device: RecordedHandle,
        create_info: SerializedDescriptorSetLayoutCreateInfo,
        recorded_layout: RecordedHandle,
    },
    DestroyDescriptorSetLayout {
        device: RecordedHandle,
        layout: RecordedHandle,
    },
    CreateDescriptorPool {
        device: RecordedHandle,
        flags: u32,
        max_sets: u32,
        pool_sizes: Vec<SerializedDescriptorPoolSize>,
        recorded_pool: RecordedHandle,
    },
    DestroyDescriptorPool {
        device: RecordedHandle,
        pool: RecordedHandle,
    },
    AllocateDescriptorSets {
        device: RecordedHandle,
        descriptor_pool: RecordedHandle,
        set_layouts: Vec<RecordedHandle>,
        recorded_sets: Vec<RecordedHandle>,
    },
    FreeDescriptorSets {
        device: RecordedHandle,
        descriptor_pool: RecordedHandle,
        descriptor_sets: Vec<RecordedHandle>,
    },
    UpdateDescriptorSets {
        device: RecordedHandle,
        writes: Vec<SerializedWriteDescriptorSet>,
        copies: Vec<SerializedCopyDescriptorSet>,
    },

    // ── Pipelines ───────────────────────────────────────────
    CreatePipelineLayout {
        device: RecordedHandle,
        set_layouts: Vec<RecordedHandle>,
        push_constant_ranges: Vec<SerializedPushConstantRange>,
        recorded_layout: RecordedHandle,
    },
    DestroyPipelineLayout {
        device: RecordedHandle,
        layout: RecordedHandle,
    },
    CreatePipelineCache {
        device: RecordedHandle,
        initial_data: BlobRange,
        recorded_cache: RecordedHandle,
    },
    DestroyPipelineCache {
        device: RecordedHandle,
        cache: RecordedHandle,
    },
    GetPipelineCacheData {
        device: RecordedHandle,
        cache: RecordedHandle,
    },
    CreateGraphicsPipelines {
        device: RecordedHandle,
        pipeline_cache: RecordedHandle,
        create_infos: Vec<SerializedGraphicsPipelineCreateInfo>,
        recorded_pipelines: Vec<RecordedHandle>,
    },
    CreateComputePipelines {
        device: RecordedHandle,
        pipeline_cache: RecordedHandle,
        create_infos: Vec<SerializedComputePipelineCreateInfo>,
        recorded_pipelines: Vec<RecordedHandle>,
    },
    DestroyPipeline {
        device: RecordedHandle,
        pipeline: RecordedHandle,
    },

    // ── Render passes and framebuffers ──────────────────────
    CreateRenderPass {
        device: RecordedHandle,
        create_info: SerializedRenderPassCreateInfo,
        recorded_render_pass: RecordedHandle,
    },
    DestroyRenderPass {
        device: RecordedHandle,
        render_pass: RecordedHandle,
    },
    CreateFramebuffer {
        device: RecordedHandle,
        create_info: SerializedFramebufferCreateInfo,
        recorded_framebuffer: RecordedHandle,
    },
    DestroyFramebuffer {
        device: RecordedHandle,
        framebuffer: RecordedHandle,
    },

    // ── Command pools and buffers ───────────────────────────
    CreateCommandPool {
        device: RecordedHandle,
        queue_family_index: u32,
        flags: u32,
        recorded_pool: RecordedHandle,
    },
    DestroyCommandPool {
        device: RecordedHandle,
        pool: RecordedHandle,
    },
    ResetCommandPool {
        device: RecordedHandle,
        pool: RecordedHandle,
        flags: u32,
    },
    AllocateCommandBuffers {
        device: RecordedHandle,
        command_pool: RecordedHandle,
        level: i32,
        recorded_buffers: Vec<RecordedHandle>,
    },
    FreeCommandBuffers {
        device: RecordedHandle,
        command_pool: RecordedHandle,
        command_buffers: Vec<RecordedHandle>,
    },
    BeginCommandBuffer {
        command_buffer: RecordedHandle,
        flags: u32,
        inheritance: Option<SerializedCommandBufferInheritanceInfo>,
    },
    EndCommandBuffer {
        command_buffer: RecordedHandle,
    },
    ResetCommandBuffer {
        command_buffer: RecordedHandle,
        flags: u32,
    },
    CmdBindPipeline {
        command_buffer: RecordedHandle,
        pipeline_bind_point: i32,
        pipeline: RecordedHandle,
    },
    CmdBindDescriptorSets {
        command_buffer: RecordedHandle,
        pipeline_bind_point: i32,
        layout: RecordedHandle,
        first_set: u32,
        descriptor_sets: Vec<RecordedHandle>,
        dynamic_offsets: Vec<u32>,
    },
    CmdBindVertexBuffers {
        command_buffer: RecordedHandle,
        first_binding: u32,
        buffers: Vec<RecordedHandle>,
        offsets: Vec<u64>,
    },
    CmdBindIndexBuffer {
        command_buffer: RecordedHandle,
        buffer: RecordedHandle,
        offset: u64,
        index_type: i32,
    },
    CmdBeginRenderPass {
        command_buffer: RecordedHandle,
        begin_info: SerializedRenderPassBeginInfo,
        contents: i32,
    },
    CmdNextSubpass {
        command_buffer: RecordedHandle,
        contents: i32,
    },
    CmdEndRenderPass {
        command_buffer: RecordedHandle,
    },
    CmdDraw {
        command_buffer: RecordedHandle,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    CmdDrawIndexed {
        command_buffer: RecordedHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    CmdDispatch {
        command_buffer: RecordedHandle,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    CmdCopyBuffer {
        command_buffer: RecordedHandle,
        src_buffer: RecordedHandle,
        dst_buffer: RecordedHandle,
        regions: Vec<SerializedBufferCopy>,
    },
    CmdCopyBufferToImage {
        command_buffer: RecordedHandle,
        src_buffer: RecordedHandle,
        dst_image: RecordedHandle,
        dst_image_layout: i32,
        regions: Vec<SerializedBufferImageCopy>,
    },
    CmdCopyImageToBuffer {
        command_buffer: RecordedHandle,
        src_image: RecordedHandle,
        src_image_layout: i32,
        dst_buffer: RecordedHandle,
        regions: Vec<SerializedBufferImageCopy>,
    },
    CmdPipelineBarrier {
        command_buffer: RecordedHandle,
        src_stage_mask: u32,
        dst_stage_mask: u32,
        dependency_flags: u32,
        memory_barriers: Vec<SerializedMemoryBarrier>,
        buffer_barriers: Vec<SerializedBufferMemoryBarrier>,
        image_barriers: Vec<SerializedImageMemoryBarrier>,
    },
    CmdWaitEvents {
        command_buffer: RecordedHandle,
        events: Vec<RecordedHandle>,
        src_stage_mask: u32,
        dst_stage_mask: u32,
        memory_barriers: Vec<SerializedMemoryBarrier>,
        buffer_barriers: Vec<SerializedBufferMemoryBarrier>,
        image_barriers: Vec<SerializedImageMemoryBarrier>,
    },
    CmdSetViewport {
        command_buffer: RecordedHandle,
        first_viewport: u32,
        /// `Viewport` records in the packet blob.
        viewports: BlobRange,
    },
    CmdSetScissor {
        command_buffer: RecordedHandle,
        first_scissor: u32,
        /// `ScissorRect` records in the packet blob.
        scissors: BlobRange,
    },
    CmdPushConstants {
        command_buffer: RecordedHandle,
        layout: RecordedHandle,
        stage_flags: u32,
        offset: u32,
        values: BlobRange,
    },

    // ── Synchronization ─────────────────────────────────────
    CreateFence {
        device: RecordedHandle,
        signaled: bool,
        recorded_fence: RecordedHandle,
    },
    DestroyFence {
        device: RecordedHandle,
        fence: RecordedHandle,
    },
    WaitForFences {
        device: RecordedHandle,
        fences: Vec<RecordedHandle>,
        wait_all: bool,
        timeout: u64,
    },
    ResetFences {
        device: RecordedHandle,
        fences: Vec<RecordedHandle>,
    },
    GetFenceStatus {
        device: RecordedHandle,
        fence: RecordedHandle,
    },
    CreateSemaphore {
        device: RecordedHandle,
        recorded_semaphore: RecordedHandle,
    },
    DestroySemaphore {
        device: RecordedHandle,
        semaphore: RecordedHandle,
    },
    CreateEvent {
        device: RecordedHandle,
        recorded_event: RecordedHandle,
    },
    DestroyEvent {
        device: RecordedHandle,
        event: RecordedHandle,
    },

    // ── Window-system integration ───────────────────────────
    CreateXcbSurface {
        instance: RecordedHandle,
        /// Record-time connection pointer; replaced with the live window.
        connection: u64,
        window: u32,
        recorded_surface: RecordedHandle,
    },
    CreateXlibSurface {
        instance: RecordedHandle,
        display: u64,
        window: u64,
        recorded_surface: RecordedHandle,
    },
    CreateWin32Surface {
        instance: RecordedHandle,
        hinstance: u64,
        hwnd: u64,
        recorded_surface: RecordedHandle,
    },
    DestroySurface {
        instance: RecordedHandle,
        surface: RecordedHandle,
    },
    GetPhysicalDeviceSurfaceSupport {
        physical_device: RecordedHandle,
        queue_family_index: u32,
        surface: RecordedHandle,
    },
    GetPhysicalDeviceSurfaceCapabilities {
        physical_device: RecordedHandle,
        surface: RecordedHandle,
        recorded_current_extent: SerializedExtent2D,
    },
    GetPhysicalDeviceSurfaceFormats {
        physical_device: RecordedHandle,
        surface: RecordedHandle,
    },
    GetPhysicalDeviceSurfacePresentModes {
        physical_device: RecordedHandle,
        surface: RecordedHandle,
    },
    CreateSwapchain {
        device: RecordedHandle,
        create_info: SerializedSwapchainCreateInfo,
        recorded_swapchain: RecordedHandle,
    },
    DestroySwapchain {
        device: RecordedHandle,
        swapchain: RecordedHandle,
    },
    GetSwapchainImages {
        device: RecordedHandle,
        swapchain: RecordedHandle,
        recorded_images: Vec<RecordedHandle>,
    },
    AcquireNextImage {
        device: RecordedHandle,
        swapchain: RecordedHandle,
        timeout: u64,
        semaphore: RecordedHandle,
        fence: RecordedHandle,
        recorded_image_index: u32,
    },
    QueuePresent {
        queue: RecordedHandle,
        present_info: SerializedPresentInfo,
    },
}

impl VulkanCall {
    /// Name of the recorded entry point, for logs and diagnostics.
    pub fn entry_point(&self) -> &'static str {
        use VulkanCall::*;
        match self {
            CreateInstance { .. } => "vkCreateInstance",
            DestroyInstance { .. } => "vkDestroyInstance",
            EnumeratePhysicalDevices { .. } => "vkEnumeratePhysicalDevices",
            CreateDebugReportCallback { .. } => "vkCreateDebugReportCallbackEXT",
            DestroyDebugReportCallback { .. } => "vkDestroyDebugReportCallbackEXT",
            CreateDevice { .. } => "vkCreateDevice",
            DestroyDevice { .. } => "vkDestroyDevice",
            GetDeviceQueue { .. } => "vkGetDeviceQueue",
            DeviceWaitIdle { .. } => "vkDeviceWaitIdle",
            QueueSubmit { .. } => "vkQueueSubmit",
            QueueWaitIdle { .. } => "vkQueueWaitIdle",
            AllocateMemory { .. } => "vkAllocateMemory",
            FreeMemory { .. } => "vkFreeMemory",
            MapMemory { .. } => "vkMapMemory",
            UnmapMemory { .. } => "vkUnmapMemory",
            FlushMappedMemoryRanges { .. } => "vkFlushMappedMemoryRanges",
            CreateBuffer { .. } => "vkCreateBuffer",
            DestroyBuffer { .. } => "vkDestroyBuffer",
            BindBufferMemory { .. } => "vkBindBufferMemory",
            CreateImage { .. } => "vkCreateImage",
            DestroyImage { .. } => "vkDestroyImage",
            BindImageMemory { .. } => "vkBindImageMemory",
            CreateImageView { .. } => "vkCreateImageView",
            DestroyImageView { .. } => "vkDestroyImageView",
            CreateBufferView { .. } => "vkCreateBufferView",
            DestroyBufferView { .. } => "vkDestroyBufferView",
            CreateSampler { .. } => "vkCreateSampler",
            DestroySampler { .. } => "vkDestroySampler",
            CreateShaderModule { .. } => "vkCreateShaderModule",
            DestroyShaderModule { .. } => "vkDestroyShaderModule",
            CreateDescriptorSetLayout { .. } => "vkCreateDescriptorSetLayout",
            DestroyDescriptorSetLayout { .. } => "vkDestroyDescriptorSetLayout",
            CreateDescriptorPool { .. } => "vkCreateDescriptorPool",
            DestroyDescriptorPool { .. } => "vkDestroyDescriptorPool",
            AllocateDescriptorSets { .. } => "vkAllocateDescriptorSets",
            FreeDescriptorSets { .. } => "vkFreeDescriptorSets",
            UpdateDescriptorSets { .. } => "vkUpdateDescriptorSets",
            CreatePipelineLayout { .. } => "vkCreatePipelineLayout",
            DestroyPipelineLayout { .. } => "vkDestroyPipelineLayout",
            CreatePipelineCache { .. } => "vkCreatePipelineCache",
            DestroyPipelineCache { .. } => "vkDestroyPipelineCache",
            GetPipelineCacheData { .. } => "vkGetPipelineCacheData",
            CreateGraphicsPipelines { .. } => "vkCreateGraphicsPipelines",
            CreateComputePipelines { .. } => "vkCreateComputePipelines",
            DestroyPipeline { .. } => "vkDestroyPipeline",
            CreateRenderPass { .. } => "vkCreateRenderPass",
            DestroyRenderPass { .. } => "vkDestroyRenderPass",
            CreateFramebuffer { .. } => "vkCreateFramebuffer",
            DestroyFramebuffer { .. } => "vkDestroyFramebuffer",
            CreateCommandPool { .. } => "vkCreateCommandPool",
            DestroyCommandPool { .. } => "vkDestroyCommandPool",
            ResetCommandPool { .. } => "vkResetCommandPool",
            AllocateCommandBuffers { .. } => "vkAllocateCommandBuffers",
            FreeCommandBuffers { .. } => "vkFreeCommandBuffers",
            BeginCommandBuffer { .. } => "vkBeginCommandBuffer",
            EndCommandBuffer { .. } => "vkEndCommandBuffer",
            ResetCommandBuffer { .. } => "vkResetCommandBuffer",
            CmdBindPipeline { .. } => "vkCmdBindPipeline",
            CmdBindDescriptorSets { .. } => "vkCmdBindDescriptorSets",
            CmdBindVertexBuffers { .. } => "vkCmdBindVertexBuffers",
            CmdBindIndexBuffer { .. } => "vkCmdBindIndexBuffer",
            CmdBeginRenderPass { .. } => "vkCmdBeginRenderPass",
            CmdNextSubpass { .. } => "vkCmdNextSubpass",
            CmdEndRenderPass { .. } => "vkCmdEndRenderPass",
            CmdDraw { .. } => "vkCmdDraw",
            CmdDrawIndexed { .. } => "vkCmdDrawIndexed",
            CmdDispatch { .. } => "vkCmdDispatch",
            CmdCopyBuffer { .. } => "vkCmdCopyBuffer",
            CmdCopyBufferToImage { .. } => "vkCmdCopyBufferToImage",
            CmdCopyImageToBuffer { .. } => "vkCmdCopyImageToBuffer",
            CmdPipelineBarrier { .. } => "vkCmdPipelineBarrier",
            CmdWaitEvents { .. } => "vkCmdWaitEvents",
            CmdSetViewport { .. } => "vkCmdSetViewport",
            CmdSetScissor { .. } => "vkCmdSetScissor",
            CmdPushConstants { .. } => "vkCmdPushConstants",
            CreateFence { .. } => "vkCreateFence",
            DestroyFence { .. } => "vkDestroyFence",
            WaitForFences { .. } => "vkWaitForFences",
            ResetFences { .. } => "vkResetFences",
            GetFenceStatus { .. } => "vkGetFenceStatus",
            CreateSemaphore { .. } => "vkCreateSemaphore",
            DestroySemaphore { .. } => "vkDestroySemaphore",
            CreateEvent { .. } => "vkCreateEvent",
            DestroyEvent { .. } => "vkDestroyEvent",
            CreateXcbSurface { .. } => "vkCreateXcbSurfaceKHR",
            CreateXlibSurface { .. } => "vkCreateXlibSurfaceKHR",
            CreateWin32Surface { .. } => "vkCreateWin32SurfaceKHR",
            DestroySurface { .. } => "vkDestroySurfaceKHR",
            GetPhysicalDeviceSurfaceSupport { .. } => "vkGetPhysicalDeviceSurfaceSupportKHR",
            GetPhysicalDeviceSurfaceCapabilities { .. } => {
                "vkGetPhysicalDeviceSurfaceCapabilitiesKHR"
            }
            GetPhysicalDeviceSurfaceFormats { .. } => "vkGetPhysicalDeviceSurfaceFormatsKHR",
            GetPhysicalDeviceSurfacePresentModes { .. } => {
                "vkGetPhysicalDeviceSurfacePresentModesKHR"
            }
            CreateSwapchain { .. } => "vkCreateSwapchainKHR",
            DestroySwapchain { .. } => "vkDestroySwapchainKHR",
            GetSwapchainImages { .. } => "vkGetSwapchainImagesKHR",
            AcquireNextImage { .. } => "vkAcquireNextImageKHR",
            QueuePresent { .. } => "vkQueuePresentKHR",
        }
    }
}
