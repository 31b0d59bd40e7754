//! Pipeline layouts, caches, and graphics/compute pipeline creation.
//!
//! Pipeline creation is the heaviest deep-copy handler: every create info
//! is rebuilt from its serialized form, with stage shader modules, the
//! layout, the render pass, and the base pipeline remapped, and the
//! viewport/scissor/sample-mask sub-arrays rebound from packet blob ranges
//! to real slices.

use std::ffi::CString;

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedComputePipelineCreateInfo, SerializedGraphicsPipelineCreateInfo,
    SerializedPipelineShaderStageCreateInfo, SerializedPushConstantRange,
    SerializedStencilOpState,
};
use vkr_protocol::{Blob, BlobRange, RecordedHandle, ScissorRect, Viewport};

use super::to_cstring;
use crate::driver::VulkanDriver;
use crate::dump::PipelineKind;
use crate::replayer::VulkanReplayer;

struct StageData {
    module: vk::ShaderModule,
    stage: vk::ShaderStageFlags,
    name: CString,
    spec_entries: Vec<vk::SpecializationMapEntry>,
    spec_data: Vec<u8>,
    has_spec: bool,
}

struct PipelineData {
    stages: Vec<StageData>,
    vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    vertex_attributes: Vec<vk::VertexInputAttributeDescription>,
    viewports: Vec<vk::Viewport>,
    scissors: Vec<vk::Rect2D>,
    sample_mask: Vec<vk::SampleMask>,
    blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    dynamic_states: Vec<vk::DynamicState>,
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
    base_pipeline: vk::Pipeline,
}

struct GraphicsStates<'a> {
    vertex_input: vk::PipelineVertexInputStateCreateInfo<'a>,
    input_assembly: vk::PipelineInputAssemblyStateCreateInfo<'a>,
    tessellation: Option<vk::PipelineTessellationStateCreateInfo<'a>>,
    viewport: Option<vk::PipelineViewportStateCreateInfo<'a>>,
    rasterization: vk::PipelineRasterizationStateCreateInfo<'a>,
    multisample: Option<vk::PipelineMultisampleStateCreateInfo<'a>>,
    depth_stencil: Option<vk::PipelineDepthStencilStateCreateInfo<'a>>,
    color_blend: Option<vk::PipelineColorBlendStateCreateInfo<'a>>,
    dynamic: Option<vk::PipelineDynamicStateCreateInfo<'a>>,
}

fn vk_viewport(v: &Viewport) -> vk::Viewport {
    vk::Viewport {
        x: v.x,
        y: v.y,
        width: v.width,
        height: v.height,
        min_depth: v.min_depth,
        max_depth: v.max_depth,
    }
}

fn vk_scissor(s: &ScissorRect) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: s.x, y: s.y },
        extent: vk::Extent2D {
            width: s.width,
            height: s.height,
        },
    }
}

fn stencil_op_state(s: &SerializedStencilOpState) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: vk::StencilOp::from_raw(s.fail_op),
        pass_op: vk::StencilOp::from_raw(s.pass_op),
        depth_fail_op: vk::StencilOp::from_raw(s.depth_fail_op),
        compare_op: vk::CompareOp::from_raw(s.compare_op),
        compare_mask: s.compare_mask,
        write_mask: s.write_mask,
        reference: s.reference,
    }
}

fn build_states<'a>(
    ci: &SerializedGraphicsPipelineCreateInfo,
    d: &'a PipelineData,
) -> GraphicsStates<'a> {
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(&d.vertex_bindings)
        .vertex_attribute_descriptions(&d.vertex_attributes);

    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::from_raw(ci.input_assembly.topology))
        .primitive_restart_enable(ci.input_assembly.primitive_restart_enable);

    let tessellation = ci
        .tessellation_patch_control_points
        .map(|n| vk::PipelineTessellationStateCreateInfo::default().patch_control_points(n));

    let viewport = ci.viewport.as_ref().map(|vp| {
        let mut out = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(vp.viewport_count)
            .scissor_count(vp.scissor_count);
        if !d.viewports.is_empty() {
            out = out.viewports(&d.viewports);
        }
        if !d.scissors.is_empty() {
            out = out.scissors(&d.scissors);
        }
        out
    });

    let r = &ci.rasterization;
    let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(r.depth_clamp_enable)
        .rasterizer_discard_enable(r.rasterizer_discard_enable)
        .polygon_mode(vk::PolygonMode::from_raw(r.polygon_mode))
        .cull_mode(vk::CullModeFlags::from_raw(r.cull_mode))
        .front_face(vk::FrontFace::from_raw(r.front_face))
        .depth_bias_enable(r.depth_bias_enable)
        .depth_bias_constant_factor(r.depth_bias_constant_factor)
        .depth_bias_clamp(r.depth_bias_clamp)
        .depth_bias_slope_factor(r.depth_bias_slope_factor)
        .line_width(r.line_width);

    let multisample = ci.multisample.as_ref().map(|ms| {
        let mut out = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::from_raw(ms.rasterization_samples))
            .sample_shading_enable(ms.sample_shading_enable)
            .min_sample_shading(ms.min_sample_shading)
            .alpha_to_coverage_enable(ms.alpha_to_coverage_enable)
            .alpha_to_one_enable(ms.alpha_to_one_enable);
        if !d.sample_mask.is_empty() {
            out = out.sample_mask(&d.sample_mask);
        }
        out
    });

    let depth_stencil = ci.depth_stencil.as_ref().map(|ds| {
        vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(ds.depth_test_enable)
            .depth_write_enable(ds.depth_write_enable)
            .depth_compare_op(vk::CompareOp::from_raw(ds.depth_compare_op))
            .depth_bounds_test_enable(ds.depth_bounds_test_enable)
            .stencil_test_enable(ds.stencil_test_enable)
            .front(stencil_op_state(&ds.front))
            .back(stencil_op_state(&ds.back))
            .min_depth_bounds(ds.min_depth_bounds)
            .max_depth_bounds(ds.max_depth_bounds)
    });

    let color_blend = ci.color_blend.as_ref().map(|cb| {
        vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(cb.logic_op_enable)
            .logic_op(vk::LogicOp::from_raw(cb.logic_op))
            .attachments(&d.blend_attachments)
            .blend_constants(cb.blend_constants)
    });

    let dynamic = (!d.dynamic_states.is_empty())
        .then(|| vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&d.dynamic_states));

    GraphicsStates {
        vertex_input,
        input_assembly,
        tessellation,
        viewport,
        rasterization,
        multisample,
        depth_stencil,
        color_blend,
        dynamic,
    }
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    pub(crate) fn create_pipeline_layout(
        &mut self,
        device: RecordedHandle,
        set_layouts: &[RecordedHandle],
        push_constant_ranges: &[SerializedPushConstantRange],
        recorded_layout: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let layouts = set_layouts
            .iter()
            .map(|h| self.maps.descriptor_set_layouts.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;
        let ranges: Vec<vk::PushConstantRange> = push_constant_ranges
            .iter()
            .map(|r| vk::PushConstantRange {
                stage_flags: vk::ShaderStageFlags::from_raw(r.stage_flags),
                offset: r.offset,
                size: r.size,
            })
            .collect();
        let vk_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&layouts)
            .push_constant_ranges(&ranges);
        let (result, layout) = self.driver.create_pipeline_layout(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.pipeline_layouts.insert(recorded_layout, layout);
        }
        Ok(result)
    }

    pub(crate) fn destroy_pipeline_layout(
        &mut self,
        device: RecordedHandle,
        layout: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_layout = self.maps.pipeline_layouts.remap(layout)?;
        self.driver.destroy_pipeline_layout(live, live_layout);
        self.maps.pipeline_layouts.remove(layout);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_pipeline_cache(
        &mut self,
        device: RecordedHandle,
        initial_data: BlobRange,
        recorded_cache: RecordedHandle,
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let data = blob.bytes(initial_data)?;
        let (result, cache) = self.driver.create_pipeline_cache(live, data);
        if result == vk::Result::SUCCESS {
            self.maps.pipeline_caches.insert(recorded_cache, cache);
        }
        Ok(result)
    }

    pub(crate) fn destroy_pipeline_cache(
        &mut self,
        device: RecordedHandle,
        cache: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_cache = self.maps.pipeline_caches.remap(cache)?;
        self.driver.destroy_pipeline_cache(live, live_cache);
        self.maps.pipeline_caches.remove(cache);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn get_pipeline_cache_data(
        &mut self,
        device: RecordedHandle,
        cache: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_cache = self.maps.pipeline_caches.remap(cache)?;
        let (result, _data) = self.driver.get_pipeline_cache_data(live, live_cache);
        Ok(result)
    }

    fn stage_data(
        &self,
        stage: &SerializedPipelineShaderStageCreateInfo,
        blob: &Blob,
    ) -> Result<StageData, ReplayError> {
        let module = self.maps.shader_modules.remap(stage.module)?;
        let name = to_cstring(&stage.entry_point)?;
        let (spec_entries, spec_data, has_spec) = match &stage.specialization {
            Some(spec) => {
                let entries = spec
                    .map_entries
                    .iter()
                    .map(|e| vk::SpecializationMapEntry {
                        constant_id: e.constant_id,
                        offset: e.offset,
                        size: e.size as usize,
                    })
                    .collect();
                (entries, blob.bytes(spec.data)?.to_vec(), true)
            }
            None => (Vec::new(), Vec::new(), false),
        };
        Ok(StageData {
            module,
            stage: vk::ShaderStageFlags::from_raw(stage.stage),
            name,
            spec_entries,
            spec_data,
            has_spec,
        })
    }

    fn graphics_pipeline_data(
        &self,
        info: &SerializedGraphicsPipelineCreateInfo,
        blob: &Blob,
    ) -> Result<PipelineData, ReplayError> {
        let stages = info
            .stages
            .iter()
            .map(|s| self.stage_data(s, blob))
            .collect::<Result<Vec<_>, _>>()?;

        let vertex_bindings = info
            .vertex_input
            .bindings
            .iter()
            .map(|b| vk::VertexInputBindingDescription {
                binding: b.binding,
                stride: b.stride,
                input_rate: vk::VertexInputRate::from_raw(b.input_rate),
            })
            .collect();
        let vertex_attributes = info
            .vertex_input
            .attributes
            .iter()
            .map(|a| vk::VertexInputAttributeDescription {
                location: a.location,
                binding: a.binding,
                format: vk::Format::from_raw(a.format),
                offset: a.offset,
            })
            .collect();

        // Rebind the viewport/scissor/sample-mask sub-arrays from their
        // packet-relative ranges to real storage.
        let (viewports, scissors) = match &info.viewport {
            Some(vp) => (
                blob.typed::<Viewport>(vp.viewports)?
                    .iter()
                    .map(vk_viewport)
                    .collect(),
                blob.typed::<ScissorRect>(vp.scissors)?
                    .iter()
                    .map(vk_scissor)
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let sample_mask = match &info.multisample {
            Some(ms) if !ms.sample_mask.is_empty() => blob.typed::<u32>(ms.sample_mask)?,
            _ => Vec::new(),
        };

        let blend_attachments = info
            .color_blend
            .as_ref()
            .map(|cb| {
                cb.attachments
                    .iter()
                    .map(|a| {
                        vk::PipelineColorBlendAttachmentState::default()
                            .blend_enable(a.blend_enable)
                            .src_color_blend_factor(vk::BlendFactor::from_raw(
                                a.src_color_blend_factor,
                            ))
                            .dst_color_blend_factor(vk::BlendFactor::from_raw(
                                a.dst_color_blend_factor,
                            ))
                            .color_blend_op(vk::BlendOp::from_raw(a.color_blend_op))
                            .src_alpha_blend_factor(vk::BlendFactor::from_raw(
                                a.src_alpha_blend_factor,
                            ))
                            .dst_alpha_blend_factor(vk::BlendFactor::from_raw(
                                a.dst_alpha_blend_factor,
                            ))
                            .alpha_blend_op(vk::BlendOp::from_raw(a.alpha_blend_op))
                            .color_write_mask(vk::ColorComponentFlags::from_raw(a.color_write_mask))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dynamic_states = info
            .dynamic_states
            .iter()
            .map(|d| vk::DynamicState::from_raw(*d))
            .collect();

        Ok(PipelineData {
            stages,
            vertex_bindings,
            vertex_attributes,
            viewports,
            scissors,
            sample_mask,
            blend_attachments,
            dynamic_states,
            layout: self.maps.pipeline_layouts.remap(info.layout)?,
            render_pass: self.maps.render_passes.remap(info.render_pass)?,
            base_pipeline: self.maps.pipelines.remap(info.base_pipeline)?,
        })
    }

    pub(crate) fn create_graphics_pipelines(
        &mut self,
        device: RecordedHandle,
        pipeline_cache: RecordedHandle,
        create_infos: &[SerializedGraphicsPipelineCreateInfo],
        recorded_pipelines: &[RecordedHandle],
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let cache = self.maps.pipeline_caches.remap(pipeline_cache)?;

        let data = create_infos
            .iter()
            .map(|ci| self.graphics_pipeline_data(ci, blob))
            .collect::<Result<Vec<_>, _>>()?;

        let spec_infos: Vec<Vec<Option<vk::SpecializationInfo>>> = data
            .iter()
            .map(|d| {
                d.stages
                    .iter()
                    .map(|s| {
                        s.has_spec.then(|| {
                            vk::SpecializationInfo::default()
                                .map_entries(&s.spec_entries)
                                .data(&s.spec_data)
                        })
                    })
                    .collect()
            })
            .collect();

        let stage_infos: Vec<Vec<vk::PipelineShaderStageCreateInfo>> = data
            .iter()
            .zip(&spec_infos)
            .map(|(d, specs)| {
                d.stages
                    .iter()
                    .zip(specs)
                    .map(|(s, spec)| {
                        let mut out = vk::PipelineShaderStageCreateInfo::default()
                            .stage(s.stage)
                            .module(s.module)
                            .name(&s.name);
                        if let Some(spec) = spec.as_ref() {
                            out = out.specialization_info(spec);
                        }
                        out
                    })
                    .collect()
            })
            .collect();

        let states: Vec<GraphicsStates> = create_infos
            .iter()
            .zip(&data)
            .map(|(ci, d)| build_states(ci, d))
            .collect();

        let vk_infos: Vec<vk::GraphicsPipelineCreateInfo> = create_infos
            .iter()
            .enumerate()
            .map(|(i, ci)| {
                let mut out = vk::GraphicsPipelineCreateInfo::default()
                    .flags(vk::PipelineCreateFlags::from_raw(ci.flags))
                    .stages(&stage_infos[i])
                    .vertex_input_state(&states[i].vertex_input)
                    .input_assembly_state(&states[i].input_assembly)
                    .rasterization_state(&states[i].rasterization)
                    .layout(data[i].layout)
                    .render_pass(data[i].render_pass)
                    .subpass(ci.subpass)
                    .base_pipeline_handle(data[i].base_pipeline)
                    .base_pipeline_index(ci.base_pipeline_index);
                if let Some(t) = states[i].tessellation.as_ref() {
                    out = out.tessellation_state(t);
                }
                if let Some(v) = states[i].viewport.as_ref() {
                    out = out.viewport_state(v);
                }
                if let Some(m) = states[i].multisample.as_ref() {
                    out = out.multisample_state(m);
                }
                if let Some(ds) = states[i].depth_stencil.as_ref() {
                    out = out.depth_stencil_state(ds);
                }
                if let Some(cb) = states[i].color_blend.as_ref() {
                    out = out.color_blend_state(cb);
                }
                if let Some(dy) = states[i].dynamic.as_ref() {
                    out = out.dynamic_state(dy);
                }
                out
            })
            .collect();

        let (result, pipelines) = self.driver.create_graphics_pipelines(live, cache, &vk_infos);
        if result == vk::Result::SUCCESS {
            for ((recorded, pipeline), ci) in
                recorded_pipelines.iter().zip(pipelines.iter()).zip(create_infos)
            {
                self.maps.pipelines.insert(*recorded, *pipeline);
                self.dump.record_pipeline(
                    *recorded,
                    PipelineKind::Graphics,
                    ci.layout,
                    ci.render_pass,
                    ci.stages.len(),
                );
            }
        }
        Ok(result)
    }

    pub(crate) fn create_compute_pipelines(
        &mut self,
        device: RecordedHandle,
        pipeline_cache: RecordedHandle,
        create_infos: &[SerializedComputePipelineCreateInfo],
        recorded_pipelines: &[RecordedHandle],
        blob: &Blob,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let cache = self.maps.pipeline_caches.remap(pipeline_cache)?;

        let stages = create_infos
            .iter()
            .map(|ci| self.stage_data(&ci.stage, blob))
            .collect::<Result<Vec<_>, _>>()?;
        let mut handles = Vec::with_capacity(create_infos.len());
        for ci in create_infos {
            handles.push((
                self.maps.pipeline_layouts.remap(ci.layout)?,
                self.maps.pipelines.remap(ci.base_pipeline)?,
            ));
        }

        let spec_infos: Vec<Option<vk::SpecializationInfo>> = stages
            .iter()
            .map(|s| {
                s.has_spec.then(|| {
                    vk::SpecializationInfo::default()
                        .map_entries(&s.spec_entries)
                        .data(&s.spec_data)
                })
            })
            .collect();

        let vk_infos: Vec<vk::ComputePipelineCreateInfo> = create_infos
            .iter()
            .enumerate()
            .map(|(i, ci)| {
                let s = &stages[i];
                let mut stage = vk::PipelineShaderStageCreateInfo::default()
                    .stage(s.stage)
                    .module(s.module)
                    .name(&s.name);
                if let Some(spec) = spec_infos[i].as_ref() {
                    stage = stage.specialization_info(spec);
                }
                vk::ComputePipelineCreateInfo::default()
                    .flags(vk::PipelineCreateFlags::from_raw(ci.flags))
                    .stage(stage)
                    .layout(handles[i].0)
                    .base_pipeline_handle(handles[i].1)
                    .base_pipeline_index(ci.base_pipeline_index)
            })
            .collect();

        let (result, pipelines) = self.driver.create_compute_pipelines(live, cache, &vk_infos);
        if result == vk::Result::SUCCESS {
            for ((recorded, pipeline), ci) in
                recorded_pipelines.iter().zip(pipelines.iter()).zip(create_infos)
            {
                self.maps.pipelines.insert(*recorded, *pipeline);
                self.dump.record_pipeline(
                    *recorded,
                    PipelineKind::Compute,
                    ci.layout,
                    RecordedHandle::NULL,
                    1,
                );
            }
        }
        Ok(result)
    }

    pub(crate) fn destroy_pipeline(
        &mut self,
        device: RecordedHandle,
        pipeline: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_pipeline = self.maps.pipelines.remap(pipeline)?;
        self.driver.destroy_pipeline(live, live_pipeline);
        self.maps.pipelines.remove(pipeline);
        self.dump.forget_pipeline(pipeline);
        Ok(vk::Result::SUCCESS)
    }
}
