//! Deep-copy handlers: descriptor-set updates and graphics pipeline
//! creation must hand the driver clones with every embedded handle
//! remapped.

mod common;

use ash::vk::Handle;
use common::*;
use vkr_core::CallStatus;
use vkr_engine::{FakeCall, FakeDriver, VulkanReplayer};
use vkr_protocol::calls::*;
use vkr_protocol::{Blob, Packet, RecordedHandle, ScissorRect, Viewport, VulkanCall};

const BUFFER: RecordedHandle = RecordedHandle(0x400);
const IMAGE: RecordedHandle = RecordedHandle(0x401);
const IMAGE_VIEW: RecordedHandle = RecordedHandle(0x402);
const SAMPLER: RecordedHandle = RecordedHandle(0x403);
const SET_LAYOUT: RecordedHandle = RecordedHandle(0x404);
const POOL: RecordedHandle = RecordedHandle(0x405);
const SET: RecordedHandle = RecordedHandle(0x406);
const SHADER_VERT: RecordedHandle = RecordedHandle(0x407);
const SHADER_FRAG: RecordedHandle = RecordedHandle(0x408);
const PIPELINE_LAYOUT: RecordedHandle = RecordedHandle(0x409);
const RENDER_PASS: RecordedHandle = RecordedHandle(0x40a);
const PIPELINE: RecordedHandle = RecordedHandle(0x40b);

fn shader_packet(recorded: RecordedHandle) -> Packet {
    let mut blob = Blob::default();
    let code = blob.push(&[0x0723_0203u32, 0, 1, 2]);
    Packet {
        call: VulkanCall::CreateShaderModule {
            device: DEVICE,
            code,
            recorded_module: recorded,
        },
        recorded_result: 0,
        blob,
    }
}

fn descriptor_setup(replayer: &mut VulkanReplayer<FakeDriver>) {
    let packets = vec![
        Packet::new(VulkanCall::CreateBuffer {
            device: DEVICE,
            create_info: SerializedBufferCreateInfo {
                flags: 0,
                size: 256,
                usage: 0x10,
                sharing_mode: 0,
                queue_family_indices: Vec::new(),
            },
            recorded_buffer: BUFFER,
        }),
        Packet::new(VulkanCall::CreateImage {
            device: DEVICE,
            create_info: SerializedImageCreateInfo {
                flags: 0,
                image_type: 1,
                format: 44,
                extent: SerializedExtent3D {
                    width: 16,
                    height: 16,
                    depth: 1,
                },
                mip_levels: 1,
                array_layers: 1,
                samples: 1,
                tiling: 0,
                usage: 0x4,
                sharing_mode: 0,
                queue_family_indices: Vec::new(),
                initial_layout: 0,
            },
            recorded_image: IMAGE,
        }),
        Packet::new(VulkanCall::CreateImageView {
            device: DEVICE,
            create_info: SerializedImageViewCreateInfo {
                image: IMAGE,
                view_type: 1,
                format: 44,
                components: [0, 0, 0, 0],
                subresource_range: SerializedImageSubresourceRange {
                    aspect_mask: 1,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                },
            },
            recorded_view: IMAGE_VIEW,
        }),
        Packet::new(VulkanCall::CreateSampler {
            device: DEVICE,
            create_info: SerializedSamplerCreateInfo {
                mag_filter: 0,
                min_filter: 0,
                mipmap_mode: 0,
                address_mode_u: 0,
                address_mode_v: 0,
                address_mode_w: 0,
                mip_lod_bias: 0.0,
                anisotropy_enable: false,
                max_anisotropy: 1.0,
                compare_enable: false,
                compare_op: 0,
                min_lod: 0.0,
                max_lod: 1.0,
                border_color: 0,
                unnormalized_coordinates: false,
            },
            recorded_sampler: SAMPLER,
        }),
        Packet::new(VulkanCall::CreateDescriptorSetLayout {
            device: DEVICE,
            create_info: SerializedDescriptorSetLayoutCreateInfo {
                flags: 0,
                bindings: vec![
                    SerializedDescriptorSetLayoutBinding {
                        binding: 0,
                        descriptor_type: 1,
                        descriptor_count: 1,
                        stage_flags: 0x10,
                        immutable_samplers: Vec::new(),
                    },
                    SerializedDescriptorSetLayoutBinding {
                        binding: 1,
                        descriptor_type: 6,
                        descriptor_count: 1,
                        stage_flags: 0x10,
                        immutable_samplers: Vec::new(),
                    },
                ],
            },
            recorded_layout: SET_LAYOUT,
        }),
        Packet::new(VulkanCall::CreateDescriptorPool {
            device: DEVICE,
            flags: 0,
            max_sets: 4,
            pool_sizes: vec![SerializedDescriptorPoolSize {
                descriptor_type: 1,
                descriptor_count: 4,
            }],
            recorded_pool: POOL,
        }),
        Packet::new(VulkanCall::AllocateDescriptorSets {
            device: DEVICE,
            descriptor_pool: POOL,
            set_layouts: vec![SET_LAYOUT],
            recorded_sets: vec![SET],
        }),
    ];
    for packet in &packets {
        assert_eq!(
            replayer.replay_packet(packet),
            CallStatus::Success,
            "setup packet {} failed",
            packet.entry_point()
        );
    }
}

#[test]
fn descriptor_writes_are_cloned_and_remapped() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    descriptor_setup(&mut replayer);

    let packet = Packet::new(VulkanCall::UpdateDescriptorSets {
        device: DEVICE,
        writes: vec![
            SerializedWriteDescriptorSet {
                dst_set: SET,
                dst_binding: 0,
                dst_array_element: 0,
                // combined image sampler
                descriptor_type: 1,
                image_infos: vec![SerializedDescriptorImageInfo {
                    sampler: SAMPLER,
                    image_view: IMAGE_VIEW,
                    image_layout: 5,
                }],
                buffer_infos: Vec::new(),
                texel_buffer_views: Vec::new(),
            },
            SerializedWriteDescriptorSet {
                dst_set: SET,
                dst_binding: 1,
                dst_array_element: 0,
                // uniform buffer
                descriptor_type: 6,
                image_infos: Vec::new(),
                buffer_infos: vec![SerializedDescriptorBufferInfo {
                    buffer: BUFFER,
                    offset: 0,
                    range: 256,
                }],
                texel_buffer_views: Vec::new(),
            },
        ],
        copies: Vec::new(),
    });
    let before = packet.clone();
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    assert_eq!(packet, before);

    let maps = replayer.object_maps();
    let live_set = maps.descriptor_sets.lookup(SET).as_raw();
    let live_sampler = maps.samplers.lookup(SAMPLER).as_raw();
    let live_view = maps.image_views.lookup(IMAGE_VIEW).as_raw();
    let live_buffer = maps.buffers.lookup(BUFFER).as_raw();

    let writes = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            FakeCall::UpdateDescriptorSets { writes } => Some(writes.clone()),
            _ => None,
        })
        .expect("driver never saw vkUpdateDescriptorSets");
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].dst_set, live_set);
    assert_eq!(writes[0].samplers, vec![live_sampler]);
    assert_eq!(writes[0].image_views, vec![live_view]);
    assert_eq!(writes[1].buffers, vec![live_buffer]);
}

#[test]
fn descriptor_write_with_unknown_sampler_is_skipped() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    descriptor_setup(&mut replayer);

    let packet = Packet::new(VulkanCall::UpdateDescriptorSets {
        device: DEVICE,
        writes: vec![SerializedWriteDescriptorSet {
            dst_set: SET,
            dst_binding: 0,
            dst_array_element: 0,
            descriptor_type: 1,
            image_infos: vec![SerializedDescriptorImageInfo {
                sampler: RecordedHandle(0xdead),
                image_view: IMAGE_VIEW,
                image_layout: 5,
            }],
            buffer_infos: Vec::new(),
            texel_buffer_views: Vec::new(),
        }],
        copies: Vec::new(),
    });
    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkUpdateDescriptorSets"));
}

fn pipeline_setup(replayer: &mut VulkanReplayer<FakeDriver>) {
    descriptor_setup(replayer);
    let packets = vec![
        shader_packet(SHADER_VERT),
        shader_packet(SHADER_FRAG),
        Packet::new(VulkanCall::CreatePipelineLayout {
            device: DEVICE,
            set_layouts: vec![SET_LAYOUT],
            push_constant_ranges: Vec::new(),
            recorded_layout: PIPELINE_LAYOUT,
        }),
        Packet::new(VulkanCall::CreateRenderPass {
            device: DEVICE,
            create_info: SerializedRenderPassCreateInfo {
                attachments: vec![SerializedAttachmentDescription {
                    flags: 0,
                    format: 44,
                    samples: 1,
                    load_op: 1,
                    store_op: 0,
                    stencil_load_op: 2,
                    stencil_store_op: 1,
                    initial_layout: 0,
                    final_layout: 8,
                }],
                subpasses: vec![SerializedSubpassDescription {
                    pipeline_bind_point: 0,
                    input_attachments: Vec::new(),
                    color_attachments: vec![SerializedAttachmentReference {
                        attachment: 0,
                        layout: 2,
                    }],
                    resolve_attachments: Vec::new(),
                    depth_stencil_attachment: None,
                    preserve_attachments: Vec::new(),
                }],
                dependencies: Vec::new(),
            },
            recorded_render_pass: RENDER_PASS,
        }),
    ];
    for packet in &packets {
        assert_eq!(
            replayer.replay_packet(packet),
            CallStatus::Success,
            "setup packet {} failed",
            packet.entry_point()
        );
    }
}

fn graphics_pipeline_packet() -> Packet {
    let mut blob = Blob::default();
    let viewports = blob.push(&[Viewport {
        x: 0.0,
        y: 0.0,
        width: 640.0,
        height: 480.0,
        min_depth: 0.0,
        max_depth: 1.0,
    }]);
    let scissors = blob.push(&[ScissorRect {
        x: 0,
        y: 0,
        width: 640,
        height: 480,
    }]);

    let stage = |stage: u32, module: RecordedHandle| SerializedPipelineShaderStageCreateInfo {
        stage,
        module,
        entry_point: "main".to_string(),
        specialization: None,
    };

    Packet {
        call: VulkanCall::CreateGraphicsPipelines {
            device: DEVICE,
            pipeline_cache: RecordedHandle::NULL,
            create_infos: vec![SerializedGraphicsPipelineCreateInfo {
                flags: 0,
                stages: vec![stage(0x1, SHADER_VERT), stage(0x10, SHADER_FRAG)],
                vertex_input: SerializedVertexInputState {
                    bindings: vec![SerializedVertexInputBinding {
                        binding: 0,
                        stride: 16,
                        input_rate: 0,
                    }],
                    attributes: vec![SerializedVertexInputAttribute {
                        location: 0,
                        binding: 0,
                        format: 109,
                        offset: 0,
                    }],
                },
                input_assembly: SerializedInputAssemblyState {
                    topology: 3,
                    primitive_restart_enable: false,
                },
                tessellation_patch_control_points: None,
                viewport: Some(SerializedViewportState {
                    viewport_count: 1,
                    scissor_count: 1,
                    viewports,
                    scissors,
                }),
                rasterization: SerializedRasterizationState {
                    depth_clamp_enable: false,
                    rasterizer_discard_enable: false,
                    polygon_mode: 0,
                    cull_mode: 0,
                    front_face: 0,
                    depth_bias_enable: false,
                    depth_bias_constant_factor: 0.0,
                    depth_bias_clamp: 0.0,
                    depth_bias_slope_factor: 0.0,
                    line_width: 1.0,
                },
                multisample: Some(SerializedMultisampleState {
                    rasterization_samples: 1,
                    sample_shading_enable: false,
                    min_sample_shading: 0.0,
                    sample_mask: vkr_protocol::BlobRange::EMPTY,
                    alpha_to_coverage_enable: false,
                    alpha_to_one_enable: false,
                }),
                depth_stencil: None,
                color_blend: Some(SerializedColorBlendState {
                    logic_op_enable: false,
                    logic_op: 0,
                    attachments: vec![SerializedColorBlendAttachment {
                        blend_enable: false,
                        src_color_blend_factor: 1,
                        dst_color_blend_factor: 0,
                        color_blend_op: 0,
                        src_alpha_blend_factor: 1,
                        dst_alpha_blend_factor: 0,
                        alpha_blend_op: 0,
                        color_write_mask: 0xf,
                    }],
                    blend_constants: [0.0; 4],
                }),
                dynamic_states: Vec::new(),
                layout: PIPELINE_LAYOUT,
                render_pass: RENDER_PASS,
                subpass: 0,
                base_pipeline: RecordedHandle::NULL,
                base_pipeline_index: -1,
            }],
            recorded_pipelines: vec![PIPELINE],
        },
        recorded_result: 0,
        blob,
    }
}

#[test]
fn graphics_pipeline_create_info_is_rebuilt_with_live_handles() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    pipeline_setup(&mut replayer);

    let packet = graphics_pipeline_packet();
    let before = packet.clone();
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);
    assert_eq!(packet, before);

    let maps = replayer.object_maps();
    let live_vert = maps.shader_modules.lookup(SHADER_VERT).as_raw();
    let live_frag = maps.shader_modules.lookup(SHADER_FRAG).as_raw();
    let live_layout = maps.pipeline_layouts.lookup(PIPELINE_LAYOUT).as_raw();
    let live_pass = maps.render_passes.lookup(RENDER_PASS).as_raw();
    assert!(maps.pipelines.contains(PIPELINE));

    let (stage_modules, layouts, render_passes) = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            FakeCall::CreateGraphicsPipelines {
                stage_modules,
                layouts,
                render_passes,
            } => Some((stage_modules.clone(), layouts.clone(), render_passes.clone())),
            _ => None,
        })
        .expect("driver never saw vkCreateGraphicsPipelines");
    assert_eq!(stage_modules, vec![live_vert, live_frag]);
    assert_eq!(layouts, vec![live_layout]);
    assert_eq!(render_passes, vec![live_pass]);
}

#[test]
fn pipeline_with_unknown_shader_module_is_skipped() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    pipeline_setup(&mut replayer);

    let mut packet = graphics_pipeline_packet();
    if let VulkanCall::CreateGraphicsPipelines { create_infos, .. } = &mut packet.call {
        create_infos[0].stages[0].module = RecordedHandle(0xdead);
    }
    assert_eq!(replayer.replay_packet(&packet), CallStatus::ValidationError);
    assert!(!replayer.driver().invoked("vkCreateGraphicsPipelines"));
    assert!(!replayer.object_maps().pipelines.contains(PIPELINE));
}

#[test]
fn framebuffer_attachments_are_remapped() {
    let mut replayer = replayer();
    bring_up(&mut replayer);
    pipeline_setup(&mut replayer);

    let fb = RecordedHandle(0x500);
    let packet = Packet::new(VulkanCall::CreateFramebuffer {
        device: DEVICE,
        create_info: SerializedFramebufferCreateInfo {
            render_pass: RENDER_PASS,
            attachments: vec![IMAGE_VIEW],
            width: 640,
            height: 480,
            layers: 1,
        },
        recorded_framebuffer: fb,
    });
    assert_eq!(replayer.replay_packet(&packet), CallStatus::Success);

    let maps = replayer.object_maps();
    let live_view = maps.image_views.lookup(IMAGE_VIEW).as_raw();
    let live_pass = maps.render_passes.lookup(RENDER_PASS).as_raw();
    let (render_pass, attachments) = replayer
        .driver()
        .calls
        .iter()
        .find_map(|c| match c {
            FakeCall::CreateFramebuffer {
                render_pass,
                attachments,
            } => Some((*render_pass, attachments.clone())),
            _ => None,
        })
        .expect("driver never saw vkCreateFramebuffer");
    assert_eq!(render_pass, live_pass);
    assert_eq!(attachments, vec![live_view]);
}
