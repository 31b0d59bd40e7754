//! Render passes and framebuffers.

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::{SerializedFramebufferCreateInfo, SerializedRenderPassCreateInfo};
use vkr_protocol::RecordedHandle;

use crate::driver::VulkanDriver;
use crate::replayer::VulkanReplayer;

struct SubpassRefs {
    input: Vec<vk::AttachmentReference>,
    color: Vec<vk::AttachmentReference>,
    resolve: Vec<vk::AttachmentReference>,
    depth: Option<vk::AttachmentReference>,
}

fn attachment_reference(r: &vkr_protocol::calls::SerializedAttachmentReference) -> vk::AttachmentReference {
    vk::AttachmentReference {
        attachment: r.attachment,
        layout: vk::ImageLayout::from_raw(r.layout),
    }
}

impl<D: VulkanDriver> VulkanReplayer<D> {
    /// Render-pass create infos carry no object handles, but the nested
    /// attachment/subpass/dependency arrays still have to be rebuilt from
    /// their serialized form.
    pub(crate) fn create_render_pass(
        &mut self,
        device: RecordedHandle,
        info: &SerializedRenderPassCreateInfo,
        recorded_render_pass: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;

        let attachments: Vec<vk::AttachmentDescription> = info
            .attachments
            .iter()
            .map(|a| vk::AttachmentDescription {
                flags: vk::AttachmentDescriptionFlags::from_raw(a.flags),
                format: vk::Format::from_raw(a.format),
                samples: vk::SampleCountFlags::from_raw(a.samples),
                load_op: vk::AttachmentLoadOp::from_raw(a.load_op),
                store_op: vk::AttachmentStoreOp::from_raw(a.store_op),
                stencil_load_op: vk::AttachmentLoadOp::from_raw(a.stencil_load_op),
                stencil_store_op: vk::AttachmentStoreOp::from_raw(a.stencil_store_op),
                initial_layout: vk::ImageLayout::from_raw(a.initial_layout),
                final_layout: vk::ImageLayout::from_raw(a.final_layout),
            })
            .collect();

        let refs: Vec<SubpassRefs> = info
            .subpasses
            .iter()
            .map(|sp| SubpassRefs {
                input: sp.input_attachments.iter().map(attachment_reference).collect(),
                color: sp.color_attachments.iter().map(attachment_reference).collect(),
                resolve: sp.resolve_attachments.iter().map(attachment_reference).collect(),
                depth: sp.depth_stencil_attachment.as_ref().map(attachment_reference),
            })
            .collect();

        let subpasses: Vec<vk::SubpassDescription> = info
            .subpasses
            .iter()
            .zip(&refs)
            .map(|(sp, r)| {
                let mut out = vk::SubpassDescription::default()
                    .pipeline_bind_point(vk::PipelineBindPoint::from_raw(sp.pipeline_bind_point))
                    .input_attachments(&r.input)
                    .color_attachments(&r.color)
                    .preserve_attachments(&sp.preserve_attachments);
                if !r.resolve.is_empty() {
                    out = out.resolve_attachments(&r.resolve);
                }
                if let Some(depth) = r.depth.as_ref() {
                    out = out.depth_stencil_attachment(depth);
                }
                out
            })
            .collect();

        let dependencies: Vec<vk::SubpassDependency> = info
            .dependencies
            .iter()
            .map(|d| vk::SubpassDependency {
                src_subpass: d.src_subpass,
                dst_subpass: d.dst_subpass,
                src_stage_mask: vk::PipelineStageFlags::from_raw(d.src_stage_mask),
                dst_stage_mask: vk::PipelineStageFlags::from_raw(d.dst_stage_mask),
                src_access_mask: vk::AccessFlags::from_raw(d.src_access_mask),
                dst_access_mask: vk::AccessFlags::from_raw(d.dst_access_mask),
                dependency_flags: vk::DependencyFlags::from_raw(d.dependency_flags),
            })
            .collect();

        let vk_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);
        let (result, render_pass) = self.driver.create_render_pass(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.render_passes.insert(recorded_render_pass, render_pass);
        }
        Ok(result)
    }

    pub(crate) fn destroy_render_pass(
        &mut self,
        device: RecordedHandle,
        render_pass: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_pass = self.maps.render_passes.remap(render_pass)?;
        self.driver.destroy_render_pass(live, live_pass);
        self.maps.render_passes.remove(render_pass);
        Ok(vk::Result::SUCCESS)
    }

    pub(crate) fn create_framebuffer(
        &mut self,
        device: RecordedHandle,
        info: &SerializedFramebufferCreateInfo,
        recorded_framebuffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let render_pass = self.maps.render_passes.remap(info.render_pass)?;
        let attachments = info
            .attachments
            .iter()
            .map(|h| self.maps.image_views.remap(*h))
            .collect::<Result<Vec<_>, _>>()?;

        let vk_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(info.width)
            .height(info.height)
            .layers(info.layers);
        let (result, framebuffer) = self.driver.create_framebuffer(live, &vk_info);
        if result == vk::Result::SUCCESS {
            self.maps.framebuffers.insert(recorded_framebuffer, framebuffer);
        }
        Ok(result)
    }

    pub(crate) fn destroy_framebuffer(
        &mut self,
        device: RecordedHandle,
        framebuffer: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        let live = self.maps.devices.remap(device)?;
        let live_framebuffer = self.maps.framebuffers.remap(framebuffer)?;
        self.driver.destroy_framebuffer(live, live_framebuffer);
        self.maps.framebuffers.remove(framebuffer);
        Ok(vk::Result::SUCCESS)
    }
}
