//! Entry-point handlers, one module per call family.
//!
//! Every handler follows the same discipline: remap the dispatch object
//! (aborting the call when a non-null recorded handle has no live
//! counterpart), rebuild composite arguments in scratch locals with every
//! embedded handle remapped, invoke the driver through its table, and on
//! success update the object maps with the handles carried in the packet's
//! output slots. Packets are never written through, so replaying the same
//! packet twice sees identical contents.

mod command;
mod descriptor;
mod device;
mod instance;
mod memory;
mod pipeline;
mod renderpass;
mod resource;
mod swapchain;
mod sync;

use std::ffi::CString;

use ash::vk;
use vkr_core::ReplayError;
use vkr_protocol::calls::{
    SerializedExtent2D, SerializedExtent3D, SerializedImageSubresourceLayers,
    SerializedImageSubresourceRange, SerializedOffset3D, SerializedRect2D,
};

pub use instance::{HOST_SURFACE_EXTENSION, SCREENSHOT_LAYER};

pub(crate) fn to_cstring(s: &str) -> Result<CString, ReplayError> {
    CString::new(s).map_err(|_| ReplayError::BadString)
}

pub(crate) fn extent_2d(e: &SerializedExtent2D) -> vk::Extent2D {
    vk::Extent2D {
        width: e.width,
        height: e.height,
    }
}

pub(crate) fn extent_3d(e: &SerializedExtent3D) -> vk::Extent3D {
    vk::Extent3D {
        width: e.width,
        height: e.height,
        depth: e.depth,
    }
}

pub(crate) fn offset_3d(o: &SerializedOffset3D) -> vk::Offset3D {
    vk::Offset3D {
        x: o.x,
        y: o.y,
        z: o.z,
    }
}

pub(crate) fn rect_2d(r: &SerializedRect2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D {
            x: r.offset.x,
            y: r.offset.y,
        },
        extent: extent_2d(&r.extent),
    }
}

pub(crate) fn subresource_range(r: &SerializedImageSubresourceRange) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::from_raw(r.aspect_mask),
        base_mip_level: r.base_mip_level,
        level_count: r.level_count,
        base_array_layer: r.base_array_layer,
        layer_count: r.layer_count,
    }
}

pub(crate) fn subresource_layers(
    l: &SerializedImageSubresourceLayers,
) -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: vk::ImageAspectFlags::from_raw(l.aspect_mask),
        mip_level: l.mip_level,
        base_array_layer: l.base_array_layer,
        layer_count: l.layer_count,
    }
}
