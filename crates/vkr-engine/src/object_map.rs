//! Per-kind recorded-to-live handle tables.
//!
//! One typed table per object kind, all keyed and valued by 64-bit handle
//! values. Null propagates: the null recorded handle always looks up to the
//! null live handle, and a non-null recorded handle without an entry remaps
//! to an error the caller turns into a skipped call.

use std::collections::HashMap;

use ash::vk::{self, Handle};
use tracing::warn;
use vkr_core::ReplayError;
use vkr_protocol::{ObjectKind, RecordedHandle};

pub struct HandleTable<T> {
    kind: ObjectKind,
    entries: HashMap<u64, T>,
}

impl<T: Handle + Copy> HandleTable<T> {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Register a live handle under the recorded one. Both sides must be
    /// non-null; a duplicate recorded handle indicates a recorder bug.
    pub fn insert(&mut self, recorded: RecordedHandle, live: T) {
        debug_assert!(!recorded.is_null() && live.as_raw() != 0);
        if self.entries.insert(recorded.raw(), live).is_some() {
            warn!(
                kind = ?self.kind,
                recorded = format_args!("{:#x}", recorded.raw()),
                "recorded handle inserted twice"
            );
        }
    }

    /// Translate a recorded handle, yielding the null handle for the null
    /// recorded handle and for unknown handles alike.
    pub fn lookup(&self, recorded: RecordedHandle) -> T {
        if recorded.is_null() {
            return T::from_raw(0);
        }
        self.entries
            .get(&recorded.raw())
            .copied()
            .unwrap_or_else(|| T::from_raw(0))
    }

    /// Translate a recorded handle, treating an unknown non-null handle as
    /// an error. This is the form handlers use before forwarding a call.
    pub fn remap(&self, recorded: RecordedHandle) -> Result<T, ReplayError> {
        if recorded.is_null() {
            return Ok(T::from_raw(0));
        }
        self.entries
            .get(&recorded.raw())
            .copied()
            .ok_or(ReplayError::InvalidRemap {
                kind: self.kind,
                handle: recorded.raw(),
            })
    }

    /// Drop the mapping for a destroyed object. No-op if absent.
    pub fn remove(&mut self, recorded: RecordedHandle) {
        self.entries.remove(&recorded.raw());
    }

    pub fn contains(&self, recorded: RecordedHandle) -> bool {
        self.entries.contains_key(&recorded.raw())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every live handle, for teardown.
    pub fn drain_live(&mut self) -> Vec<T> {
        self.entries.drain().map(|(_, live)| live).collect()
    }

    /// Drop every mapping. Used for kinds with no destroy call of their own
    /// (physical devices, queues), whose lifetime ends with their parent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

macro_rules! object_map {
    ($( $field:ident : $ty:ty => $kind:ident ),+ $(,)?) => {
        /// The full family of per-kind handle tables.
        ///
        /// Device memory is absent here on purpose: its table lives in the
        /// memory shadow, whose allocation records own the live handles.
        pub struct ObjectMap {
            $( pub $field: HandleTable<$ty>, )+
        }

        impl ObjectMap {
            pub fn new() -> Self {
                Self {
                    $( $field: HandleTable::new(ObjectKind::$kind), )+
                }
            }

            /// True when no mapping of any kind remains.
            pub fn is_empty(&self) -> bool {
                $( self.$field.is_empty() )&&+
            }

            /// Total number of live mappings across every kind.
            pub fn live_objects(&self) -> usize {
                0 $( + self.$field.len() )+
            }
        }

        impl Default for ObjectMap {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

object_map! {
    instances: vk::Instance => Instance,
    physical_devices: vk::PhysicalDevice => PhysicalDevice,
    devices: vk::Device => Device,
    queues: vk::Queue => Queue,
    command_buffers: vk::CommandBuffer => CommandBuffer,
    buffers: vk::Buffer => Buffer,
    images: vk::Image => Image,
    image_views: vk::ImageView => ImageView,
    buffer_views: vk::BufferView => BufferView,
    samplers: vk::Sampler => Sampler,
    shader_modules: vk::ShaderModule => ShaderModule,
    descriptor_set_layouts: vk::DescriptorSetLayout => DescriptorSetLayout,
    descriptor_pools: vk::DescriptorPool => DescriptorPool,
    descriptor_sets: vk::DescriptorSet => DescriptorSet,
    pipeline_layouts: vk::PipelineLayout => PipelineLayout,
    pipeline_caches: vk::PipelineCache => PipelineCache,
    pipelines: vk::Pipeline => Pipeline,
    render_passes: vk::RenderPass => RenderPass,
    framebuffers: vk::Framebuffer => Framebuffer,
    semaphores: vk::Semaphore => Semaphore,
    fences: vk::Fence => Fence,
    events: vk::Event => Event,
    command_pools: vk::CommandPool => CommandPool,
    swapchains: vk::SwapchainKHR => Swapchain,
    surfaces: vk::SurfaceKHR => Surface,
    debug_callbacks: vk::DebugReportCallbackEXT => DebugReportCallback,
}
