use serde::{Deserialize, Serialize};

/// An opaque 64-bit handle value captured at record time.
/// Only meaningful as a lookup key -- the replay driver produces different
/// values for the same objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedHandle(pub u64);

impl RecordedHandle {
    pub const NULL: RecordedHandle = RecordedHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordedHandle {
    fn from(raw: u64) -> Self {
        RecordedHandle(raw)
    }
}

/// Object kinds with their own recorded-to-live handle table.
/// Keeping one typed table per kind makes it impossible to remap an image
/// handle as a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Instance,
    PhysicalDevice,
    Device,
    Queue,
    CommandBuffer,
    Buffer,
    Image,
    ImageView,
    BufferView,
    Sampler,
    ShaderModule,
    DescriptorSetLayout,
    DescriptorPool,
    DescriptorSet,
    PipelineLayout,
    PipelineCache,
    Pipeline,
    RenderPass,
    Framebuffer,
    Semaphore,
    Fence,
    Event,
    CommandPool,
    DeviceMemory,
    Swapchain,
    Surface,
    DebugReportCallback,
}
