//! The packet-replay engine.
//!
//! Re-executes a recorded Vulkan call stream against the driver present on
//! this machine. Recorded handle values are translated through per-kind
//! object maps, mapped-memory writes are reconstructed through the memory
//! shadow, recorded window bindings are rebound to a locally opened window,
//! and every forwarded call goes through the [`driver::VulkanDriver`] table
//! so synthetic traces can be replayed against [`driver::FakeDriver`] in
//! tests.

pub mod display;
pub mod driver;
pub mod dump;
mod handlers;
pub mod memory_shadow;
pub mod messages;
pub mod object_map;
pub mod replayer;

pub use display::DisplayAdapter;
pub use driver::{AshDriver, FakeCall, FakeDescriptorWrite, FakeDriver, VulkanDriver};
pub use handlers::{HOST_SURFACE_EXTENSION, SCREENSHOT_LAYER};
pub use messages::{MessageQueue, ValidationMessage};
pub use replayer::VulkanReplayer;
