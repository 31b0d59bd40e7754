//! Packet model for the trace replayer.
//!
//! A trace is an ordered stream of packets; each packet names one Vulkan
//! entry point and carries its arguments verbatim, including the opaque
//! handle values the driver produced at record time. Trace-file parsing
//! lives outside this workspace -- the replay engine receives packets
//! already materialized into these types.

pub mod blob;
pub mod calls;
pub mod handle;

pub use blob::{Blob, BlobRange, PacketError, ScissorRect, Viewport};
pub use calls::{Packet, VulkanCall};
pub use handle::{ObjectKind, RecordedHandle};
