use vkr_protocol::{ObjectKind, PacketError};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A non-null recorded handle has no live counterpart. The call is
    /// skipped and replay continues.
    #[error("no live {kind:?} mapped for recorded handle {handle:#x}")]
    InvalidRemap { kind: ObjectKind, handle: u64 },

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("string in packet contains an interior NUL byte")]
    BadString,

    #[error("scratch allocation failed")]
    OutOfMemory,

    #[error("display: {0}")]
    Display(String),

    #[error("driver library: {0}")]
    Loader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
