use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Byte arena carried by a packet.
///
/// Variable-length payloads (mapped-memory bytes, shader words, viewport and
/// scissor arrays, sample masks, specialization data) are stored in the
/// packet as offsets into this arena and interpreted into typed slices
/// before use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(Vec<u8>);

/// A byte range inside a packet's [`Blob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRange {
    pub offset: u32,
    pub len: u32,
}

impl BlobRange {
    pub const EMPTY: BlobRange = BlobRange { offset: 0, len: 0 };

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("blob range [{offset}, +{len}) exceeds the {size}-byte packet blob")]
    RangeOutOfBounds { offset: u32, len: u32, size: usize },

    #[error("blob range length {len} is not a multiple of the {elem}-byte element size")]
    BadElementSize { len: u32, elem: usize },
}

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append raw bytes, returning the range they occupy. Used by the packet
    /// materialization side and by tests building synthetic traces.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> BlobRange {
        let offset = self.0.len() as u32;
        self.0.extend_from_slice(bytes);
        BlobRange {
            offset,
            len: bytes.len() as u32,
        }
    }

    /// Append a typed array, returning the range it occupies.
    pub fn push<T: Pod>(&mut self, items: &[T]) -> BlobRange {
        self.push_bytes(bytemuck::cast_slice(items))
    }

    /// Resolve a range into the raw bytes it covers.
    pub fn bytes(&self, range: BlobRange) -> Result<&[u8], PacketError> {
        let offset = range.offset as usize;
        let end = offset + range.len as usize;
        self.0
            .get(offset..end)
            .ok_or(PacketError::RangeOutOfBounds {
                offset: range.offset,
                len: range.len,
                size: self.0.len(),
            })
    }

    /// Resolve a range into an owned typed array. The copy sidesteps the
    /// arena's byte alignment.
    pub fn typed<T: Pod>(&self, range: BlobRange) -> Result<Vec<T>, PacketError> {
        let bytes = self.bytes(range)?;
        let elem = std::mem::size_of::<T>();
        if elem == 0 || bytes.len() % elem != 0 {
            return Err(PacketError::BadElementSize {
                len: range.len,
                elem,
            });
        }
        let mut out = vec![T::zeroed(); bytes.len() / elem];
        bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(bytes);
        Ok(out)
    }
}

/// Viewport record as it appears inside a packet blob.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// Scissor rectangle record as it appears inside a packet blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
