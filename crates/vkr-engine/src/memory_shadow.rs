//! Per-allocation bookkeeping that reproduces record-time mapped-memory
//! semantics on the replay driver.
//!
//! In the default mode every allocation is backed by the driver immediately
//! and mapped writes from the trace are copied straight into the driver's
//! host pointer. In adjust-for-GPU mode the driver allocation is deferred:
//! map/unmap/flush packets stage their bytes into a shadow buffer, and the
//! first binding call materializes the real allocation and replays the
//! staged bytes into it.

use std::collections::HashMap;

use ash::vk::{self, Handle};
use tracing::warn;
use vkr_core::ReplayError;
use vkr_protocol::{ObjectKind, RecordedHandle};

use crate::driver::VulkanDriver;

pub struct MemoryShadow {
    entries: HashMap<u64, MemoryEntry>,
    adjust_for_gpu: bool,
}

pub struct MemoryEntry {
    live: vk::DeviceMemory,
    allocation_size: u64,
    memory_type_index: u32,
    pending: bool,
    shadow: Option<ShadowBuffer>,
    mapping: Option<MappedWindow>,
}

/// Host-side staging for a pending allocation. `base_offset` anchors the
/// buffer within the allocation.
struct ShadowBuffer {
    base_offset: u64,
    bytes: Vec<u8>,
}

struct MappedWindow {
    offset: u64,
    size: u64,
    /// Driver host pointer; absent while the allocation is pending.
    ptr: Option<*mut u8>,
}

impl MemoryEntry {
    pub fn live(&self) -> vk::DeviceMemory {
        self.live
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    pub fn shadow_bytes(&self) -> Option<&[u8]> {
        self.shadow.as_ref().map(|s| s.bytes.as_slice())
    }

    fn window_size(&self, offset: u64, size: u64) -> u64 {
        if size == vk::WHOLE_SIZE {
            self.allocation_size.saturating_sub(offset)
        } else {
            size
        }
    }
}

impl MemoryShadow {
    pub fn new(adjust_for_gpu: bool) -> Self {
        Self {
            entries: HashMap::new(),
            adjust_for_gpu,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, recorded: RecordedHandle) -> Option<&MemoryEntry> {
        self.entries.get(&recorded.raw())
    }

    fn entry_mut(&mut self, recorded: RecordedHandle) -> Result<&mut MemoryEntry, ReplayError> {
        self.entries
            .get_mut(&recorded.raw())
            .ok_or(ReplayError::InvalidRemap {
                kind: ObjectKind::DeviceMemory,
                handle: recorded.raw(),
            })
    }

    /// Translate a recorded device-memory handle. A pending allocation
    /// remaps to the null handle until it is materialized.
    pub fn remap(&self, recorded: RecordedHandle) -> Result<vk::DeviceMemory, ReplayError> {
        if recorded.is_null() {
            return Ok(vk::DeviceMemory::null());
        }
        self.entries
            .get(&recorded.raw())
            .map(|e| e.live)
            .ok_or(ReplayError::InvalidRemap {
                kind: ObjectKind::DeviceMemory,
                handle: recorded.raw(),
            })
    }

    pub fn on_allocate<D: VulkanDriver>(
        &mut self,
        driver: &mut D,
        device: vk::Device,
        recorded: RecordedHandle,
        allocation_size: u64,
        memory_type_index: u32,
    ) -> vk::Result {
        let mut entry = MemoryEntry {
            live: vk::DeviceMemory::null(),
            allocation_size,
            memory_type_index,
            pending: self.adjust_for_gpu,
            shadow: None,
            mapping: None,
        };

        let result = if self.adjust_for_gpu {
            vk::Result::SUCCESS
        } else {
            let (result, memory) = driver.allocate_memory(device, allocation_size, memory_type_index);
            if result == vk::Result::SUCCESS {
                entry.live = memory;
            }
            result
        };

        if result == vk::Result::SUCCESS {
            self.entries.insert(recorded.raw(), entry);
        }
        result
    }

    pub fn on_map<D: VulkanDriver>(
        &mut self,
        driver: &mut D,
        device: vk::Device,
        recorded: RecordedHandle,
        offset: u64,
        size: u64,
        flags: u32,
    ) -> Result<vk::Result, ReplayError> {
        let entry = self.entry_mut(recorded)?;
        let size = entry.window_size(offset, size);

        if entry.pending {
            entry.mapping = Some(MappedWindow {
                offset,
                size,
                ptr: None,
            });
            return Ok(vk::Result::SUCCESS);
        }

        let (result, ptr) = driver.map_memory(
            device,
            entry.live,
            offset,
            size,
            vk::MemoryMapFlags::from_raw(flags),
        );
        if result == vk::Result::SUCCESS {
            entry.mapping = Some(MappedWindow {
                offset,
                size,
                ptr: Some(ptr),
            });
        }
        Ok(result)
    }

    /// Replay the bytes the trace captured at unmap time, then release the
    /// driver mapping (or stage the bytes if the allocation is pending).
    pub fn on_unmap<D: VulkanDriver>(
        &mut self,
        driver: &mut D,
        device: vk::Device,
        recorded: RecordedHandle,
        bytes: &[u8],
    ) -> Result<(), ReplayError> {
        let entry = self.entry_mut(recorded)?;

        if entry.pending {
            if let Some(window) = entry.mapping.take() {
                let size = window.size as usize;
                let shadow = entry.shadow.get_or_insert_with(|| ShadowBuffer {
                    base_offset: window.offset,
                    bytes: vec![0; size],
                });
                let len = bytes.len().min(shadow.bytes.len());
                shadow.bytes[..len].copy_from_slice(&bytes[..len]);
            } else {
                warn!("vkUnmapMemory replayed without an active mapping window");
            }
            return Ok(());
        }

        match entry.mapping.take() {
            Some(window) => {
                if let Some(ptr) = window.ptr {
                    let len = bytes.len().min(window.size as usize);
                    unsafe {
                        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, len);
                    }
                }
                driver.unmap_memory(device, entry.live);
            }
            None => warn!("vkUnmapMemory replayed without an active mapping window"),
        }
        Ok(())
    }

    /// Copy one flushed range into driver-visible memory, returning the
    /// remapped range to pass to the driver, or `None` when the bytes were
    /// staged into a pending allocation's shadow buffer.
    pub fn write_range(
        &mut self,
        recorded: RecordedHandle,
        offset: u64,
        size: u64,
        bytes: &[u8],
    ) -> Result<Option<vk::MappedMemoryRange<'static>>, ReplayError> {
        let entry = self.entry_mut(recorded)?;
        let size = entry.window_size(offset, size);

        if entry.pending {
            let base = entry
                .mapping
                .as_ref()
                .map(|w| (w.offset, w.size))
                .unwrap_or((0, entry.allocation_size));
            let shadow = entry.shadow.get_or_insert_with(|| ShadowBuffer {
                base_offset: base.0,
                bytes: vec![0; base.1 as usize],
            });
            let Some(rel) = offset.checked_sub(shadow.base_offset) else {
                warn!("flushed range starts below the staged mapping window");
                return Ok(None);
            };
            let rel = rel as usize;
            if rel >= shadow.bytes.len() {
                warn!("flushed range starts past the staged mapping window");
                return Ok(None);
            }
            let len = bytes.len().min(shadow.bytes.len() - rel);
            shadow.bytes[rel..rel + len].copy_from_slice(&bytes[..len]);
            return Ok(None);
        }

        let Some(window) = entry.mapping.as_ref() else {
            warn!("vkFlushMappedMemoryRanges range targets unmapped memory");
            return Ok(None);
        };
        let Some(ptr) = window.ptr else {
            return Ok(None);
        };
        let Some(rel) = offset.checked_sub(window.offset) else {
            warn!("flushed range starts below the mapping window");
            return Ok(None);
        };
        if rel >= window.size {
            warn!("flushed range starts past the mapping window");
            return Ok(None);
        }
        let len = bytes.len().min((window.size - rel) as usize);
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.add(rel as usize), len);
        }
        Ok(Some(
            vk::MappedMemoryRange::default()
                .memory(entry.live)
                .offset(offset)
                .size(size),
        ))
    }

    /// Turn a pending allocation into a real one: allocate through the
    /// driver and replay any staged shadow bytes via a map/copy/unmap cycle.
    /// Called by the first binding packet that references the allocation.
    pub fn materialize<D: VulkanDriver>(
        &mut self,
        driver: &mut D,
        device: vk::Device,
        recorded: RecordedHandle,
    ) -> Result<vk::Result, ReplayError> {
        if recorded.is_null() {
            return Ok(vk::Result::SUCCESS);
        }
        let entry = self.entry_mut(recorded)?;
        if !entry.pending {
            return Ok(vk::Result::SUCCESS);
        }

        let (result, memory) =
            driver.allocate_memory(device, entry.allocation_size, entry.memory_type_index);
        if result != vk::Result::SUCCESS {
            return Ok(result);
        }
        entry.live = memory;
        entry.pending = false;

        if let Some(shadow) = entry.shadow.take() {
            let (map_result, ptr) = driver.map_memory(
                device,
                memory,
                shadow.base_offset,
                shadow.bytes.len() as u64,
                vk::MemoryMapFlags::empty(),
            );
            if map_result == vk::Result::SUCCESS {
                unsafe {
                    std::ptr::copy_nonoverlapping(shadow.bytes.as_ptr(), ptr, shadow.bytes.len());
                }
                driver.unmap_memory(device, memory);
            } else {
                warn!(
                    result = ?map_result,
                    "could not replay staged bytes into the materialized allocation"
                );
            }
        }
        Ok(vk::Result::SUCCESS)
    }

    pub fn on_free<D: VulkanDriver>(
        &mut self,
        driver: &mut D,
        device: vk::Device,
        recorded: RecordedHandle,
    ) -> Result<(), ReplayError> {
        let entry = self
            .entries
            .remove(&recorded.raw())
            .ok_or(ReplayError::InvalidRemap {
                kind: ObjectKind::DeviceMemory,
                handle: recorded.raw(),
            })?;
        if entry.live.as_raw() != 0 {
            if entry.mapping.as_ref().is_some_and(|w| w.ptr.is_some()) {
                driver.unmap_memory(device, entry.live);
            }
            driver.free_memory(device, entry.live);
        }
        Ok(())
    }
}
