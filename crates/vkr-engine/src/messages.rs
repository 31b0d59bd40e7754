//! Validation-message queue fed by the driver's debug-report callback.
//!
//! The callback may fire on a driver-owned thread during a call, so the
//! queue is the one engine structure behind a lock. The replay driver
//! drains it after every call.

use std::collections::VecDeque;
use std::ffi::{c_char, c_void, CStr};
use std::sync::Arc;

use ash::vk;
use parking_lot::Mutex;

/// Messages beyond this are dropped oldest-first.
const MAX_PENDING: usize = 256;

/// One diagnostic record routed through the debug-report callback.
#[derive(Debug, Clone)]
pub struct ValidationMessage {
    pub flags: vk::DebugReportFlagsEXT,
    pub object_type: vk::DebugReportObjectTypeEXT,
    pub src_object: u64,
    pub location: usize,
    pub message_code: i32,
    pub layer_prefix: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct MessageQueue {
    inner: Arc<Mutex<VecDeque<ValidationMessage>>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: ValidationMessage) {
        let mut queue = self.inner.lock();
        if queue.len() >= MAX_PENDING {
            queue.pop_front();
        }
        queue.push_back(message);
    }

    /// Take every message queued since the last drain.
    pub fn drain(&self) -> Vec<ValidationMessage> {
        self.inner.lock().drain(..).collect()
    }

    /// Pointer handed to the driver as the callback's user data. Valid for
    /// as long as this queue (or any clone of it) is alive.
    pub fn user_data(&self) -> *mut c_void {
        Arc::as_ptr(&self.inner) as *mut c_void
    }
}

/// The host callback installed by debug-report-callback packets.
/// `user_data` is the pointer from [`MessageQueue::user_data`].
pub unsafe extern "system" fn debug_report_callback(
    flags: vk::DebugReportFlagsEXT,
    object_type: vk::DebugReportObjectTypeEXT,
    object: u64,
    location: usize,
    message_code: i32,
    p_layer_prefix: *const c_char,
    p_message: *const c_char,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    if p_user_data.is_null() {
        return vk::FALSE;
    }
    let queue = &*(p_user_data as *const Mutex<VecDeque<ValidationMessage>>);

    let to_string = |ptr: *const c_char| {
        if ptr.is_null() {
            String::new()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    };

    let message = ValidationMessage {
        flags,
        object_type,
        src_object: object,
        location,
        message_code,
        layer_prefix: to_string(p_layer_prefix),
        message: to_string(p_message),
    };

    let mut pending = queue.lock();
    if pending.len() >= MAX_PENDING {
        pending.pop_front();
    }
    pending.push_back(message);

    vk::FALSE
}
