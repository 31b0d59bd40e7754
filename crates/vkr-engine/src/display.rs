//! The replay window.
//!
//! Owns a single native window created at replay initialization, unless the
//! embedder supplied raw display/window handles. Surface-creation handlers
//! substitute these handles for the ones the trace recorded; swapchain and
//! surface-capability handlers resize the window to the recorded extent.

use raw_window_handle::{
    HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use tracing::debug;
use vkr_core::{DisplayConfig, ReplayError};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

pub struct DisplayAdapter {
    backing: Backing,
    width: u32,
    height: u32,
    gpu_index: u32,
}

enum Backing {
    Winit {
        window: winit::window::Window,
        // Kept alive for the window's lifetime; replay never pumps it.
        _event_loop: EventLoop<()>,
    },
    External {
        display: RawDisplayHandle,
        window: RawWindowHandle,
    },
}

impl DisplayAdapter {
    /// Open the replay window. Fatal when no windowing system is reachable.
    pub fn create(config: &DisplayConfig) -> Result<Self, ReplayError> {
        let event_loop = EventLoop::new()
            .map_err(|e| ReplayError::Display(format!("event loop creation failed: {e}")))?;
        let window = WindowBuilder::new()
            .with_title("vkr replay")
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(true)
            .build(&event_loop)
            .map_err(|e| ReplayError::Display(format!("window creation failed: {e}")))?;

        Ok(Self {
            backing: Backing::Winit {
                window,
                _event_loop: event_loop,
            },
            width: config.width,
            height: config.height,
            gpu_index: config.gpu_index,
        })
    }

    /// Adopt a window the embedding environment already owns.
    pub fn from_raw_handles(
        display: RawDisplayHandle,
        window: RawWindowHandle,
        config: &DisplayConfig,
    ) -> Self {
        Self {
            backing: Backing::External { display, window },
            width: config.width,
            height: config.height,
            gpu_index: config.gpu_index,
        }
    }

    /// The platform surface descriptor's display half.
    pub fn raw_display_handle(&self) -> Result<RawDisplayHandle, ReplayError> {
        match &self.backing {
            Backing::Winit { window, .. } => Ok(window
                .display_handle()
                .map_err(|e| ReplayError::Display(e.to_string()))?
                .as_raw()),
            Backing::External { display, .. } => Ok(*display),
        }
    }

    /// The platform surface descriptor's window half.
    pub fn raw_window_handle(&self) -> Result<RawWindowHandle, ReplayError> {
        match &self.backing {
            Backing::Winit { window, .. } => Ok(window
                .window_handle()
                .map_err(|e| ReplayError::Display(e.to_string()))?
                .as_raw()),
            Backing::External { window, .. } => Ok(*window),
        }
    }

    /// Match the window to the extent a surface or swapchain packet
    /// recorded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        debug!(width, height, "resizing replay window to recorded extent");
        if let Backing::Winit { window, .. } = &self.backing {
            let _ = window.request_inner_size(PhysicalSize::new(width, height));
        }
        self.width = width;
        self.height = height;
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// GPU preference forwarded to instance bring-up.
    pub fn gpu_index(&self) -> u32 {
        self.gpu_index
    }
}
