//! Shared plumbing for the vkr workspace: logging bootstrap and platform
//! helpers.

pub mod logging;
pub mod platform;

pub use logging::init_logging;
