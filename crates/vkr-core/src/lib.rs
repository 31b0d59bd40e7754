//! Core types shared by the replay engine and its front ends: settings,
//! the error taxonomy, and per-call status codes.

pub mod config;
pub mod error;
pub mod status;

pub use config::{DisplayConfig, ReplaySettings};
pub use error::ReplayError;
pub use status::{CallStatus, ReplaySummary};
