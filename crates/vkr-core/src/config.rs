use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Replay settings, loaded from vkr.toml and overridden per-run by the CLI.
///
/// Handlers receive these through the engine; nothing here is mutated once
/// a replay starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Frame-range spec for the screenshot layer. When set, the layer is
    /// injected into instance and device creation if the host has it.
    #[serde(default)]
    pub screenshot_list: Option<String>,
    /// Defer device-memory allocations and stage mapped writes through a
    /// shadow buffer until the first binding call.
    #[serde(default)]
    pub adjust_for_gpu: bool,
    /// Directory receiving pipeline/command-buffer DOT dumps on exit.
    #[serde(default)]
    pub dump_state: Option<PathBuf>,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Which GPU to prefer during instance bring-up.
    #[serde(default)]
    pub gpu_index: u32,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            screenshot_list: None,
            adjust_for_gpu: false,
            dump_state: None,
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            gpu_index: 0,
        }
    }
}

impl ReplaySettings {
    /// Load settings from a TOML file.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let settings: ReplaySettings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}
