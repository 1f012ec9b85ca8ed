//! Configuration management.

use anyhow::{Context, Result};
use panel_probe_core::{Mode, DEFAULT_HEIGHT, DEFAULT_WIDTH, MODE_COUNT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Batch conversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for .jpg/.jpeg/.png inputs
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Output root; cleared and rebuilt on every run
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Target display width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Target display height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Mode indices to generate (0-3 normal, 4-7 inverted)
    #[serde(default = "default_modes")]
    pub modes: Vec<u8>,

    /// Log and skip images that fail to decode instead of aborting
    #[serde(default)]
    pub skip_unreadable: bool,
}

// Default value functions
fn default_input() -> PathBuf {
    PathBuf::from("imgs")
}

fn default_output() -> PathBuf {
    PathBuf::from("assets")
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_modes() -> Vec<u8> {
    (0..MODE_COUNT).collect()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Validates dimensions and returns the configured modes, sorted and deduplicated.
    pub fn resolved_modes(&self) -> Result<Vec<Mode>> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!(
                "Width and height must be non-zero (got {}x{})",
                self.width,
                self.height
            );
        }
        let mut modes = self
            .modes
            .iter()
            .map(|&index| Mode::new(index))
            .collect::<panel_probe_core::Result<Vec<_>>>()
            .context("Invalid mode in configuration")?;
        modes.sort();
        modes.dedup();
        if modes.is_empty() {
            anyhow::bail!("At least one mode must be configured");
        }
        Ok(modes)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            width: default_width(),
            height: default_height(),
            modes: default_modes(),
            skip_unreadable: false,
        }
    }
}
