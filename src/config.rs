//! Configuration for winmosaic
//!
//! Loads configuration from TOML file at `~/.config/winmosaic/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::mosaic::color::ColorOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mosaic: MosaicConfig,
    pub colors: ColorsConfig,
    pub display: DisplayConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, writing the defaults there if it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("winmosaic");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }

    pub fn color_options(&self) -> ColorOptions {
        ColorOptions {
            colorize: self.colors.colorize,
            hue_offset: self.colors.hue_offset,
        }
    }
}

/// Box grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Width of each box in pixels
    pub box_width: u32,
    /// Height of each box in pixels
    pub box_height: u32,
    /// Center the spiral on the mouse pointer instead of the screen
    pub at_pointer: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            box_width: 200,
            box_height: 40,
            at_pointer: false,
        }
    }
}

/// Box coloring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Color boxes by application; gray otherwise
    pub colorize: bool,
    /// Hue rotation, 0-255
    pub hue_offset: u8,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            colorize: true,
            hue_offset: 0,
        }
    }
}

/// What is drawn on a box besides its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the desktop number in the box corner
    pub show_desktop: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_desktop: true }
    }
}

/// Search box size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub box_width: u32,
    pub box_height: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            box_width: 240,
            box_height: 28,
        }
    }
}
