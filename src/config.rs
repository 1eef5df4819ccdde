//! Preview configuration, loaded once at startup from TOML.
//!
//! ```toml
//! title = "Story preview"
//! clear_colour = [0.05, 0.05, 0.08]
//!
//! [palette]
//! protagonist = 0x4a90e2
//! earth = 0x8b7355
//!
//! [rig]
//! damping_factor = 0.08
//! ```
//!
//! Every key is optional; missing keys keep the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{camera::RigSettings, compose::Palette};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub title: String,
    /// Background behind the scene, linear RGB.
    pub clear_colour: [f64; 3],
    pub palette: Palette,
    pub rig: RigSettings,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: "story-ngin preview".to_string(),
            clear_colour: [0.05, 0.05, 0.08],
            palette: Palette::default(),
            rig: RigSettings::default(),
        }
    }
}

impl PreviewConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_colour;
        wgpu::Color { r, g, b, a: 1.0 }
    }
}
