//! Runtime configuration for camera feeds and the XR interface.
//!
//! Every field has a default so a partial (or empty) JSON document is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub xr: XrConfig,
}

/// Where a camera sits on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPositionConfig {
    #[default]
    Unspecified,
    Front,
    Back,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub feed_name: String,
    pub position: FeedPositionConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            feed_name: String::from("camera"),
            position: FeedPositionConfig::Unspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XrConfig {
    /// Display name reported by the interface.
    pub interface_name: String,
    /// Interpupillary distance in meters.
    pub ipd_m: f32,
    /// Height of the head above the reference frame origin, in meters.
    pub head_height_m: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub render_target_width: u32,
    pub render_target_height: u32,
    /// Meters per world unit.
    pub world_scale: f32,
}

impl Default for XrConfig {
    fn default() -> Self {
        Self {
            interface_name: String::from("Mixed Reality"),
            ipd_m: 0.065,
            head_height_m: 1.8,
            fov_degrees: 60.0,
            render_target_width: 500,
            render_target_height: 500,
            world_scale: 1.0,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.xr.validate()
    }
}

impl XrConfig {
    pub fn validate(&self) -> Result<()> {
        self.validate_headset()?;
        self.validate_world_scale()
    }

    /// Checks the fields an interface reads: eye geometry, FOV, render target.
    pub fn validate_headset(&self) -> Result<()> {
        if !self.ipd_m.is_finite() || self.ipd_m < 0.0 {
            return Err(Error::config(format!("xr.ipd_m must be >= 0, got {}", self.ipd_m)));
        }
        if !self.head_height_m.is_finite() {
            return Err(Error::config("xr.head_height_m must be finite"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(Error::config(format!(
                "xr.fov_degrees must be in (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if self.render_target_width == 0 || self.render_target_height == 0 {
            return Err(Error::config("xr render target size must be non-zero"));
        }
        Ok(())
    }

    pub fn validate_world_scale(&self) -> Result<()> {
        if !(self.world_scale.is_finite() && self.world_scale > 0.0) {
            return Err(Error::config(format!(
                "xr.world_scale must be > 0, got {}",
                self.world_scale
            )));
        }
        Ok(())
    }
}
