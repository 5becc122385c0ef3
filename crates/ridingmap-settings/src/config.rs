//! Render configuration for RidingMap
//!
//! Provides configuration file handling and validation for the renderer.
//! Supports JSON and TOML file formats; the default location is the
//! platform-specific config directory.

use ridingmap_core::{Color, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name used under the platform config directory.
pub const CONFIG_FILE_NAME: &str = "render.toml";

/// Renderer tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Device units subtracted from the viewport before fitting the focus box
    pub margin: f32,
    /// Simplification tolerance when either point is on screen
    pub visible_tolerance: f32,
    /// Simplification tolerance when both points are off screen
    pub offscreen_tolerance: f32,
    /// Curve flattening tolerance used when merging regions
    pub flatten_tolerance: f32,
    /// Maximum number of worker threads for simplify/merge jobs
    pub worker_threads: usize,
    /// Stroke color for outline shapes
    pub outline_color: Color,
    /// Stroke width for outline shapes
    pub outline_width: f32,
    /// Stroke width for the viewport border
    pub border_width: f32,
    /// Background fill used by the headless renderer
    pub background: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            margin: 2.0,
            visible_tolerance: 0.5,
            offscreen_tolerance: 10.0,
            flatten_tolerance: 0.25,
            worker_threads: 4,
            outline_color: Color::rgb(0x40, 0x40, 0x40),
            outline_width: 1.0,
            border_width: 2.0,
            background: Color::WHITE,
        }
    }
}

impl RenderSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::config("Config file must be .json or .toml"));
        };

        settings.validate()?;
        debug!("Loaded render settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load_or_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::config("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::config("Margin must be finite and >= 0"));
        }

        if !(self.visible_tolerance.is_finite() && self.visible_tolerance >= 0.0) {
            return Err(Error::config("Visible tolerance must be finite and >= 0"));
        }

        if !(self.offscreen_tolerance.is_finite() && self.offscreen_tolerance >= 0.0) {
            return Err(Error::config("Off-screen tolerance must be finite and >= 0"));
        }

        if !(self.flatten_tolerance.is_finite() && self.flatten_tolerance > 0.0) {
            return Err(Error::config("Flatten tolerance must be > 0"));
        }

        if self.worker_threads == 0 {
            return Err(Error::config("Worker threads must be > 0"));
        }

        if !(self.outline_width.is_finite() && self.outline_width > 0.0) {
            return Err(Error::config("Outline width must be > 0"));
        }

        if !(self.border_width.is_finite() && self.border_width > 0.0) {
            return Err(Error::config("Border width must be > 0"));
        }

        Ok(())
    }
}

/// Default settings file location (`<config dir>/ridingmap/render.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ridingmap").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.visible_tolerance, 0.5);
        assert_eq!(settings.offscreen_tolerance, 10.0);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let settings = RenderSettings {
            worker_threads: 0,
            ..RenderSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_margin() {
        let settings = RenderSettings {
            margin: -1.0,
            ..RenderSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: RenderSettings = toml::from_str("margin = 8.0\n").unwrap();
        assert_eq!(settings.margin, 8.0);
        assert_eq!(settings.worker_threads, 4);
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("ridingmap/render.toml"));
        }
    }
}
