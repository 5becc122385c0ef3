//! RidingMap Settings Crate
//!
//! Tunables for the map renderer: fit margin, simplification tolerances,
//! worker pool size, and outline/border styling.

pub mod config;

pub use config::{default_config_path, RenderSettings, CONFIG_FILE_NAME};
