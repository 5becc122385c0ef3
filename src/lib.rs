//! # RidingMap
//!
//! Election map rendering with an incremental geometry cache:
//! - Fits a focus area into the viewport with uniform scaling
//! - Simplifies each shape once per view transform, off the render thread
//! - Merges same-colored regions into single fills
//! - Paints progressively, repainting as background work completes
//!
//! ## Architecture
//!
//! RidingMap is organized as a workspace with multiple crates:
//!
//! 1. **ridingmap-core** - Colors, errors, shared-state aliases, latest-value bindings
//! 2. **ridingmap-settings** - Render settings with JSON/TOML persistence
//! 3. **ridingmap-render** - Caches, worker pool, drawing surfaces, map view
//! 4. **ridingmap** - Map documents and the headless renderer binary

pub mod cli;
pub mod document;

pub use cli::CliArgs;
pub use document::{MapDocument, MapScene, ShapeEntry};

pub use ridingmap_core::{Color, Error, GeometryError, RenderError, Result};
pub use ridingmap_render::{
    map_bindings, MapView, PaintStats, PixmapSurface, RecordingSurface, Shape,
};
pub use ridingmap_settings::RenderSettings;

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Upper bound on how long the headless renderer waits for background work.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // Stdout carries nothing else, so logs go to stderr.
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Render `scene` headlessly, repainting until no work is pending or
/// `timeout` passes.
///
/// Returns the final frame and the statistics of its pass.
pub fn render_settled(
    scene: &MapScene,
    settings: &RenderSettings,
    width: u32,
    height: u32,
    timeout: Duration,
) -> Result<(PixmapSurface, PaintStats)> {
    let mut view = MapView::new(settings.clone(), width, height)?;
    let (publishers, inputs) = map_bindings();
    scene.publish(&publishers);
    publishers.size.publish((width, height));
    view.apply_inputs(&inputs);

    let mut surface = PixmapSurface::new(width, height)?;
    let deadline = Instant::now() + timeout;
    let mut passes = 0;
    loop {
        surface.clear(settings.background);
        let stats = view.paint(&mut surface);
        passes += 1;
        if stats.is_complete() {
            debug!("Map settled after {} passes", passes);
            return Ok((surface, stats));
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !view.wait_for_repaint(remaining) {
            warn!(
                "Map did not settle within {:?}; {} entries still pending",
                timeout, stats.pending
            );
            return Ok((surface, stats));
        }
    }
}
