#![allow(dead_code)]

use ridingmap_render::{DrawSurface, MapView, PaintStats, RecordingSurface};
use ridingmap_settings::RenderSettings;
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(5);

/// Settings with no margin so a 0..100 focus maps 1:1 onto a 100x100 view.
pub fn exact_settings() -> RenderSettings {
    RenderSettings {
        margin: 0.0,
        worker_threads: 2,
        ..RenderSettings::default()
    }
}

/// Paint until a pass completes with nothing pending.
pub fn settle(view: &mut MapView, surface: &mut dyn DrawSurface) -> PaintStats {
    for _ in 0..20 {
        let stats = view.paint(surface);
        if stats.is_complete() {
            return stats;
        }
        assert!(view.wait_idle(WAIT), "worker pool did not go idle");
    }
    panic!("map view did not settle");
}

/// Settle and return the draw calls of the final pass.
pub fn settle_recording(view: &mut MapView) -> (PaintStats, RecordingSurface) {
    let mut surface = RecordingSurface::new();
    for _ in 0..20 {
        surface.clear();
        let stats = view.paint(&mut surface);
        if stats.is_complete() {
            return (stats, surface);
        }
        assert!(view.wait_idle(WAIT), "worker pool did not go idle");
    }
    panic!("map view did not settle");
}
