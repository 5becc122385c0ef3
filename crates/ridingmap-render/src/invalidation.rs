//! Decides which caches to drop when the map's inputs change.

use lyon::math::Box2D;
use std::fmt;
use tracing::debug;

use crate::cache::RenderCaches;
use crate::viewport::ViewTransform;

/// Why a cache was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    ShapesReplaced,
    FocusChanged,
    Resized,
    TransformChanged,
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidationReason::ShapesReplaced => "shape list replaced",
            InvalidationReason::FocusChanged => "focus changed",
            InvalidationReason::Resized => "viewport resized",
            InvalidationReason::TransformChanged => "view transform changed",
        };
        f.write_str(text)
    }
}

/// Tracks focus, size and the transform the caches were filled under.
#[derive(Debug, Clone, Default)]
pub struct InvalidationController {
    focus: Option<Box2D>,
    size: (u32, u32),
    bound_view: Option<ViewTransform>,
    clears: u64,
}

impl InvalidationController {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    pub fn focus(&self) -> Option<Box2D> {
        self.focus
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Number of clears performed so far.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// Grouping by color is stale; per-shape geometry is still valid.
    pub fn shapes_replaced(&mut self, caches: &RenderCaches) {
        let cancelled = caches.clear_merge();
        self.record(InvalidationReason::ShapesReplaced, cancelled, false);
    }

    /// Returns false when `focus` equals the current focus.
    pub fn focus_changed(&mut self, focus: Option<Box2D>, caches: &RenderCaches) -> bool {
        if self.focus == focus {
            return false;
        }
        self.focus = focus;
        self.bound_view = None;
        let cancelled = caches.clear_all();
        self.record(InvalidationReason::FocusChanged, cancelled, true);
        true
    }

    /// Returns false when the size is unchanged.
    pub fn resized(&mut self, width: u32, height: u32, caches: &RenderCaches) -> bool {
        if self.size == (width, height) {
            return false;
        }
        self.size = (width, height);
        self.bound_view = None;
        let cancelled = caches.clear_all();
        self.record(InvalidationReason::Resized, cancelled, true);
        true
    }

    /// Bind the caches to `view`, clearing them first if they were filled
    /// under a different transform.
    pub fn check_transform(&mut self, view: &ViewTransform, caches: &RenderCaches) -> bool {
        match self.bound_view {
            Some(bound) if bound == *view => false,
            Some(_) => {
                self.bound_view = Some(*view);
                let cancelled = caches.clear_all();
                self.record(InvalidationReason::TransformChanged, cancelled, true);
                true
            }
            None => {
                self.bound_view = Some(*view);
                false
            }
        }
    }

    fn record(&mut self, reason: InvalidationReason, cancelled: usize, both: bool) {
        self.clears += 1;
        debug!(
            "Cleared {} ({}), cancelled {} in-flight jobs",
            if both { "both caches" } else { "merge cache" },
            reason,
            cancelled
        );
    }
}
