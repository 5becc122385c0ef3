//! The map widget: owns the caches and paints whatever is ready.
//!
//! A paint pass never waits for background work. Entries that are still
//! being computed are left out of the frame, and every job that commits a
//! result sends a repaint request so the host schedules another pass.

use lyon::math::{point, Box2D};
use lyon::path::Path;
use ridingmap_core::{Color, RenderError};
use ridingmap_settings::RenderSettings;
use std::cell::Cell;
use std::collections::HashSet;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::cache::{RenderCaches, Resolution};
use crate::geometry::Shape;
use crate::inputs::MapInputs;
use crate::invalidation::InvalidationController;
use crate::pool::{repaint_channel, RepaintRequest, WorkerPool};
use crate::simplify::{SimplifiedPath, Tolerances};
use crate::surface::DrawSurface;
use crate::viewport::{focus_bounds, ViewTransform, VisibilityFilter};

/// Summary of one paint pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Shapes that passed the visibility filter.
    pub visible: usize,
    /// Shapes painted, individually or as part of a merged region.
    pub drawn: usize,
    /// Color groups painted as one merged region.
    pub merged_groups: usize,
    /// Color groups painted member by member.
    pub fallback_groups: usize,
    /// Cache entries still being computed.
    pub pending: usize,
    pub outlines: usize,
    /// No usable transform; nothing but the border was drawn.
    pub skipped: bool,
}

impl PaintStats {
    /// True when nothing was left out for lack of a result.
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

/// Resolved members of one color group for the current pass.
struct ColorGroup {
    color: Color,
    ready: Vec<Arc<SimplifiedPath>>,
    members: usize,
    incomplete: bool,
}

/// Map renderer with progressive, cached painting.
pub struct MapView {
    settings: RenderSettings,
    tolerances: Tolerances,
    // Dropped before the pool so pending jobs are cancelled first.
    caches: RenderCaches,
    pool: WorkerPool,
    repaint_rx: Receiver<RepaintRequest>,
    repaint_pending: Cell<bool>,
    controller: InvalidationController,
    shapes: Vec<(Shape, Color)>,
    outline: Vec<Shape>,
    header: String,
    border_color: Option<Color>,
}

impl MapView {
    pub fn new(settings: RenderSettings, width: u32, height: u32) -> Result<Self, RenderError> {
        let pool = WorkerPool::new(settings.worker_threads)?;
        let (repaint_tx, repaint_rx) = repaint_channel();
        debug!("Map view created at {}x{}", width, height);
        Ok(Self {
            tolerances: Tolerances::from(&settings),
            settings,
            caches: RenderCaches::new(repaint_tx),
            pool,
            repaint_rx,
            repaint_pending: Cell::new(false),
            controller: InvalidationController::new(width, height),
            shapes: Vec::new(),
            outline: Vec::new(),
            header: String::new(),
            border_color: None,
        })
    }

    /// Replace the shape/color list. Only the merge cache is cleared.
    pub fn set_shapes(&mut self, shapes: Vec<(Shape, Color)>) {
        self.shapes = shapes;
        self.controller.shapes_replaced(&self.caches);
    }

    pub fn set_focus(&mut self, focus: Option<Box2D>) {
        self.controller.focus_changed(focus, &self.caches);
    }

    pub fn set_outline(&mut self, outline: Vec<Shape>) {
        self.outline = outline;
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn set_border_color(&mut self, color: Option<Color>) {
        self.border_color = color;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.controller.resized(width, height, &self.caches);
    }

    /// Apply every input that has a new value. Returns true if any did.
    pub fn apply_inputs(&mut self, inputs: &MapInputs) -> bool {
        let mut changed = false;
        if let Some(shapes) = inputs.shapes.take() {
            self.set_shapes(shapes);
            changed = true;
        }
        if let Some(focus) = inputs.focus.take() {
            self.set_focus(focus);
            changed = true;
        }
        if let Some(outline) = inputs.outline.take() {
            self.set_outline(outline);
            changed = true;
        }
        if let Some(header) = inputs.header.take() {
            self.set_header(header);
            changed = true;
        }
        if let Some(color) = inputs.border_color.take() {
            self.set_border_color(color);
            changed = true;
        }
        if let Some((width, height)) = inputs.size.take() {
            self.resize(width, height);
            changed = true;
        }
        changed
    }

    pub fn shapes(&self) -> &[(Shape, Color)] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index).map(|(shape, _)| shape)
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        self.shapes.get(index).map(|(_, color)| *color)
    }

    pub fn outline(&self) -> &[Shape] {
        &self.outline
    }

    pub fn outline_shape(&self, index: usize) -> Option<&Shape> {
        self.outline.get(index)
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn border_color(&self) -> Option<Color> {
        self.border_color
    }

    /// Explicit focus, if one was set.
    pub fn focus(&self) -> Option<Box2D> {
        self.controller.focus()
    }

    pub fn size(&self) -> (u32, u32) {
        self.controller.size()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn caches(&self) -> &RenderCaches {
        &self.caches
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Transform the next pass would use, `None` if degenerate.
    pub fn view_transform(&self) -> Option<ViewTransform> {
        let focus = focus_bounds(self.shapes.iter().map(|(s, _)| s), self.controller.focus())?;
        let (width, height) = self.controller.size();
        ViewTransform::fit(&focus, width, height, self.settings.margin)
    }

    /// True if a job has completed since the last pass. Never blocks.
    pub fn needs_repaint(&self) -> bool {
        if self.repaint_rx.try_recv().is_ok() {
            self.repaint_pending.set(true);
        }
        self.repaint_pending.get()
    }

    /// Block until a job completes or `timeout` passes.
    pub fn wait_for_repaint(&self, timeout: Duration) -> bool {
        if self.needs_repaint() {
            return true;
        }
        match self.repaint_rx.recv_timeout(timeout) {
            Ok(_) => {
                self.repaint_pending.set(true);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Block until the worker pool has no job in flight.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pool.wait_idle(timeout)
    }

    /// Draw everything that is resolved and schedule the rest.
    pub fn paint(&mut self, surface: &mut dyn DrawSurface) -> PaintStats {
        let drained = self.repaint_rx.try_iter().count();
        self.repaint_pending.set(false);

        let mut stats = PaintStats::default();
        match self.view_transform() {
            Some(view) => self.paint_content(&view, surface, &mut stats),
            None => {
                trace!("No usable view transform, skipping map content");
                stats.skipped = true;
            }
        }
        self.paint_border(surface);

        trace!(
            "Paint pass: {} repaint signals, {} visible, {} drawn, {} merged, {} fallback, {} pending",
            drained,
            stats.visible,
            stats.drawn,
            stats.merged_groups,
            stats.fallback_groups,
            stats.pending
        );
        stats
    }

    fn paint_content(
        &mut self,
        view: &ViewTransform,
        surface: &mut dyn DrawSurface,
        stats: &mut PaintStats,
    ) {
        self.controller.check_transform(view, &self.caches);
        let filter = VisibilityFilter::new(view);

        let mut groups: Vec<ColorGroup> = Vec::new();
        let mut seen = HashSet::new();
        for (shape, color) in &self.shapes {
            if !filter.is_visible(shape) || !seen.insert(shape.id()) {
                continue;
            }
            stats.visible += 1;

            let index = match groups.iter().position(|g| g.color == *color) {
                Some(index) => index,
                None => {
                    groups.push(ColorGroup {
                        color: *color,
                        ready: Vec::new(),
                        members: 0,
                        incomplete: false,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.members += 1;

            match self
                .caches
                .transform
                .resolve(shape, view, self.tolerances, &self.pool)
            {
                Resolution::Ready(path) => group.ready.push(path),
                Resolution::Pending => {
                    stats.pending += 1;
                    group.incomplete = true;
                }
                Resolution::Failed => group.incomplete = true,
            }
        }

        for group in &groups {
            self.paint_group(group, surface, stats);
        }

        for shape in &self.outline {
            if !filter.is_visible(shape) {
                continue;
            }
            match self
                .caches
                .transform
                .resolve(shape, view, self.tolerances, &self.pool)
            {
                Resolution::Ready(path) => {
                    surface.stroke_path(
                        path.path(),
                        self.settings.outline_color,
                        self.settings.outline_width,
                    );
                    stats.outlines += 1;
                }
                Resolution::Pending => stats.pending += 1,
                Resolution::Failed => {}
            }
        }
    }

    fn paint_group(&self, group: &ColorGroup, surface: &mut dyn DrawSurface, stats: &mut PaintStats) {
        if group.members == 1 || group.incomplete {
            if group.members > 1 {
                stats.fallback_groups += 1;
            }
            self.paint_members(group, surface, stats);
            return;
        }

        match self
            .caches
            .merge
            .resolve(&group.ready, self.settings.flatten_tolerance, &self.pool)
        {
            Resolution::Ready(region) => {
                surface.fill_path(region.path(), group.color);
                stats.merged_groups += 1;
                stats.drawn += group.ready.len();
            }
            Resolution::Pending => {
                stats.pending += 1;
                stats.fallback_groups += 1;
                self.paint_members(group, surface, stats);
            }
            Resolution::Failed => {
                stats.fallback_groups += 1;
                self.paint_members(group, surface, stats);
            }
        }
    }

    fn paint_members(&self, group: &ColorGroup, surface: &mut dyn DrawSurface, stats: &mut PaintStats) {
        for member in &group.ready {
            surface.fill_path(member.path(), group.color);
            stats.drawn += 1;
        }
    }

    fn paint_border(&self, surface: &mut dyn DrawSurface) {
        let Some(color) = self.border_color else {
            return;
        };
        let (width, height) = self.controller.size();
        if width == 0 || height == 0 {
            return;
        }
        let (w, h) = (width as f32, height as f32);
        let mut builder = Path::builder();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(w, 0.0));
        builder.line_to(point(w, h));
        builder.line_to(point(0.0, h));
        builder.end(true);
        surface.stroke_path(&builder.build(), color, self.settings.border_width);
    }
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("size", &self.controller.size())
            .field("shapes", &self.shapes.len())
            .field("outline", &self.outline.len())
            .field("transform_entries", &self.caches.transform.len())
            .field("merge_entries", &self.caches.merge.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MergeKey;
    use crate::simplify::simplify;
    use crate::surface::{DrawCall, RecordingSurface};
    use std::sync::mpsc;

    const WAIT: Duration = Duration::from_secs(5);
    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn view() -> MapView {
        MapView::new(RenderSettings::default(), 100, 100).unwrap()
    }

    /// 100x100 view with a 0..100 focus, so shapes map 1:1 to device space.
    fn unit_view() -> MapView {
        let settings = RenderSettings {
            margin: 0.0,
            worker_threads: 2,
            ..RenderSettings::default()
        };
        let mut map = MapView::new(settings, 100, 100).unwrap();
        map.set_focus(Some(Box2D::new(point(0.0, 0.0), point(100.0, 100.0))));
        map
    }

    fn settle(map: &mut MapView, surface: &mut RecordingSurface) -> PaintStats {
        for _ in 0..20 {
            surface.clear();
            let stats = map.paint(surface);
            if stats.is_complete() {
                return stats;
            }
            assert!(map.wait_idle(WAIT));
        }
        panic!("map view did not settle");
    }

    #[test]
    fn test_empty_view_skips() {
        let mut map = view();
        let mut surface = RecordingSurface::new();
        let stats = map.paint(&mut surface);
        assert!(stats.skipped);
        assert!(stats.is_complete());
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn test_accessors_are_indexable() {
        let mut map = view();
        let a = Shape::rect(0.0, 0.0, 1.0, 1.0);
        let b = Shape::rect(2.0, 2.0, 3.0, 3.0);
        map.set_shapes(vec![(a.clone(), Color::BLACK), (b.clone(), Color::WHITE)]);
        map.set_outline(vec![b.clone()]);
        map.set_header("Riding results");

        assert_eq!(map.shape(0), Some(&a));
        assert_eq!(map.color(1), Some(Color::WHITE));
        assert_eq!(map.shape(2), None);
        assert_eq!(map.outline_shape(0), Some(&b));
        assert_eq!(map.header(), "Riding results");
    }

    #[test]
    fn test_first_pass_does_not_block() {
        let mut map = view();
        map.set_shapes(vec![(Shape::rect(0.0, 0.0, 10.0, 10.0), Color::BLACK)]);
        let mut surface = RecordingSurface::new();
        let stats = map.paint(&mut surface);
        assert_eq!(stats.visible, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.drawn, 0);
        assert!(surface.fills().next().is_none());
        assert!(map.wait_idle(Duration::from_secs(5)));
        assert!(map.needs_repaint());
    }

    #[test]
    fn test_degenerate_focus_still_draws_border() {
        let mut map = view();
        map.set_shapes(vec![(Shape::rect(0.0, 0.0, 10.0, 10.0), Color::BLACK)]);
        map.set_focus(Some(Box2D::new(point(0.0, 0.0), point(0.0, 5.0))));
        map.set_border_color(Some(Color::BLACK));
        let mut surface = RecordingSurface::new();
        let stats = map.paint(&mut surface);
        assert!(stats.skipped);
        assert_eq!(surface.calls().len(), 1);
        assert_eq!(surface.strokes().count(), 1);
        assert!(map.caches().transform.is_empty());
    }

    #[test]
    fn test_failed_member_is_drawn_through_fallback() {
        let mut map = unit_view();
        let a = Shape::rect(10.0, 10.0, 20.0, 20.0);
        let b = Shape::rect(30.0, 10.0, 40.0, 20.0);
        let c = Shape::rect(50.0, 10.0, 60.0, 20.0);
        let d = Shape::rect(10.0, 60.0, 30.0, 80.0);
        let e = Shape::rect(20.0, 70.0, 40.0, 90.0);
        map.set_shapes(vec![
            (a.clone(), RED),
            (b.clone(), RED),
            (c.clone(), RED),
            (d, BLUE),
            (e, BLUE),
        ]);

        let _ = map
            .caches()
            .transform
            .memo()
            .resolve(b.id(), map.pool(), || panic!("simplify failed"));
        assert!(map.wait_idle(WAIT));

        let mut surface = RecordingSurface::new();
        let stats = settle(&mut map, &mut surface);
        assert_eq!(stats.visible, 5);
        assert_eq!(stats.fallback_groups, 1);
        assert_eq!(stats.merged_groups, 1);
        assert_eq!(stats.drawn, 4);

        // The two healthy red members are filled on their own.
        let red: Vec<&DrawCall> = surface.fills().filter(|call| call.color() == RED).collect();
        assert_eq!(red.len(), 2);
        assert_eq!(surface.fills().filter(|call| call.color() == BLUE).count(), 1);
        assert!(map
            .caches()
            .transform
            .peek(b.id())
            .is_some_and(|r| r.is_failed()));
        assert!(map.caches().transform.peek(a.id()).is_some_and(|r| r.is_ready()));
        assert!(map.caches().transform.peek(c.id()).is_some_and(|r| r.is_ready()));

        // The failed entry is not retried and asks for no further passes.
        let scheduled = map.caches().transform.scheduled_count();
        surface.clear();
        assert!(map.paint(&mut surface).is_complete());
        assert_eq!(map.caches().transform.scheduled_count(), scheduled);
        assert!(!map.needs_repaint());
    }

    #[test]
    fn test_failed_merge_draws_members() {
        let mut map = unit_view();
        let a = Shape::rect(10.0, 10.0, 30.0, 30.0);
        let b = Shape::rect(20.0, 20.0, 40.0, 40.0);
        map.set_shapes(vec![(a.clone(), RED), (b.clone(), RED)]);

        let key = MergeKey::new([a.id(), b.id()]);
        let _ = map
            .caches()
            .merge
            .memo()
            .resolve(key.clone(), map.pool(), || panic!("union failed"));
        assert!(map.wait_idle(WAIT));

        let mut surface = RecordingSurface::new();
        let stats = settle(&mut map, &mut surface);
        assert_eq!(stats.merged_groups, 0);
        assert_eq!(stats.fallback_groups, 1);
        assert_eq!(stats.drawn, 2);
        assert_eq!(surface.fills().count(), 2);
        assert!(map.caches().merge.peek(&key).is_some_and(|r| r.is_failed()));
        assert_eq!(map.caches().merge.scheduled_count(), 1);
    }

    #[test]
    fn test_result_landing_after_focus_change_is_discarded() {
        let mut map = unit_view();
        let shape = Shape::rect(0.0, 0.0, 10.0, 10.0);
        map.set_shapes(vec![(shape.clone(), Color::BLACK)]);
        let old_view = map.view_transform().unwrap();

        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let job_shape = shape.clone();
        let _ = map
            .caches()
            .transform
            .memo()
            .resolve(shape.id(), map.pool(), move || {
                let _ = started_tx.send(());
                let _ = release_rx.recv();
                Arc::new(simplify(&job_shape, &old_view, Tolerances::default()))
            });
        started_rx.recv().unwrap();

        // The job is running under the old transform when the focus moves.
        map.set_focus(Some(Box2D::new(point(0.0, 0.0), point(50.0, 50.0))));
        release_tx.send(()).unwrap();
        assert!(map.wait_idle(WAIT));
        assert!(map.caches().transform.peek(shape.id()).is_none());
        assert!(!map.needs_repaint());

        let mut surface = RecordingSurface::new();
        settle(&mut map, &mut surface);
        let path = map
            .caches()
            .transform
            .peek(shape.id())
            .and_then(|r| r.ready())
            .unwrap();
        assert_eq!(
            path.bounds(),
            Some(Box2D::new(point(0.0, 0.0), point(20.0, 20.0)))
        );
    }
}
