//! Distance-based path simplification in device space.
//!
//! Each source point is mapped through the view transform and dropped when it
//! lies closer than the tolerance to the last retained point. Off-screen
//! segments use a much coarser tolerance than visible ones.

use lyon::math::{Box2D, Point};
use lyon::path::{Event, Path};
use ridingmap_settings::RenderSettings;

use crate::geometry::{point_count, Shape, ShapeId};
use crate::viewport::{Bounds, ViewTransform};

/// Distance thresholds in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Used when either the retained or the candidate point is on screen.
    pub visible: f32,
    /// Used when both points are off screen.
    pub offscreen: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            visible: 0.5,
            offscreen: 10.0,
        }
    }
}

impl From<&RenderSettings> for Tolerances {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            visible: settings.visible_tolerance,
            offscreen: settings.offscreen_tolerance,
        }
    }
}

impl Tolerances {
    fn between(&self, view: &ViewTransform, from: Point, to: Point) -> f32 {
        if view.is_on_screen(from) || view.is_on_screen(to) {
            self.visible
        } else {
            self.offscreen
        }
    }
}

/// A shape's path after transformation and simplification.
#[derive(Debug, Clone)]
pub struct SimplifiedPath {
    source: ShapeId,
    path: Path,
    bounds: Option<Box2D>,
    point_count: usize,
}

impl SimplifiedPath {
    pub fn source(&self) -> ShapeId {
        self.source
    }

    /// Device-space path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device-space bounds, `None` for an empty path.
    pub fn bounds(&self) -> Option<Box2D> {
        self.bounds
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// Transform and simplify one shape.
pub fn simplify(shape: &Shape, view: &ViewTransform, tolerances: Tolerances) -> SimplifiedPath {
    let path = simplify_path(shape.path(), view, tolerances);

    let mut bounds = Bounds::new();
    for event in path.iter() {
        for p in crate::geometry::event_points(&event) {
            bounds.update(p.x, p.y);
        }
    }

    SimplifiedPath {
        source: shape.id(),
        point_count: point_count(&path),
        bounds: bounds.to_box(),
        path,
    }
}

/// Transform `path` to device space and drop points closer than the
/// applicable tolerance to the last retained point.
///
/// Curves are judged by their end point and dropped whole. The last point of
/// every subpath is always kept, so subpath endpoints survive and the output
/// never has more points than the input.
pub fn simplify_path(path: &Path, view: &ViewTransform, tolerances: Tolerances) -> Path {
    let mut builder = Path::builder();
    // Last retained point of the open subpath.
    let mut last = None;
    // Most recent dropped end point, cleared whenever a point is kept.
    let mut tail: Option<Point> = None;

    for event in path.iter() {
        match event {
            Event::Begin { at } => {
                let at = view.to_device(at);
                builder.begin(at);
                last = Some(at);
                tail = None;
            }
            Event::Line { to, .. } => {
                let to = view.to_device(to);
                if keep(last, to, view, &tolerances) {
                    builder.line_to(to);
                    last = Some(to);
                    tail = None;
                } else {
                    tail = Some(to);
                }
            }
            Event::Quadratic { ctrl, to, .. } => {
                let to = view.to_device(to);
                if keep(last, to, view, &tolerances) {
                    builder.quadratic_bezier_to(view.to_device(ctrl), to);
                    last = Some(to);
                    tail = None;
                } else {
                    tail = Some(to);
                }
            }
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                let to = view.to_device(to);
                if keep(last, to, view, &tolerances) {
                    builder.cubic_bezier_to(view.to_device(ctrl1), view.to_device(ctrl2), to);
                    last = Some(to);
                    tail = None;
                } else {
                    tail = Some(to);
                }
            }
            Event::End { close, .. } => {
                if let Some(end) = tail.take() {
                    builder.line_to(end);
                }
                builder.end(close);
                last = None;
            }
        }
    }

    builder.build()
}

fn keep(last: Option<Point>, candidate: Point, view: &ViewTransform, tolerances: &Tolerances) -> bool {
    match last {
        Some(last) => last.distance_to(candidate) >= tolerances.between(view, last, candidate),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathCommand;
    use lyon::math::point;

    /// Identity-scaled 100x100 view.
    fn unit_view() -> ViewTransform {
        let focus = Box2D::new(point(0.0, 0.0), point(100.0, 100.0));
        ViewTransform::fit(&focus, 100, 100, 0.0).unwrap()
    }

    fn polyline(points: &[[f32; 2]]) -> Shape {
        let mut commands = vec![PathCommand::MoveTo(points[0])];
        commands.extend(points[1..].iter().copied().map(PathCommand::LineTo));
        Shape::from_commands(&commands).unwrap()
    }

    fn device_points(path: &Path) -> Vec<Point> {
        path.iter()
            .flat_map(|e| crate::geometry::event_points(&e))
            .collect()
    }

    #[test]
    fn test_visible_points_use_fine_tolerance() {
        let shape = polyline(&[[50.0, 50.0], [50.3, 50.0], [50.9, 50.0], [60.0, 50.0]]);
        let out = simplify(&shape, &unit_view(), Tolerances::default());
        assert_eq!(
            device_points(out.path()),
            vec![point(50.0, 50.0), point(50.9, 50.0), point(60.0, 50.0)]
        );
    }

    #[test]
    fn test_offscreen_points_use_coarse_tolerance() {
        let shape = polyline(&[[-50.0, -50.0], [-45.0, -50.0], [-30.0, -50.0], [-25.0, -50.0]]);
        let out = simplify(&shape, &unit_view(), Tolerances::default());
        assert_eq!(
            device_points(out.path()),
            vec![point(-50.0, -50.0), point(-30.0, -50.0), point(-25.0, -50.0)]
        );
    }

    #[test]
    fn test_pair_straddling_the_edge_is_visible() {
        // 3 units apart: dropped off screen, kept when one end is on screen.
        let straddling = polyline(&[[-2.0, 50.0], [1.0, 50.0], [1.5, 50.0]]);
        let out = simplify(&straddling, &unit_view(), Tolerances::default());
        assert_eq!(out.point_count(), 3);

        let offscreen = polyline(&[[-8.0, 50.0], [-5.0, 50.0], [-4.0, 50.0]]);
        let out = simplify(&offscreen, &unit_view(), Tolerances::default());
        assert_eq!(
            device_points(out.path()),
            vec![point(-8.0, 50.0), point(-4.0, 50.0)]
        );
    }

    #[test]
    fn test_dropped_tail_is_restored() {
        let shape = polyline(&[[10.0, 10.0], [10.1, 10.0], [10.2, 10.0]]);
        let out = simplify(&shape, &unit_view(), Tolerances::default());
        assert_eq!(
            device_points(out.path()),
            vec![point(10.0, 10.0), point(10.2, 10.0)]
        );
    }

    #[test]
    fn test_dropped_curve_is_replaced_by_line_to_its_end() {
        let shape = Shape::from_commands(&[
            PathCommand::MoveTo([10.0, 10.0]),
            PathCommand::QuadTo([30.0, 30.0], [10.2, 10.0]),
            PathCommand::Close,
        ])
        .unwrap();
        let out = simplify(&shape, &unit_view(), Tolerances::default());
        let events: Vec<_> = out.path().iter().collect();
        assert!(matches!(events[1], Event::Line { .. }));
        assert!(matches!(events[2], Event::End { close: true, .. }));
    }

    #[test]
    fn test_output_is_in_device_space() {
        let focus = Box2D::new(point(0.0, 0.0), point(10.0, 10.0));
        let view = ViewTransform::fit(&focus, 100, 100, 0.0).unwrap();
        let out = simplify(&Shape::rect(0.0, 0.0, 10.0, 10.0), &view, Tolerances::default());
        let b = out.bounds().unwrap();
        assert_eq!(b.min, point(0.0, 0.0));
        assert_eq!(b.max, point(100.0, 100.0));
    }

    #[test]
    fn test_tolerances_from_settings() {
        let settings = RenderSettings {
            visible_tolerance: 1.0,
            offscreen_tolerance: 20.0,
            ..RenderSettings::default()
        };
        let tol = Tolerances::from(&settings);
        assert_eq!(tol.visible, 1.0);
        assert_eq!(tol.offscreen, 20.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn subpath() -> impl Strategy<Value = (Vec<(f32, f32)>, bool)> {
            (
                prop::collection::vec((-300.0f32..400.0, -300.0f32..400.0), 1..40),
                any::<bool>(),
            )
        }

        fn build(subpaths: &[(Vec<(f32, f32)>, bool)]) -> Shape {
            let mut commands = Vec::new();
            for (points, closed) in subpaths {
                commands.push(PathCommand::MoveTo([points[0].0, points[0].1]));
                for &(x, y) in &points[1..] {
                    commands.push(PathCommand::LineTo([x, y]));
                }
                if *closed {
                    commands.push(PathCommand::Close);
                }
            }
            Shape::from_commands(&commands).unwrap()
        }

        fn endpoints(path: &Path) -> Vec<(Point, Point)> {
            let mut out = Vec::new();
            let mut first = None;
            let mut last = None;
            for event in path.iter() {
                match event {
                    Event::Begin { at } => {
                        first = Some(at);
                        last = Some(at);
                    }
                    Event::Line { to, .. }
                    | Event::Quadratic { to, .. }
                    | Event::Cubic { to, .. } => last = Some(to),
                    Event::End { .. } => {
                        if let (Some(f), Some(l)) = (first, last) {
                            out.push((f, l));
                        }
                    }
                }
            }
            out
        }

        proptest! {
            #[test]
            fn prop_preserves_subpath_endpoints(
                subpaths in prop::collection::vec(subpath(), 1..5)
            ) {
                let shape = build(&subpaths);
                let view = unit_view();
                let out = simplify(&shape, &view, Tolerances::default());

                let expected: Vec<(Point, Point)> = endpoints(shape.path())
                    .into_iter()
                    .map(|(f, l)| (view.to_device(f), view.to_device(l)))
                    .collect();
                prop_assert_eq!(endpoints(out.path()), expected);
            }

            #[test]
            fn prop_never_adds_points(
                subpaths in prop::collection::vec(subpath(), 1..5)
            ) {
                let shape = build(&subpaths);
                let out = simplify(&shape, &unit_view(), Tolerances::default());
                prop_assert!(out.point_count() <= shape.point_count());
            }
        }
    }
}
