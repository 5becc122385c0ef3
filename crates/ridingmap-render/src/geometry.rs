//! Shape geometry: identity-keyed vector paths and box helpers.
//!
//! A [`Shape`] is a cheap handle to an immutable `lyon` path. Every shape
//! built through a constructor gets a fresh [`ShapeId`]; clones share it.
//! The caches key on that id, so two geometrically identical shapes are
//! still cached separately.

use lyon::math::{point, Box2D, Point};
use lyon::path::{Event, Path};
use ridingmap_core::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::viewport::Bounds;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a logical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// A single path command in shape space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo([f32; 2]),
    LineTo([f32; 2]),
    QuadTo([f32; 2], [f32; 2]),
    CubicTo([f32; 2], [f32; 2], [f32; 2]),
    Close,
}

impl PathCommand {
    fn is_finite(&self) -> bool {
        let finite = |p: &[f32; 2]| p[0].is_finite() && p[1].is_finite();
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => finite(p),
            PathCommand::QuadTo(c, p) => finite(c) && finite(p),
            PathCommand::CubicTo(c1, c2, p) => finite(c1) && finite(c2) && finite(p),
            PathCommand::Close => true,
        }
    }
}

struct ShapeData {
    id: ShapeId,
    path: Path,
    bounds: Option<Box2D>,
    point_count: usize,
}

/// Vector geometry for one region, compared by identity.
#[derive(Clone)]
pub struct Shape {
    inner: Arc<ShapeData>,
}

impl Shape {
    /// Wrap an existing `lyon` path as a new logical shape.
    pub fn from_path(path: Path) -> Self {
        let mut bounds = Bounds::new();
        for event in path.iter() {
            for p in event_points(&event) {
                bounds.update(p.x, p.y);
            }
        }
        let point_count = point_count(&path);
        Self {
            inner: Arc::new(ShapeData {
                id: ShapeId::next(),
                path,
                bounds: bounds.to_box(),
                point_count,
            }),
        }
    }

    /// Build a shape from a command list.
    ///
    /// Drawing commands must follow a `MoveTo` (or a `Close`, which makes the
    /// next drawing command start at the closed subpath's first point).
    pub fn from_commands(commands: &[PathCommand]) -> Result<Self, GeometryError> {
        let mut builder = Path::builder();
        let mut open = false;
        let mut subpath_start: Option<Point> = None;

        for (index, command) in commands.iter().enumerate() {
            if !command.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { index });
            }

            match command {
                PathCommand::MoveTo(p) => {
                    if open {
                        builder.end(false);
                    }
                    let at = to_point(p);
                    builder.begin(at);
                    subpath_start = Some(at);
                    open = true;
                }
                PathCommand::Close => {
                    if open {
                        builder.end(true);
                        open = false;
                    } else if subpath_start.is_none() {
                        return Err(GeometryError::MissingMoveTo { index });
                    }
                }
                PathCommand::LineTo(p) => {
                    reopen(&mut builder, &mut open, subpath_start, index)?;
                    builder.line_to(to_point(p));
                }
                PathCommand::QuadTo(c, p) => {
                    reopen(&mut builder, &mut open, subpath_start, index)?;
                    builder.quadratic_bezier_to(to_point(c), to_point(p));
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    reopen(&mut builder, &mut open, subpath_start, index)?;
                    builder.cubic_bezier_to(to_point(c1), to_point(c2), to_point(p));
                }
            }
        }

        if open {
            builder.end(false);
        }
        Ok(Self::from_path(builder.build()))
    }

    /// Axis-aligned closed rectangle.
    pub fn rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        let mut builder = Path::builder();
        builder.begin(point(min_x, min_y));
        builder.line_to(point(max_x, min_y));
        builder.line_to(point(max_x, max_y));
        builder.line_to(point(min_x, max_y));
        builder.end(true);
        Self::from_path(builder.build())
    }

    /// Closed polygon through the given points.
    pub fn polygon(points: &[[f32; 2]]) -> Self {
        let mut builder = Path::builder();
        if let Some((first, rest)) = points.split_first() {
            builder.begin(to_point(first));
            for p in rest {
                builder.line_to(to_point(p));
            }
            builder.end(true);
        }
        Self::from_path(builder.build())
    }

    pub fn id(&self) -> ShapeId {
        self.inner.id
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Bounding box including control points; `None` for an empty path.
    pub fn bounds(&self) -> Option<Box2D> {
        self.inner.bounds
    }

    pub fn point_count(&self) -> usize {
        self.inner.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bounds.is_none()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("id", &self.inner.id)
            .field("points", &self.inner.point_count)
            .field("bounds", &self.inner.bounds)
            .finish()
    }
}

/// Start a new subpath at `start` if the previous one was closed.
fn reopen(
    builder: &mut lyon::path::path::Builder,
    open: &mut bool,
    start: Option<Point>,
    index: usize,
) -> Result<(), GeometryError> {
    if !*open {
        let at = start.ok_or(GeometryError::MissingMoveTo { index })?;
        builder.begin(at);
        *open = true;
    }
    Ok(())
}

fn to_point(p: &[f32; 2]) -> Point {
    point(p[0], p[1])
}

/// End point plus control points carried by a path event.
pub(crate) fn event_points(event: &lyon::path::PathEvent) -> Vec<Point> {
    match *event {
        Event::Begin { at } => vec![at],
        Event::Line { to, .. } => vec![to],
        Event::Quadratic { ctrl, to, .. } => vec![ctrl, to],
        Event::Cubic {
            ctrl1, ctrl2, to, ..
        } => vec![ctrl1, ctrl2, to],
        Event::End { .. } => Vec::new(),
    }
}

/// Number of points (end and control) stored in a path.
pub fn point_count(path: &Path) -> usize {
    path.iter()
        .map(|event| match event {
            Event::Begin { .. } | Event::Line { .. } => 1,
            Event::Quadratic { .. } => 2,
            Event::Cubic { .. } => 3,
            Event::End { .. } => 0,
        })
        .sum()
}

/// Box intersection test that counts touching edges as intersecting.
pub fn boxes_touch(a: &Box2D, b: &Box2D) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y
}

/// Inclusive point-in-box test.
pub fn box_contains(b: &Box2D, p: Point) -> bool {
    p.x >= b.min.x && p.x <= b.max.x && p.y >= b.min.y && p.y <= b.max.y
}

/// Area of a box, zero for degenerate boxes.
pub fn box_area(b: &Box2D) -> f32 {
    (b.max.x - b.min.x).max(0.0) * (b.max.y - b.min.y).max(0.0)
}
