//! View transform and visibility helpers for 2D map rendering.
//!
//! Maps a focus rectangle in shape space onto a device viewport with a
//! uniform scale, and culls shapes that cannot touch the viewport.

use lyon::math::{point, vector, Box2D, Point, Transform};

use crate::geometry::{box_contains, boxes_touch, Shape};

/// Bounding box accumulator used while walking shape geometry.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_x: f32::MAX,
            max_x: f32::MIN,
            min_y: f32::MAX,
            max_y: f32::MIN,
        }
    }

    pub fn update(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn include(&mut self, b: &Box2D) {
        self.update(b.min.x, b.min.y);
        self.update(b.max.x, b.max.y);
    }

    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// The accumulated box, or `None` if nothing was added.
    pub fn to_box(&self) -> Option<Box2D> {
        self.is_valid().then(|| {
            Box2D::new(
                point(self.min_x, self.min_y),
                point(self.max_x, self.max_y),
            )
        })
    }
}

/// The explicit focus box, or the union of all shape bounds when absent.
///
/// Returns `None` when there is no focus and no non-empty shape.
pub fn focus_bounds<'a, I>(shapes: I, focus: Option<Box2D>) -> Option<Box2D>
where
    I: IntoIterator<Item = &'a Shape>,
{
    if focus.is_some() {
        return focus;
    }
    let mut bounds = Bounds::new();
    for b in shapes.into_iter().filter_map(Shape::bounds) {
        bounds.include(&b);
    }
    bounds.to_box()
}

/// Affine map from shape space to device space for one paint pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    transform: Transform,
    inverse: Option<Transform>,
    viewport: Box2D,
    scale: f32,
}

impl ViewTransform {
    /// Fit `focus` into a `width` x `height` viewport, keeping aspect ratio
    /// and centering the scaled box.
    ///
    /// Returns `None` for a degenerate focus box or a viewport no larger
    /// than the margin.
    pub fn fit(focus: &Box2D, width: u32, height: u32, margin: f32) -> Option<Self> {
        let box_width = focus.max.x - focus.min.x;
        let box_height = focus.max.y - focus.min.y;
        if !(box_width.is_finite() && box_height.is_finite()) {
            return None;
        }
        if box_width <= 0.0 || box_height <= 0.0 {
            return None;
        }

        let (w, h) = (width as f32, height as f32);
        let scale = ((w - margin) / box_width).min((h - margin) / box_height);
        if !(scale.is_finite() && scale > 0.0) {
            return None;
        }

        let center = focus.center();
        let transform = Transform::translation(-center.x, -center.y)
            .then_scale(scale, scale)
            .then_translate(vector(w / 2.0, h / 2.0));

        Some(Self {
            transform,
            inverse: transform.inverse(),
            viewport: Box2D::new(point(0.0, 0.0), point(w, h)),
            scale,
        })
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn inverse(&self) -> Option<&Transform> {
        self.inverse.as_ref()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Device rectangle `(0,0)-(width,height)`.
    pub fn viewport(&self) -> &Box2D {
        &self.viewport
    }

    pub fn to_device(&self, p: Point) -> Point {
        self.transform.transform_point(p)
    }

    pub fn is_on_screen(&self, device: Point) -> bool {
        box_contains(&self.viewport, device)
    }

    /// The viewport mapped back into shape space.
    pub fn visible_region(&self) -> Option<Box2D> {
        self.inverse
            .map(|inverse| inverse.outer_transformed_box(&self.viewport))
    }
}

/// Per-pass culling of shapes whose bounds miss the viewport.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter {
    region: Option<Box2D>,
}

impl VisibilityFilter {
    /// Computes the inverse-mapped viewport once for the whole pass.
    pub fn new(view: &ViewTransform) -> Self {
        Self {
            region: view.visible_region(),
        }
    }

    /// A filter for which nothing is visible.
    pub fn nothing_visible() -> Self {
        Self { region: None }
    }

    pub fn region(&self) -> Option<&Box2D> {
        self.region.as_ref()
    }

    pub fn is_visible(&self, shape: &Shape) -> bool {
        match (self.region.as_ref(), shape.bounds()) {
            (Some(region), Some(bounds)) => boxes_touch(region, &bounds),
            _ => false,
        }
    }
}
