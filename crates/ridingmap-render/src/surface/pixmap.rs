//! Raster surface backed by a tiny-skia pixmap.

use lyon::path::{Event, Path};
use ridingmap_core::{Color, RenderError};
use std::path::Path as FsPath;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::DrawSurface;

/// Anti-aliased RGBA raster target.
pub struct PixmapSurface {
    pixmap: Pixmap,
    anti_alias: bool,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        Ok(Self {
            pixmap,
            anti_alias: true,
        })
    }

    /// Toggle anti-aliasing for subsequent draws.
    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.anti_alias = anti_alias;
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill the whole surface.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    /// Unpremultiplied pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn save_png(&self, path: &FsPath) -> Result<(), RenderError> {
        self.pixmap
            .save_png(path)
            .map_err(|e| RenderError::Export {
                reason: format!("{}: {}", path.display(), e),
            })
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = self.anti_alias;
        paint
    }
}

impl DrawSurface for PixmapSurface {
    fn fill_path(&mut self, path: &Path, color: Color) {
        if let Some(p) = to_skia_path(path) {
            let paint = self.paint(color);
            self.pixmap
                .fill_path(&p, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f32) {
        if let Some(p) = to_skia_path(path) {
            let paint = self.paint(color);
            let stroke = Stroke {
                width,
                ..Default::default()
            };
            self.pixmap
                .stroke_path(&p, &paint, &stroke, Transform::identity(), None);
        }
    }
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("anti_alias", &self.anti_alias)
            .finish()
    }
}

/// `None` for paths tiny-skia cannot represent (empty or degenerate).
fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for event in path.iter() {
        match event {
            Event::Begin { at } => pb.move_to(at.x, at.y),
            Event::Line { to, .. } => pb.line_to(to.x, to.y),
            Event::Quadratic { ctrl, to, .. } => pb.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => pb.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y),
            Event::End { close, .. } => {
                if close {
                    pb.close();
                }
            }
        }
    }
    pb.finish()
}
