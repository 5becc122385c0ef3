//! Drawing surfaces the map painter renders onto.

mod pixmap;

pub use pixmap::PixmapSurface;

use lyon::path::Path;
use ridingmap_core::Color;

/// Abstract 2D target. Paths are in device space.
pub trait DrawSurface {
    /// Fill `path` with the even-odd rule.
    fn fill_path(&mut self, path: &Path, color: Color);

    fn stroke_path(&mut self, path: &Path, color: Color, width: f32);
}

/// One recorded draw operation.
#[derive(Debug, Clone)]
pub enum DrawCall {
    Fill { path: Path, color: Color },
    Stroke { path: Path, color: Color, width: f32 },
}

impl DrawCall {
    pub fn color(&self) -> Color {
        match self {
            DrawCall::Fill { color, .. } | DrawCall::Stroke { color, .. } => *color,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DrawCall::Fill { path, .. } | DrawCall::Stroke { path, .. } => path,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, DrawCall::Fill { .. })
    }
}

/// Surface that keeps every call for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn fills(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| c.is_fill())
    }

    pub fn strokes(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| !c.is_fill())
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_path(&mut self, path: &Path, color: Color) {
        self.calls.push(DrawCall::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f32) {
        self.calls.push(DrawCall::Stroke {
            path: path.clone(),
            color,
            width,
        });
    }
}
