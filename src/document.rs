//! Map documents: the JSON input of the headless renderer.

use ridingmap_core::{Color, Error, Result};
use ridingmap_render::{point, Box2D, MapPublishers, PathCommand, Shape};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One colored region in a map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEntry {
    pub color: Color,
    pub path: Vec<PathCommand>,
}

/// Serialized map: regions, optional focus box, outlines and decorations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub shapes: Vec<ShapeEntry>,
    /// `[min_x, min_y, max_x, max_y]`
    #[serde(default)]
    pub focus: Option<[f32; 4]>,
    #[serde(default)]
    pub outline: Vec<Vec<PathCommand>>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub border_color: Option<Color>,
}

impl MapDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::other(format!("Invalid map document: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let document = Self::from_json(&text)?;
        debug!(
            "Loaded map document {} ({} shapes, {} outlines)",
            path.display(),
            document.shapes.len(),
            document.outline.len()
        );
        Ok(document)
    }

    /// Build shapes from the document's path commands.
    pub fn to_scene(&self) -> Result<MapScene> {
        let shapes = self
            .shapes
            .iter()
            .map(|entry| -> Result<(Shape, Color)> {
                Ok((Shape::from_commands(&entry.path)?, entry.color))
            })
            .collect::<Result<Vec<_>>>()?;
        let outline = self
            .outline
            .iter()
            .map(|commands| Shape::from_commands(commands).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        let focus = match self.focus {
            Some([min_x, min_y, max_x, max_y]) => {
                if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
                    return Err(Error::other("Focus box has a non-finite coordinate"));
                }
                Some(Box2D::new(point(min_x, min_y), point(max_x, max_y)))
            }
            None => None,
        };

        Ok(MapScene {
            shapes,
            focus,
            outline,
            header: self.header.clone().unwrap_or_default(),
            border_color: self.border_color,
        })
    }
}

/// A document turned into renderer inputs.
#[derive(Debug, Clone)]
pub struct MapScene {
    pub shapes: Vec<(Shape, Color)>,
    pub focus: Option<Box2D>,
    pub outline: Vec<Shape>,
    pub header: String,
    pub border_color: Option<Color>,
}

impl MapScene {
    /// Publish every input of the scene.
    pub fn publish(&self, publishers: &MapPublishers) {
        publishers.shapes.publish(self.shapes.clone());
        publishers.focus.publish(self.focus);
        publishers.outline.publish(self.outline.clone());
        publishers.header.publish(self.header.clone());
        publishers.border_color.publish(self.border_color);
    }
}
