//! Error handling for RidingMap
//!
//! Provides error types for each layer of the renderer:
//! - Geometry errors (malformed shape input)
//! - Render errors (worker pool, drawing surfaces, export)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a shape is built from a command sequence that does not
/// describe a valid path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A drawing command appeared before any move command
    #[error("Path command {index} draws before any move_to")]
    MissingMoveTo {
        /// Position of the offending command.
        index: usize,
    },

    /// A coordinate was NaN or infinite
    #[error("Path command {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending command.
        index: usize,
    },
}

/// Render error type
///
/// Represents failures of the rendering infrastructure itself, as opposed
/// to per-shape computation failures, which are isolated inside the caches.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// The worker pool could not be started
    #[error("Worker pool error: {reason}")]
    WorkerPool {
        /// The reason the pool failed to start.
        reason: String,
    },

    /// A drawing surface could not be allocated
    #[error("Cannot allocate a {width}x{height} drawing surface")]
    Surface {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The rendered image could not be written
    #[error("Export failed: {reason}")]
    Export {
        /// The reason the export failed.
        reason: String,
    },
}

/// Main error type for RidingMap
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a configuration error from a string message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a render error
    pub fn is_render_error(&self) -> bool {
        matches!(self, Error::Render(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_converts() {
        let err: Error = GeometryError::MissingMoveTo { index: 3 }.into();
        assert!(err.is_geometry_error());
        assert!(!err.is_render_error());
        assert_eq!(err.to_string(), "Path command 3 draws before any move_to");
    }

    #[test]
    fn test_render_error_message() {
        let err: Error = RenderError::Surface {
            width: 0,
            height: 10,
        }
        .into();
        assert!(err.is_render_error());
        assert_eq!(err.to_string(), "Cannot allocate a 0x10 drawing surface");
    }
}
