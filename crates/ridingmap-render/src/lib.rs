//! # RidingMap Render
//!
//! Incremental geometry rendering for election maps. Shapes are fitted to a
//! viewport, simplified once per view transform, merged per color, and
//! painted progressively while the work runs on a background pool.
//!
//! ## Modules
//!
//! - [`geometry`]: identity-keyed shapes and path commands
//! - [`viewport`]: focus fitting and visibility culling
//! - [`simplify`]: adaptive device-space path simplification
//! - [`pool`]: worker pool and repaint channel
//! - [`cache`]: async memo, transform cache, merge cache
//! - [`invalidation`]: cache clearing on input changes
//! - [`surface`]: drawing surfaces (tiny-skia raster, recording)
//! - [`inputs`]: latest-value input bindings
//! - [`map_view`]: the progressive painter

pub mod cache;
pub mod geometry;
pub mod inputs;
pub mod invalidation;
pub mod map_view;
pub mod pool;
pub mod simplify;
pub mod surface;
pub mod viewport;

pub use cache::{
    merge_order, merge_regions, AsyncMemo, MemoStats, MergeCache, MergeKey, MergedRegion,
    RenderCaches, Resolution, TransformCache,
};
pub use geometry::{PathCommand, Shape, ShapeId};
pub use inputs::{map_bindings, MapInputs, MapPublishers};
pub use invalidation::{InvalidationController, InvalidationReason};
pub use map_view::{MapView, PaintStats};
pub use pool::{repaint_channel, CacheKind, RepaintRequest, WorkerPool};
pub use simplify::{simplify, simplify_path, SimplifiedPath, Tolerances};
pub use surface::{DrawCall, DrawSurface, PixmapSurface, RecordingSurface};
pub use viewport::{focus_bounds, Bounds, ViewTransform, VisibilityFilter};

pub use lyon::math::{point, Box2D, Point};
pub use lyon::path::Path;
