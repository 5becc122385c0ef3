//! Background-filled caches for the map painter.
//!
//! - [`TransformCache`]: shape id to simplified device-space path
//! - [`MergeCache`]: color group to unioned region
//!
//! Both are built on [`AsyncMemo`] and share one repaint channel.

pub mod memo;
pub mod merge;
pub mod transform;

pub use memo::{AsyncMemo, MemoStats, Resolution};
pub use merge::{merge_order, merge_regions, MergeCache, MergeKey, MergedRegion};
pub use transform::TransformCache;

use std::sync::mpsc::Sender;

use crate::pool::RepaintRequest;

/// The two caches owned by a map view.
pub struct RenderCaches {
    pub transform: TransformCache,
    pub merge: MergeCache,
}

impl RenderCaches {
    pub fn new(repaint: Sender<RepaintRequest>) -> Self {
        Self {
            transform: TransformCache::new(repaint.clone()),
            merge: MergeCache::new(repaint),
        }
    }

    /// Clear both caches. Returns the number of cancelled jobs.
    pub fn clear_all(&self) -> usize {
        self.transform.invalidate() + self.merge.invalidate()
    }

    /// Clear only the merge cache. Returns the number of cancelled jobs.
    pub fn clear_merge(&self) -> usize {
        self.merge.invalidate()
    }
}
