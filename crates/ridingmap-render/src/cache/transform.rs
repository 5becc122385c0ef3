//! Per-shape cache of simplified device-space paths.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::memo::{AsyncMemo, MemoStats, Resolution};
use crate::geometry::{Shape, ShapeId};
use crate::pool::{CacheKind, RepaintRequest, WorkerPool};
use crate::simplify::{simplify, SimplifiedPath, Tolerances};
use crate::viewport::ViewTransform;

/// Shape identity to simplified path, valid for one view transform.
pub struct TransformCache {
    memo: AsyncMemo<ShapeId, Arc<SimplifiedPath>>,
}

impl TransformCache {
    pub fn new(repaint: Sender<RepaintRequest>) -> Self {
        Self {
            memo: AsyncMemo::new(CacheKind::Transform, repaint),
        }
    }

    /// Look up `shape`, scheduling its simplification under `view` on a miss.
    ///
    /// Callers must clear the cache whenever `view` changes.
    pub fn resolve(
        &self,
        shape: &Shape,
        view: &ViewTransform,
        tolerances: Tolerances,
        pool: &WorkerPool,
    ) -> Resolution<Arc<SimplifiedPath>> {
        let job_shape = shape.clone();
        let view = *view;
        self.memo.resolve(shape.id(), pool, move || {
            Arc::new(simplify(&job_shape, &view, tolerances))
        })
    }

    pub fn peek(&self, id: ShapeId) -> Option<Resolution<Arc<SimplifiedPath>>> {
        self.memo.peek(&id)
    }

    pub fn invalidate(&self) -> usize {
        self.memo.clear()
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    pub fn scheduled_count(&self) -> u64 {
        self.memo.scheduled_count()
    }

    pub fn stats(&self) -> MemoStats {
        self.memo.stats()
    }
    #[cfg(test)]
    pub(crate) fn memo(&self) -> &AsyncMemo<ShapeId, Arc<SimplifiedPath>> {
        &self.memo
    }
}
