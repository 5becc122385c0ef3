//! Per-color merge of simplified shapes into one fillable region.

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use lyon::math::{point, Box2D};
use lyon::path::iterator::*;
use lyon::path::{Event, Path};
use std::cmp::Ordering;
use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::memo::{AsyncMemo, MemoStats, Resolution};
use crate::geometry::{box_area, ShapeId};
use crate::pool::{CacheKind, RepaintRequest, WorkerPool};
use crate::simplify::SimplifiedPath;
use crate::viewport::Bounds;

/// Identity of a color group: its member ids, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey(Vec<ShapeId>);

impl MergeKey {
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ShapeId>,
    {
        let mut ids: Vec<ShapeId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn of(members: &[Arc<SimplifiedPath>]) -> Self {
        Self::new(members.iter().map(|m| m.source()))
    }

    pub fn ids(&self) -> &[ShapeId] {
        &self.0
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group[{}]", self.0.len())
    }
}

/// The union of one color group in device space.
#[derive(Debug, Clone)]
pub struct MergedRegion {
    path: Path,
    bounds: Option<Box2D>,
    draw_order: Vec<ShapeId>,
    area: f64,
}

impl MergedRegion {
    /// Closed outer and hole rings; fill with the even-odd rule.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bounds(&self) -> Option<Box2D> {
        self.bounds
    }

    /// Member ids in the order they were unioned.
    pub fn draw_order(&self) -> &[ShapeId] {
        &self.draw_order
    }

    /// Filled area in square device units.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Members sorted by ascending bounding-box area, ties broken by id.
pub fn merge_order(members: &[Arc<SimplifiedPath>]) -> Vec<Arc<SimplifiedPath>> {
    let area = |m: &SimplifiedPath| m.bounds().map(|b| box_area(&b)).unwrap_or(0.0);
    let mut ordered = members.to_vec();
    ordered.sort_by(|a, b| {
        area(a)
            .partial_cmp(&area(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.source().cmp(&b.source()))
    });
    ordered
}

/// Union `members` smallest first into one region.
pub fn merge_regions(members: &[Arc<SimplifiedPath>], flatten_tolerance: f32) -> MergedRegion {
    let ordered = merge_order(members);

    let mut merged: Option<Sketch<()>> = None;
    for member in &ordered {
        let sketch = member_sketch(member.path(), flatten_tolerance);
        merged = Some(match merged {
            Some(acc) => acc.union(&sketch),
            None => sketch,
        });
    }

    let mut builder = Path::builder();
    let mut bounds = Bounds::new();
    let mut area = 0.0;
    if let Some(sketch) = merged {
        let mp = sketch.to_multipolygon();
        for poly in mp.0 {
            let exterior: Vec<(f64, f64)> = poly.exterior().0.iter().map(|c| (c.x, c.y)).collect();
            area += ring_area(&exterior).abs();
            add_ring(&mut builder, &mut bounds, &exterior);
            for interior in poly.interiors() {
                let hole: Vec<(f64, f64)> = interior.0.iter().map(|c| (c.x, c.y)).collect();
                area -= ring_area(&hole).abs();
                add_ring(&mut builder, &mut bounds, &hole);
            }
        }
    }

    MergedRegion {
        path: builder.build(),
        bounds: bounds.to_box(),
        draw_order: ordered.iter().map(|m| m.source()).collect(),
        area,
    }
}

/// One member as a sketch; its own subpaths combine even-odd.
fn member_sketch(path: &Path, tolerance: f32) -> Sketch<()> {
    let mut polygons: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for event in path.iter().flattened(tolerance) {
        match event {
            Event::Begin { at } => {
                current.clear();
                current.push([at.x as f64, at.y as f64]);
            }
            Event::Line { to, .. } => {
                current.push([to.x as f64, to.y as f64]);
            }
            Event::End { .. } => {
                if current.len() >= 3 {
                    polygons.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    let mut sketch: Option<Sketch<()>> = None;
    for poly in polygons {
        let s = Sketch::polygon(&poly, None);
        sketch = Some(match sketch {
            Some(acc) => acc.xor(&s),
            None => s,
        });
    }
    sketch.unwrap_or_else(Sketch::new)
}

fn add_ring(builder: &mut lyon::path::path::Builder, bounds: &mut Bounds, ring: &[(f64, f64)]) {
    let ring = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if ring.len() < 3 {
        return;
    }

    for (i, &(x, y)) in ring.iter().enumerate() {
        let p = point(x as f32, y as f32);
        bounds.update(p.x, p.y);
        if i == 0 {
            builder.begin(p);
        } else {
            builder.line_to(p);
        }
    }
    builder.end(true);
}

/// Signed shoelace area of a ring.
fn ring_area(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % ring.len()];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// Cache of merged regions keyed by color-group membership.
pub struct MergeCache {
    memo: AsyncMemo<MergeKey, Arc<MergedRegion>>,
}

impl MergeCache {
    pub fn new(repaint: Sender<RepaintRequest>) -> Self {
        Self {
            memo: AsyncMemo::new(CacheKind::Merge, repaint),
        }
    }

    /// Look up the group formed by `members`, scheduling the union on a miss.
    ///
    /// All members must already be resolved under the current transform.
    pub fn resolve(
        &self,
        members: &[Arc<SimplifiedPath>],
        flatten_tolerance: f32,
        pool: &WorkerPool,
    ) -> Resolution<Arc<MergedRegion>> {
        let key = MergeKey::of(members);
        let members = members.to_vec();
        self.memo.resolve(key, pool, move || {
            Arc::new(merge_regions(&members, flatten_tolerance))
        })
    }

    pub fn peek(&self, key: &MergeKey) -> Option<Resolution<Arc<MergedRegion>>> {
        self.memo.peek(key)
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
    pub(crate) fn memo(&self) -> &AsyncMemo<MergeKey, Arc<MergedRegion>> {
        &self.memo
    }
}
