//! Spatial partition (collision map)
//!
//! A uniform grid bucketing bodies by the cell their origin falls in, so
//! proximity queries cost O(neighbors) instead of O(n²). Bodies outside the
//! configured bounds go to a dedicated overflow list that is included in any
//! query touching an edge cell: no pair is ever missed near the grid
//! boundary, at the cost of the overflow list degrading to a linear scan
//! when populated.

use std::collections::HashMap;

use glam::Vec3;
use tracing::debug;

use super::world::BodyHandle;

/// Where the map currently files a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellSlot {
    Cell(i32, i32, i32),
    OutOfBounds,
}

/// Uniform-grid spatial index over body origins.
///
/// Cells are addressed by `floor((coordinate - center) / cell_size) +
/// half_extent` per axis; indices outside `[0, 2 * half_extent)` fall into
/// the overflow list. Sparse storage: only occupied cells hold a bucket.
#[derive(Debug)]
pub struct CollisionMap {
    /// Edge length of one cell
    cell_size: f32,
    /// Half the grid extent, in cells per axis
    half_extent: i32,
    /// World-space center of the grid
    center: Vec3,
    /// Occupied buckets indexed by discretized cell
    cells: HashMap<(i32, i32, i32), Vec<BodyHandle>>,
    /// Bodies whose origin falls outside the grid bounds
    out_of_bounds: Vec<BodyHandle>,
    /// Handle → current slot, for idempotent moves and O(1) removal lookup
    slots: HashMap<BodyHandle, CellSlot>,
}

impl CollisionMap {
    /// Creates an empty map covering `2 * half_extent` cells per axis
    /// around `center`.
    pub fn new(cell_size: f32, half_extent: u32, center: Vec3) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            half_extent: half_extent as i32,
            center,
            cells: HashMap::new(),
            out_of_bounds: Vec::new(),
            slots: HashMap::new(),
        }
    }

    fn grid_size(&self) -> i32 {
        self.half_extent * 2
    }

    fn axis_index(&self, coordinate: f32, center: f32) -> i32 {
        ((coordinate - center) / self.cell_size).floor() as i32 + self.half_extent
    }

    fn cell_index(&self, position: Vec3) -> (i32, i32, i32) {
        (
            self.axis_index(position.x, self.center.x),
            self.axis_index(position.y, self.center.y),
            self.axis_index(position.z, self.center.z),
        )
    }

    fn in_bounds(&self, (x, y, z): (i32, i32, i32)) -> bool {
        let size = self.grid_size();
        (0..size).contains(&x) && (0..size).contains(&y) && (0..size).contains(&z)
    }

    /// Number of tracked bodies.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Files `handle` under the cell containing `position`.
    ///
    /// Re-inserting an already-tracked handle first removes it from its
    /// previous bucket, so this doubles as the per-step "body moved" update.
    pub fn insert(&mut self, handle: BodyHandle, position: Vec3) {
        self.remove(handle);

        let index = self.cell_index(position);
        if self.in_bounds(index) {
            self.cells.entry(index).or_default().push(handle);
            self.slots.insert(handle, CellSlot::Cell(index.0, index.1, index.2));
        } else {
            debug!(?handle, ?position, "body outside grid bounds, tracked in overflow list");
            self.out_of_bounds.push(handle);
            self.slots.insert(handle, CellSlot::OutOfBounds);
        }
    }

    /// Removes `handle` from its bucket and the slot cache. No-op when the
    /// handle is not tracked.
    pub fn remove(&mut self, handle: BodyHandle) {
        let Some(slot) = self.slots.remove(&handle) else {
            return;
        };
        match slot {
            CellSlot::Cell(x, y, z) => {
                if let Some(bucket) = self.cells.get_mut(&(x, y, z)) {
                    bucket.retain(|h| *h != handle);
                    if bucket.is_empty() {
                        self.cells.remove(&(x, y, z));
                    }
                }
            }
            CellSlot::OutOfBounds => {
                self.out_of_bounds.retain(|h| *h != handle);
            }
        }
    }

    /// Collects into `out` every body filed within `position ± max(radius,
    /// cell_size)`, clamped to the grid, plus the overflow list whenever the
    /// query range touches or exceeds a boundary.
    ///
    /// The result is a superset of the bodies within `radius` (cell
    /// granularity over-includes; the broad phase filters). `out` is cleared
    /// first.
    pub fn query(&self, position: Vec3, radius: f32, out: &mut Vec<BodyHandle>) {
        out.clear();

        let range = radius.max(self.cell_size);
        let lo = self.cell_index(position - Vec3::splat(range));
        let hi = self.cell_index(position + Vec3::splat(range));

        let edge = self.grid_size() - 1;
        let touches_boundary = lo.0 <= 0
            || lo.1 <= 0
            || lo.2 <= 0
            || hi.0 >= edge
            || hi.1 >= edge
            || hi.2 >= edge;

        let clamp = |v: i32| v.clamp(0, edge);
        for x in clamp(lo.0)..=clamp(hi.0) {
            for y in clamp(lo.1)..=clamp(hi.1) {
                for z in clamp(lo.2)..=clamp(hi.2) {
                    if let Some(bucket) = self.cells.get(&(x, y, z)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }

        if touches_boundary {
            out.extend_from_slice(&self.out_of_bounds);
        }
    }

    /// Drops every tracked body.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.out_of_bounds.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: usize) -> BodyHandle {
        BodyHandle::from_raw(n)
    }

    fn small_map() -> CollisionMap {
        // 8x8x8 cells of 1m centered on the origin: bounds [-4, 4)
        CollisionMap::new(1.0, 4, Vec3::ZERO)
    }

    #[test]
    fn test_query_finds_nearby_body() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(1.2, 0.0, 0.0));

        let mut out = Vec::new();
        map.query(Vec3::new(1.0, 0.0, 0.0), 1.0, &mut out);
        assert!(out.contains(&handle(0)));
    }

    #[test]
    fn test_query_skips_far_body() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(3.5, 3.5, 3.5));

        let mut out = Vec::new();
        map.query(Vec3::new(-3.0, -3.0, -3.0), 1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_out_of_bounds_body_goes_to_overflow() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(map.len(), 1);

        // A boundary-touching query includes the overflow list
        let mut out = Vec::new();
        map.query(Vec3::new(3.9, 0.0, 0.0), 2.0, &mut out);
        assert!(out.contains(&handle(0)));
    }

    #[test]
    fn test_interior_query_excludes_overflow() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(100.0, 0.0, 0.0));

        let mut out = Vec::new();
        map.query(Vec3::ZERO, 1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_reinsert_moves_body() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(-3.0, 0.0, 0.0));
        map.insert(handle(0), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(map.len(), 1);

        let mut out = Vec::new();
        map.query(Vec3::new(-3.0, 0.0, 0.0), 0.5, &mut out);
        assert!(!out.contains(&handle(0)), "stale bucket entry after move");

        map.query(Vec3::new(3.0, 0.0, 0.0), 0.5, &mut out);
        assert!(out.contains(&handle(0)));
    }

    #[test]
    fn test_remove_clears_membership() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::ZERO);
        map.remove(handle(0));
        assert!(map.is_empty());

        let mut out = Vec::new();
        map.query(Vec3::ZERO, 2.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_remove_untracked_is_noop() {
        let mut map = small_map();
        map.remove(handle(7));
        assert!(map.is_empty());
    }

    #[test]
    fn test_overflow_move_back_in_bounds() {
        let mut map = small_map();
        map.insert(handle(0), Vec3::new(100.0, 0.0, 0.0));
        map.insert(handle(0), Vec3::ZERO);

        let mut out = Vec::new();
        // Edge query would include overflow; the body must not be duplicated
        map.query(Vec3::new(3.9, 3.9, 3.9), 8.0, &mut out);
        let count = out.iter().filter(|h| **h == handle(0)).count();
        assert_eq!(count, 1);
    }
}
