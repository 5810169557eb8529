//! Per-tier lookup of sample points on a regular grid

use field::Raster;

use crate::types::{PointId, SamplePoint};

/// Sample points of one tier laid out at that tier's regular spacing.
///
/// Entry (col, row) holds the point at pixel `(col * spacing, row * spacing)`
/// if the mesh has created one there at this tier. Corner points inherited
/// from coarser tiers are not registered, so finer grids stay sparse.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    spacing: u32,
    entries: Raster<Option<PointId>>,
}

impl SampleGrid {
    /// Empty grid covering a `width x height` image
    pub fn new(width: u32, height: u32, spacing: u32) -> Self {
        let cols = (width as usize).div_ceil(spacing as usize);
        let rows = (height as usize).div_ceil(spacing as usize);
        Self {
            spacing,
            entries: Raster::new(cols, rows, None),
        }
    }

    #[inline]
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.entries.width()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.entries.height()
    }

    /// Point registered at (col, row), None if absent or out of bounds
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<PointId> {
        self.entries.get(col, row).flatten()
    }

    /// Register a point. Out-of-bounds positions are ignored.
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, id: PointId) {
        self.entries.set(col, row, Some(id));
    }

    /// Number of registered entries
    pub fn registered_count(&self) -> usize {
        self.entries.as_slice().iter().filter(|e| e.is_some()).count()
    }

    /// Iterate over `(col, row, id)` for every registered entry
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, PointId)> + '_ {
        let cols = self.cols();
        self.entries
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(move |(i, entry)| entry.map(|id| (i % cols, i / cols, id)))
    }

    /// Dense u and v arrays over the full grid extent. Entries without a
    /// registered point, or whose point has no displacement yet, are NaN.
    pub fn values(&self, points: &[SamplePoint]) -> (Raster<f64>, Raster<f64>) {
        let read = |col: usize, row: usize, pick: fn(&SamplePoint) -> Option<f64>| {
            self.get(col, row)
                .and_then(|id| points.get(id.index()))
                .and_then(pick)
                .unwrap_or(f64::NAN)
        };
        let u = Raster::from_fn(self.cols(), self.rows(), |c, r| read(c, r, |p| p.u));
        let v = Raster::from_fn(self.cols(), self.rows(), |c, r| read(c, r, |p| p.v));
        (u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_grid_extent_rounds_up() {
        let grid = SampleGrid::new(10, 7, 4);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.registered_count(), 0);
    }

    #[test]
    fn test_values_use_nan_for_gaps() {
        let mut points = vec![
            SamplePoint::new(IVec2::new(0, 0), 16),
            SamplePoint::new(IVec2::new(2, 0), 16),
        ];
        points[0].set_displacement(1.0, 2.0);

        let mut grid = SampleGrid::new(4, 4, 2);
        grid.set(0, 0, PointId(0));
        grid.set(1, 0, PointId(1));

        let (u, v) = grid.values(&points);
        assert_eq!(u.dims(), (2, 2));
        assert_eq!(u[(0, 0)], 1.0);
        assert_eq!(v[(0, 0)], 2.0);
        // Registered but not yet measured
        assert!(u[(1, 0)].is_nan());
        // Never registered
        assert!(v[(1, 1)].is_nan());
    }

    #[test]
    fn test_iter_reports_positions() {
        let mut grid = SampleGrid::new(6, 6, 2);
        grid.set(2, 1, PointId(7));
        grid.set(9, 9, PointId(8));
        let entries: Vec<_> = grid.iter().collect();
        assert_eq!(entries, vec![(2, 1, PointId(7))]);
    }
}
