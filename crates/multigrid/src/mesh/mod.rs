//! Adaptive quadtree mesh of sample points.
//!
//! Tier 0 is a regular grid of cells over the image. Splitting a cell
//! replaces it (as a leaf) with four children one tier finer, reusing any
//! edge midpoint a split neighbor has already created. Neighbor links are
//! kept symmetric at every tier, so the leaf cells always tile the meshed
//! domain and no two points ever share a position.
//!
//! # Module Structure
//!
//! - `cell`: [`MeshCell`] quadtree node
//! - `construction`: tier-0 grid and neighbor wiring
//! - `split`: split protocol with neighbor balancing
//! - `topology`: leaf enumeration and geometry queries
//! - `refinement`: tier creation, uniform and objective-driven refinement
//! - `reconstruction`: multi-level interpolation onto a dense field
//! - `validation`: structural invariant checks

mod cell;
mod construction;
mod reconstruction;
mod refinement;
mod split;
mod topology;
mod validation;

pub use cell::MeshCell;
pub use refinement::RefinementStats;
pub use split::SplitResult;
pub use topology::CellRect;

use crate::sample_grid::SampleGrid;
use crate::types::{CellId, MeshError, PointId, PointProperty, SamplePoint};

/// Hierarchical sampling mesh.
///
/// Sole owner of every point, cell and per-tier grid. Points and cells are
/// only ever appended, so their ids stay valid for the mesh's lifetime.
#[derive(Debug, Clone)]
pub struct AdaptiveMesh {
    /// Image width in pixels
    pub(crate) width: u32,
    /// Image height in pixels
    pub(crate) height: u32,
    /// Tier-0 spacing
    pub(crate) spacing: u32,
    /// Window size assigned to tier-0 points
    pub(crate) window_size: u32,
    pub(crate) points: Vec<SamplePoint>,
    pub(crate) cells: Vec<MeshCell>,
    /// One grid per tier, index = tier
    pub(crate) grids: Vec<SampleGrid>,
    pub(crate) max_tier: u32,
    /// Cells [0, top_tier_cells) are the tier-0 roots
    pub(crate) top_tier_cells: usize,
}

impl AdaptiveMesh {
    /// (width, height) of the image
    #[inline]
    pub fn image_dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tier-0 spacing
    #[inline]
    pub fn base_spacing(&self) -> u32 {
        self.spacing
    }

    #[inline]
    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    /// Deepest tier that currently has a grid
    #[inline]
    pub fn max_tier(&self) -> u32 {
        self.max_tier
    }

    /// Number of tiers (max_tier + 1)
    #[inline]
    pub fn tier_count(&self) -> usize {
        self.grids.len()
    }

    /// Spacing of a tier, None if the tier does not exist yet
    pub fn spacing_at(&self, tier: u32) -> Option<u32> {
        self.grids.get(tier as usize).map(SampleGrid::spacing)
    }

    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Number of cells ever created, across all tiers
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn n_top_tier_cells(&self) -> usize {
        self.top_tier_cells
    }

    #[inline]
    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    #[inline]
    pub fn cells(&self) -> &[MeshCell] {
        &self.cells
    }

    #[inline]
    pub fn point(&self, id: PointId) -> Option<&SamplePoint> {
        self.points.get(id.index())
    }

    /// Mutable access for external estimation passes
    #[inline]
    pub fn point_mut(&mut self, id: PointId) -> Option<&mut SamplePoint> {
        self.points.get_mut(id.index())
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&MeshCell> {
        self.cells.get(id.index())
    }

    #[inline]
    pub fn grid(&self, tier: u32) -> Option<&SampleGrid> {
        self.grids.get(tier as usize)
    }

    /// Record the displacement measured at a point
    pub fn set_displacement(&mut self, id: PointId, u: f64, v: f64) -> Result<(), MeshError> {
        let point = self.point_mut(id).ok_or(MeshError::UnknownPoint(id))?;
        point.set_displacement(u, v);
        Ok(())
    }

    /// Fill every point's displacement from a function of its position
    pub fn set_displacements_with(&mut self, mut f: impl FnMut(i32, i32) -> (f64, f64)) {
        for point in &mut self.points {
            let (u, v) = f(point.x(), point.y());
            point.set_displacement(u, v);
        }
    }

    /// One property of every point, in point order
    pub fn point_values(&self, property: PointProperty) -> Vec<f64> {
        self.points.iter().map(|p| property.read(p)).collect()
    }

    /// Id of the point at a pixel position, if one exists
    pub fn point_at(&self, x: i32, y: i32) -> Option<PointId> {
        self.points
            .iter()
            .position(|p| p.x() == x && p.y() == y)
            .map(|i| PointId(i as u32))
    }

    #[inline]
    pub(crate) fn cell_ref(&self, id: CellId) -> Result<&MeshCell, MeshError> {
        self.cells.get(id.index()).ok_or(MeshError::UnknownCell(id))
    }

    #[inline]
    pub(crate) fn push_point(&mut self, point: SamplePoint) -> PointId {
        let id = PointId(self.points.len() as u32);
        self.points.push(point);
        id
    }
}
