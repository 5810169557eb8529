//! Quadtree cell stored in the mesh's cell arena.

use crate::types::{CellId, Direction, PointId, Quadrant};

/// A rectangular region bounded by four sample points.
///
/// All links are ids into the owning [`super::AdaptiveMesh`]. A cell moves
/// from leaf to internal exactly once, when it is split; it never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCell {
    /// Refinement depth (0 = coarsest)
    pub tier: u32,
    /// Bottom-left grid column in this tier's index space
    pub ix: u32,
    /// Bottom-left grid row in this tier's index space
    pub iy: u32,
    /// Corner points, indexed by [`Quadrant`]
    pub(crate) corners: [PointId; 4],
    /// Same-tier neighbors, indexed by [`Direction`]; None at the image
    /// border or while the neighbor does not exist yet
    pub(crate) neighbors: [Option<CellId>; 4],
    pub(crate) parent: Option<CellId>,
    /// Children, indexed by [`Quadrant`]
    pub(crate) children: Option<[CellId; 4]>,
}

impl MeshCell {
    pub(crate) fn new(tier: u32, ix: u32, iy: u32, corners: [PointId; 4], parent: Option<CellId>) -> Self {
        Self {
            tier,
            ix,
            iy,
            corners,
            neighbors: [None; 4],
            parent,
            children: None,
        }
    }

    #[inline]
    pub fn corner(&self, quadrant: Quadrant) -> PointId {
        self.corners[quadrant.index()]
    }

    /// Corner ids in bl, br, tl, tr order
    #[inline]
    pub fn corners(&self) -> [PointId; 4] {
        self.corners
    }

    #[inline]
    pub fn neighbor(&self, direction: Direction) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    #[inline]
    pub(crate) fn set_neighbor(&mut self, direction: Direction, cell: CellId) {
        self.neighbors[direction.index()] = Some(cell);
    }

    #[inline]
    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Option<CellId> {
        self.children.map(|c| c[quadrant.index()])
    }

    /// Children in bl, br, tl, tr order
    #[inline]
    pub fn children(&self) -> Option<[CellId; 4]> {
        self.children
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}
