//! Leaf enumeration and cell geometry queries.

use glam::IVec2;
use serde::Serialize;

use super::AdaptiveMesh;
use crate::types::{CellId, Quadrant};

/// Axis-aligned pixel extent of a leaf cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRect {
    pub min: IVec2,
    pub max: IVec2,
    pub tier: u32,
}

impl CellRect {
    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}

impl AdaptiveMesh {
    /// Every cell without children.
    ///
    /// Tier-0 cells are visited in creation order and each subtree depth
    /// first, children in bl, br, tl, tr order.
    pub fn leaf_cells(&self) -> Vec<CellId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<CellId> = (0..self.top_tier_cells as u32).rev().map(CellId).collect();

        while let Some(id) = stack.pop() {
            match self.cells[id.index()].children {
                Some(children) => stack.extend(children.iter().rev()),
                None => leaves.push(id),
            }
        }

        leaves
    }

    /// Corner positions of a cell, anticlockwise from bottom-left:
    /// bl, br, tr, tl.
    pub fn cell_coordinates(&self, id: CellId) -> Option<[IVec2; 4]> {
        let cell = self.cell(id)?;
        let at = |q: Quadrant| self.points[cell.corner(q).index()].position;
        Some([
            at(Quadrant::BottomLeft),
            at(Quadrant::BottomRight),
            at(Quadrant::TopRight),
            at(Quadrant::TopLeft),
        ])
    }

    /// Pixel extent of a cell
    pub fn cell_rect(&self, id: CellId) -> Option<CellRect> {
        let cell = self.cell(id)?;
        let min = self.points[cell.corner(Quadrant::BottomLeft).index()].position;
        let max = self.points[cell.corner(Quadrant::TopRight).index()].position;
        Some(CellRect {
            min,
            max,
            tier: cell.tier,
        })
    }

    /// Extents of every leaf, in [`Self::leaf_cells`] order
    pub fn leaf_rectangles(&self) -> Vec<CellRect> {
        self.leaf_cells()
            .into_iter()
            .filter_map(|id| self.cell_rect(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_order_is_depth_first() {
        let mut mesh = AdaptiveMesh::new(17, 9, 8, 15).unwrap();
        assert_eq!(mesh.leaf_cells(), vec![CellId(0), CellId(1)]);

        let result = mesh.split(CellId(0)).unwrap();
        let mut expected = result.children.to_vec();
        expected.push(CellId(1));
        assert_eq!(mesh.leaf_cells(), expected);
    }

    #[test]
    fn test_cell_coordinates_anticlockwise() {
        let mesh = AdaptiveMesh::new(17, 9, 8, 15).unwrap();
        let coords = mesh.cell_coordinates(CellId(1)).unwrap();
        assert_eq!(
            coords,
            [
                IVec2::new(8, 0),
                IVec2::new(16, 0),
                IVec2::new(16, 8),
                IVec2::new(8, 8)
            ]
        );
        assert!(mesh.cell_coordinates(CellId(9)).is_none());
    }

    #[test]
    fn test_leaf_rectangles_cover_domain() {
        let mut mesh = AdaptiveMesh::new(33, 33, 16, 15).unwrap();
        mesh.split(CellId(0)).unwrap();
        mesh.split(CellId(3)).unwrap();

        let rects = mesh.leaf_rectangles();
        assert_eq!(rects.len(), 10);
        let area: i32 = rects.iter().map(|r| r.width() * r.height()).sum();
        assert_eq!(area, 32 * 32);
        assert!(rects.iter().all(|r| r.width() == r.height()));
        assert_eq!(rects.iter().filter(|r| r.tier == 1).count(), 8);
    }

    #[test]
    fn test_leaf_rectangles_serialize() {
        let mesh = AdaptiveMesh::new(9, 9, 8, 15).unwrap();
        let json = serde_json::to_value(mesh.leaf_rectangles()).unwrap();
        assert_eq!(json[0]["tier"], 0);
        assert_eq!(json[0]["max"], serde_json::json!([8, 8]));
    }
}
