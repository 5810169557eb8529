//! Validation methods for AdaptiveMesh.
//!
//! Provides structural checks including:
//! - Neighbor symmetry and adjacency
//! - Parent/child consistency
//! - Point uniqueness and tier grid registration
//! - Leaf tiling of the meshed domain

use std::collections::HashMap;

use field::Raster;
use glam::IVec2;

use super::AdaptiveMesh;
use crate::types::{CellId, Direction, MeshError, Quadrant};

impl AdaptiveMesh {
    /// Full structural check, reporting the first violation found.
    ///
    /// Validates that:
    /// 1. Every neighbor link is symmetric, same-tier and geometrically adjacent
    /// 2. Every child points back to its parent one tier finer, in its quadrant
    /// 3. Every cell's corners form a square of its tier's spacing
    /// 4. No two points share a position
    /// 5. Every tier grid entry sits at its grid position
    /// 6. The leaves tile the meshed domain exactly once
    pub fn validate(&self) -> Result<(), MeshError> {
        self.validate_links()?;
        self.validate_geometry()?;
        self.validate_points()?;
        self.validate_tiling()
    }

    /// Check that the leaves cover `[0, (n_cols - 1) * h) x [0, (n_rows - 1) * h)`
    /// exactly once.
    pub fn validate_tiling(&self) -> Result<(), MeshError> {
        let base = &self.grids[0];
        let h = base.spacing() as usize;
        let extent_x = (base.cols() - 1) * h;
        let extent_y = (base.rows() - 1) * h;

        let mut coverage: Raster<u32> = Raster::new(extent_x, extent_y, 0);
        for rect in self.leaf_rectangles() {
            if rect.min.x < 0 || rect.min.y < 0 || rect.max.x as usize > extent_x || rect.max.y as usize > extent_y {
                return Err(MeshError::Topology(format!(
                    "Leaf {:?}..{:?} extends past the meshed domain",
                    rect.min, rect.max
                )));
            }
            for y in rect.min.y as usize..rect.max.y as usize {
                for x in rect.min.x as usize..rect.max.x as usize {
                    coverage[(x, y)] += 1;
                }
            }
        }

        for y in 0..extent_y {
            for x in 0..extent_x {
                let count = coverage[(x, y)];
                if count != 1 {
                    return Err(MeshError::Topology(format!(
                        "Pixel ({x}, {y}) is covered by {count} leaves"
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_links(&self) -> Result<(), MeshError> {
        for (index, cell) in self.cells.iter().enumerate() {
            let id = CellId(index as u32);

            for dir in Direction::ALL {
                let Some(neighbor_id) = cell.neighbor(dir) else {
                    continue;
                };
                let neighbor = self.cell(neighbor_id).ok_or_else(|| {
                    MeshError::Topology(format!("Cell {:?}: {:?} neighbor {:?} doesn't exist", id, dir, neighbor_id))
                })?;
                if neighbor.neighbor(dir.opposite()) != Some(id) {
                    return Err(MeshError::Topology(format!(
                        "Cell {:?}: {:?} neighbor {:?} links back to {:?}",
                        id,
                        dir,
                        neighbor_id,
                        neighbor.neighbor(dir.opposite())
                    )));
                }
                if neighbor.tier != cell.tier {
                    return Err(MeshError::Topology(format!(
                        "Cell {:?} (tier {}): {:?} neighbor {:?} is tier {}",
                        id, cell.tier, dir, neighbor_id, neighbor.tier
                    )));
                }
                let expected = match dir {
                    Direction::North => (cell.ix as i64, cell.iy as i64 + 1),
                    Direction::East => (cell.ix as i64 + 1, cell.iy as i64),
                    Direction::South => (cell.ix as i64, cell.iy as i64 - 1),
                    Direction::West => (cell.ix as i64 - 1, cell.iy as i64),
                };
                if (neighbor.ix as i64, neighbor.iy as i64) != expected {
                    return Err(MeshError::Topology(format!(
                        "Cell {:?}: {:?} neighbor {:?} is not adjacent",
                        id, dir, neighbor_id
                    )));
                }
            }

            if let Some(children) = cell.children() {
                for q in Quadrant::ALL {
                    let child_id = children[q.index()];
                    let child = self.cell(child_id).ok_or_else(|| {
                        MeshError::Topology(format!("Cell {:?}: child {:?} doesn't exist", id, child_id))
                    })?;
                    let (dx, dy) = q.offset();
                    if child.parent() != Some(id)
                        || child.tier != cell.tier + 1
                        || (child.ix, child.iy) != (cell.ix * 2 + dx, cell.iy * 2 + dy)
                    {
                        return Err(MeshError::Topology(format!(
                            "Cell {:?}: {:?} child {:?} is inconsistent with its parent",
                            id, q, child_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_geometry(&self) -> Result<(), MeshError> {
        for (index, cell) in self.cells.iter().enumerate() {
            let id = CellId(index as u32);
            let spacing = self.spacing_at(cell.tier).ok_or_else(|| {
                MeshError::Topology(format!("Cell {:?}: tier {} has no grid", id, cell.tier))
            })? as i32;

            let mut corners = [IVec2::ZERO; 4];
            for q in Quadrant::ALL {
                let point = self.point(cell.corner(q)).ok_or_else(|| {
                    MeshError::Topology(format!("Cell {:?}: corner {:?} doesn't exist", id, cell.corner(q)))
                })?;
                corners[q.index()] = point.position;
            }

            let bl = corners[Quadrant::BottomLeft.index()];
            let expected_bl = IVec2::new(cell.ix as i32 * spacing, cell.iy as i32 * spacing);
            let square = Quadrant::ALL.iter().all(|&q| {
                let (dx, dy) = q.offset();
                corners[q.index()] == bl + IVec2::new(dx as i32 * spacing, dy as i32 * spacing)
            });
            if bl != expected_bl || !square {
                return Err(MeshError::Topology(format!(
                    "Cell {:?} (tier {}): corners {:?} do not form a {}-pixel square at ({}, {})",
                    id, cell.tier, corners, spacing, cell.ix, cell.iy
                )));
            }
        }

        Ok(())
    }

    fn validate_points(&self) -> Result<(), MeshError> {
        let mut seen = HashMap::with_capacity(self.points.len());
        for (index, point) in self.points.iter().enumerate() {
            if let Some(other) = seen.insert(point.position, index) {
                return Err(MeshError::Topology(format!(
                    "Points {} and {} share position {:?}",
                    other, index, point.position
                )));
            }
        }

        for (tier, grid) in self.grids.iter().enumerate() {
            let spacing = grid.spacing() as i32;
            for (col, row, id) in grid.iter() {
                let point = self.point(id).ok_or_else(|| {
                    MeshError::Topology(format!("Tier {} grid: point {:?} doesn't exist", tier, id))
                })?;
                if point.x() != col as i32 * spacing || point.y() != row as i32 * spacing {
                    return Err(MeshError::Topology(format!(
                        "Tier {} grid: point {:?} at {:?} registered at ({}, {})",
                        tier, id, point.position, col, row
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_mesh_is_valid() {
        let mesh = AdaptiveMesh::new(33, 17, 8, 11).unwrap();
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_detects_asymmetric_neighbor() {
        let mut mesh = AdaptiveMesh::new(17, 9, 8, 11).unwrap();
        mesh.cells[1].neighbors[Direction::West.index()] = None;
        assert!(matches!(mesh.validate(), Err(MeshError::Topology(_))));
    }

    #[test]
    fn test_detects_duplicate_points() {
        let mut mesh = AdaptiveMesh::new(17, 9, 8, 11).unwrap();
        mesh.points[1].position = mesh.points[0].position;
        assert!(matches!(mesh.validate(), Err(MeshError::Topology(_))));
    }

    #[test]
    fn test_detects_tiling_gap() {
        let mut mesh = AdaptiveMesh::new(17, 9, 8, 11).unwrap();
        // Cell 1 is no longer reachable as a root
        mesh.top_tier_cells = 1;
        let err = mesh.validate_tiling().unwrap_err();
        assert!(matches!(err, MeshError::Topology(msg) if msg.contains("covered by 0")));
    }
}
