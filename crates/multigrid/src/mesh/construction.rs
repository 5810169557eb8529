//! Construction of the tier-0 mesh.

use glam::IVec2;
use multigrid_config::MeshConfig;
use tracing::debug;

use super::{AdaptiveMesh, MeshCell};
use crate::sample_grid::SampleGrid;
use crate::types::{CellId, Direction, MeshError, PointId, SamplePoint};

impl AdaptiveMesh {
    /// Build a regular tier-0 mesh over a `width x height` image.
    ///
    /// Points are placed at every multiple of `spacing` below the image size
    /// and numbered row by row. Each 2x2 block of adjacent points forms a
    /// cell. Fails if the spacing is zero or leaves fewer than two points
    /// along either axis.
    pub fn new(width: u32, height: u32, spacing: u32, window_size: u32) -> Result<Self, MeshError> {
        if spacing == 0 {
            return Err(MeshError::MalformedMesh("spacing must be positive".to_string()));
        }

        let n_cols = width.div_ceil(spacing);
        let n_rows = height.div_ceil(spacing);
        if n_cols < 2 || n_rows < 2 {
            return Err(MeshError::MalformedMesh(format!(
                "spacing {spacing} on a {width}x{height} image gives a {n_cols}x{n_rows} point grid, \
                 at least 2x2 is needed"
            )));
        }

        let mut grid = SampleGrid::new(width, height, spacing);
        let mut points = Vec::with_capacity((n_cols * n_rows) as usize);
        for row in 0..n_rows {
            for col in 0..n_cols {
                let position = IVec2::new((col * spacing) as i32, (row * spacing) as i32);
                grid.set(col as usize, row as usize, PointId(points.len() as u32));
                points.push(SamplePoint::new(position, window_size));
            }
        }

        // One fewer cell than points along each axis
        let cells_x = n_cols - 1;
        let cells_y = n_rows - 1;
        let mut cells = Vec::with_capacity((cells_x * cells_y) as usize);
        for row in 0..cells_y {
            for col in 0..cells_x {
                let bl = row * n_cols + col;
                let br = bl + 1;
                let tl = bl + n_cols;
                let tr = tl + 1;
                let corners = [PointId(bl), PointId(br), PointId(tl), PointId(tr)];
                cells.push(MeshCell::new(0, col, row, corners, None));
            }
        }

        // Wire neighbors once every cell exists
        for row in 0..cells_y {
            for col in 0..cells_x {
                let index = row * cells_x + col;
                let cell = &mut cells[index as usize];
                if row + 1 < cells_y {
                    cell.set_neighbor(Direction::North, CellId(index + cells_x));
                }
                if col + 1 < cells_x {
                    cell.set_neighbor(Direction::East, CellId(index + 1));
                }
                if row > 0 {
                    cell.set_neighbor(Direction::South, CellId(index - cells_x));
                }
                if col > 0 {
                    cell.set_neighbor(Direction::West, CellId(index - 1));
                }
            }
        }

        debug!(
            "AdaptiveMesh::new: {}x{} image, spacing {}, {} points, {} cells",
            width,
            height,
            spacing,
            points.len(),
            cells.len()
        );

        let top_tier_cells = cells.len();
        Ok(Self {
            width,
            height,
            spacing,
            window_size,
            points,
            cells,
            grids: vec![grid],
            max_tier: 0,
            top_tier_cells,
        })
    }

    /// Build a tier-0 mesh from a [`MeshConfig`]
    pub fn from_config(config: &MeshConfig) -> Result<Self, MeshError> {
        Self::new(config.width, config.height, config.spacing, config.window_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_are_row_major() {
        let mesh = AdaptiveMesh::new(10, 7, 3, 9).unwrap();
        // x: 0, 3, 6, 9   y: 0, 3, 6
        assert_eq!(mesh.n_points(), 12);
        assert_eq!(mesh.n_cells(), 6);
        let p = mesh.point(PointId(5)).unwrap();
        assert_eq!((p.x(), p.y()), (3, 3));
        assert_eq!(p.window_size, 9);
        assert_eq!(mesh.grid(0).unwrap().get(1, 1), Some(PointId(5)));
    }

    #[test]
    fn test_cell_corners_and_indices() {
        let mesh = AdaptiveMesh::new(10, 7, 3, 9).unwrap();
        let cell = mesh.cell(CellId(4)).unwrap();
        assert_eq!((cell.ix, cell.iy), (1, 1));
        assert_eq!(cell.corners(), [PointId(5), PointId(6), PointId(9), PointId(10)]);
        assert_eq!(cell.tier, 0);
        assert_eq!(cell.parent(), None);
    }

    #[test]
    fn test_neighbor_wiring() {
        let mesh = AdaptiveMesh::new(10, 7, 3, 9).unwrap();
        // 3 x 2 cells
        let corner = mesh.cell(CellId(0)).unwrap();
        assert_eq!(corner.neighbor(Direction::North), Some(CellId(3)));
        assert_eq!(corner.neighbor(Direction::East), Some(CellId(1)));
        assert_eq!(corner.neighbor(Direction::South), None);
        assert_eq!(corner.neighbor(Direction::West), None);

        let top_right = mesh.cell(CellId(5)).unwrap();
        assert_eq!(top_right.neighbor(Direction::North), None);
        assert_eq!(top_right.neighbor(Direction::East), None);
        assert_eq!(top_right.neighbor(Direction::South), Some(CellId(2)));
        assert_eq!(top_right.neighbor(Direction::West), Some(CellId(4)));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_degenerate_meshes_rejected() {
        assert!(matches!(
            AdaptiveMesh::new(10, 10, 0, 9),
            Err(MeshError::MalformedMesh(_))
        ));
        // Only one point row
        assert!(matches!(
            AdaptiveMesh::new(10, 4, 5, 9),
            Err(MeshError::MalformedMesh(_))
        ));
        assert!(matches!(
            AdaptiveMesh::new(2, 10, 2, 9),
            Err(MeshError::MalformedMesh(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = MeshConfig::new(64, 32).with_spacing(16).with_window_size(21);
        let mesh = AdaptiveMesh::from_config(&config).unwrap();
        assert_eq!(mesh.image_dims(), (64, 32));
        assert_eq!(mesh.n_top_tier_cells(), 3);
        assert_eq!(mesh.window_size(), 21);
    }
}
