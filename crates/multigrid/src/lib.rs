//! Adaptive multigrid sampling mesh
//!
//! This crate decides where displacement-estimation windows are placed over an
//! image and turns the sparse samples back into a dense field:
//! - [`types::SamplePoint`] - a window position with its displacement result
//! - [`sample_grid::SampleGrid`] - per-tier lookup of points on a regular grid
//! - [`mesh::AdaptiveMesh`] - quadtree of cells with neighbor-consistent
//!   splitting, adaptive refinement and multi-level reconstruction
//!
//! # Architecture
//!
//! The mesh owns every point and cell in two append-only arenas. Cells refer
//! to points, neighbors, parents and children by [`types::PointId`] and
//! [`types::CellId`], so splitting never invalidates an existing reference.
//!
//! ```text
//! tier 0           tier 1 (after one split)
//! tl ------ tr     tl --- ct --- tr
//! |          |     |  tl  |  tr  |
//! |          |     lm --- cm --- rm
//! |          |     |  bl  |  br  |
//! bl ------ br     bl --- cb --- br
//! ```

pub mod mesh;
pub mod sample_grid;
pub mod types;

pub use mesh::{AdaptiveMesh, CellRect, MeshCell, RefinementStats, SplitResult};
pub use sample_grid::SampleGrid;
pub use types::{CellId, Direction, MeshError, PointId, PointProperty, Quadrant, SamplePoint};

pub use field::{DenseField, InterpKind, Raster};
pub use multigrid_config::{MeshConfig, RefinementConfig};
