//! Dense displacement fields for the multigrid sampling mesh
//!
//! This crate provides the per-pixel data types the mesh reconstructs into:
//! - [`raster::Raster`] - row-major 2D storage indexed by (x, y)
//! - [`dense_field::DenseField`] - paired u/v displacement rasters with a mask
//! - [`interpolation`] - gridded linear and natural-cubic interpolation
//! - [`types`] - shared error and interpolation kind types

pub mod dense_field;
pub mod interpolation;
pub mod raster;
pub mod types;

pub use dense_field::*;
pub use interpolation::*;
pub use raster::*;
pub use types::*;
