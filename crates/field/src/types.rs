//! Shared types for dense fields and interpolation.

use serde::{Deserialize, Serialize};

/// Interpolation scheme used to turn gridded samples into a dense field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpKind {
    /// Piecewise bilinear interpolation
    Linear,
    /// Tensor-product natural cubic spline (C2 continuous)
    #[default]
    Cubic,
}

/// Errors that can occur when building fields or interpolants
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Buffer of length {len} cannot hold a {width}x{height} raster")]
    BufferLength {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("Interpolation needs at least one sample per axis")]
    EmptyAxis,
    #[error("Sample coordinates must be strictly increasing")]
    UnsortedAxis,
}
