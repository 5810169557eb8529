//! Per-pixel displacement field with an optional mask

mod region;

use std::ops::Sub;

use crate::raster::Raster;
use crate::types::FieldError;

pub use region::Region;

/// Dense u/v displacement field.
///
/// Mask convention: 1 marks a valid pixel, 0 a masked one. When no mask is
/// given every pixel is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseField {
    pub(crate) u: Raster<f64>,
    pub(crate) v: Raster<f64>,
    pub(crate) mask: Raster<u8>,
    has_mask: bool,
}

impl DenseField {
    /// Build a field from u, v and an optional mask; all must share a shape
    pub fn new(u: Raster<f64>, v: Raster<f64>, mask: Option<Raster<u8>>) -> Result<Self, FieldError> {
        if u.dims() != v.dims() {
            return Err(FieldError::ShapeMismatch {
                expected: u.dims(),
                actual: v.dims(),
            });
        }

        let (mask, has_mask) = match mask {
            Some(mask) => {
                if mask.dims() != u.dims() {
                    return Err(FieldError::ShapeMismatch {
                        expected: u.dims(),
                        actual: mask.dims(),
                    });
                }
                (mask, true)
            }
            None => (Raster::new(u.width(), u.height(), 1), false),
        };

        Ok(Self { u, v, mask, has_mask })
    }

    /// Field with the same value at every pixel
    pub fn uniform(width: usize, height: usize, u: f64, v: f64) -> Self {
        Self {
            u: Raster::new(width, height, u),
            v: Raster::new(width, height, v),
            mask: Raster::new(width, height, 1),
            has_mask: false,
        }
    }

    #[inline]
    pub fn u(&self) -> &Raster<f64> {
        &self.u
    }

    #[inline]
    pub fn v(&self) -> &Raster<f64> {
        &self.v
    }

    #[inline]
    pub fn mask(&self) -> &Raster<u8> {
        &self.mask
    }

    /// Whether a mask was supplied at construction
    #[inline]
    pub fn has_mask(&self) -> bool {
        self.has_mask
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.u.height()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.u.width()
    }

    /// (width, height)
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        self.u.dims()
    }

    /// Displacement at a pixel, None if out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<(f64, f64)> {
        Some((self.u.get(x, y)?, self.v.get(x, y)?))
    }

    /// Per-pixel vector length sqrt(u^2 + v^2)
    pub fn magnitude(&self) -> Raster<f64> {
        Raster::from_fn(self.n_cols(), self.n_rows(), |x, y| {
            self.u[(x, y)].hypot(self.v[(x, y)])
        })
    }

    /// Elementwise difference `self - other`. The mask is kept from `self`.
    pub fn try_sub(&self, other: &DenseField) -> Result<DenseField, FieldError> {
        let u = self.u.zip_map(&other.u, |a, b| a - b)?;
        let v = self.v.zip_map(&other.v, |a, b| a - b)?;
        Ok(DenseField {
            u,
            v,
            mask: self.mask.clone(),
            has_mask: self.has_mask,
        })
    }
}

impl Sub for &DenseField {
    type Output = DenseField;

    /// # Panics
    ///
    /// Panics if the two fields have different shapes; use
    /// [`DenseField::try_sub`] to handle that case.
    fn sub(self, other: &DenseField) -> DenseField {
        match self.try_sub(other) {
            Ok(field) => field,
            Err(err) => panic!("cannot subtract dense fields: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize, scale: f64) -> Raster<f64> {
        Raster::from_fn(width, height, |x, y| scale * (x + y) as f64)
    }

    #[test]
    fn test_initialisation_without_mask() {
        let field = DenseField::new(ramp(10, 10, 1.0), ramp(10, 10, 2.0), None).unwrap();
        assert!(!field.has_mask());
        assert!(field.mask().as_slice().iter().all(|&m| m == 1));
        assert_eq!(field.u()[(3, 4)], 7.0);
        assert_eq!(field.v()[(3, 4)], 14.0);
    }

    #[test]
    fn test_initialisation_checks_shapes() {
        let err = DenseField::new(ramp(10, 10, 1.0), ramp(11, 11, 1.0), None).unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { .. }));

        let mask = Raster::new(9, 10, 1u8);
        let err = DenseField::new(ramp(10, 10, 1.0), ramp(10, 10, 1.0), Some(mask)).unwrap_err();
        assert!(matches!(err, FieldError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_dimensions_are_captured() {
        // Non-square so rows and columns cannot be confused
        let field = DenseField::uniform(100, 50, 0.0, 0.0);
        assert_eq!(field.n_rows(), 50);
        assert_eq!(field.n_cols(), 100);
        assert_eq!(field.dims(), (100, 50));
    }

    #[test]
    fn test_magnitude() {
        let field = DenseField::uniform(3, 2, 3.0, -4.0);
        assert!(field.magnitude().as_slice().iter().all(|&m| (m - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_subtraction() {
        let a = DenseField::new(ramp(4, 4, 2.0), ramp(4, 4, 1.0), None).unwrap();
        let b = DenseField::new(ramp(4, 4, 1.0), ramp(4, 4, 1.0), None).unwrap();
        let diff = &a - &b;
        assert_eq!(diff.get(2, 1), Some((3.0, 0.0)));

        let c = DenseField::uniform(3, 4, 0.0, 0.0);
        assert!(a.try_sub(&c).is_err());
    }
}
