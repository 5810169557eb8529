//! Row-major 2D storage for per-pixel and per-sample values

use std::ops::{Index, IndexMut};

use crate::types::FieldError;

/// A width x height grid of values.
/// Row `y` holds the values for image row `y`; column `x` indexes within it.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: usize,
    height: usize,
    /// Values in row-major order
    data: Vec<T>,
}

impl<T: Copy> Raster<T> {
    /// Create a raster with every entry set to `fill`
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    /// Wrap an existing row-major buffer
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, FieldError> {
        if data.len() != width * height {
            return Err(FieldError::BufferLength {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a raster by evaluating `f(x, y)` at every entry
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Get the value at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[self.offset(x, y)])
    }

    /// Set the value at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.offset(x, y);
        self.data[index] = value;
    }

    /// One row of values
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// One column of values, copied out
    pub fn column(&self, x: usize) -> Vec<T> {
        (0..self.height).map(|y| self.data[self.offset(x, y)]).collect()
    }

    /// Raw row-major data
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw row-major data
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply `f` to every entry
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Raster<U> {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two equally shaped rasters entry by entry
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Raster<U>,
        f: impl Fn(T, U) -> V,
    ) -> Result<Raster<V>, FieldError> {
        if self.dims() != other.dims() {
            return Err(FieldError::ShapeMismatch {
                expected: self.dims(),
                actual: other.dims(),
            });
        }
        Ok(Raster {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Keep every `step`-th row and column starting at (0, 0)
    pub fn subsample(&self, step: usize) -> Raster<T> {
        let step = step.max(1);
        let width = self.width.div_ceil(step);
        let height = self.height.div_ceil(step);
        Raster::from_fn(width, height, |x, y| self.data[self.offset(x * step, y * step)])
    }

    /// Copy the inclusive window [x0, x1] x [y0, y1]
    pub fn crop(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Raster<T> {
        if x1 < x0 || y1 < y0 || x1 >= self.width || y1 >= self.height {
            return Raster {
                width: 0,
                height: 0,
                data: Vec::new(),
            };
        }
        Raster::from_fn(x1 - x0 + 1, y1 - y0 + 1, |x, y| {
            self.data[self.offset(x0 + x, y0 + y)]
        })
    }

    /// Surround the raster with `fill` (left/right columns, bottom/top rows)
    pub fn pad(&self, left: usize, right: usize, bottom: usize, top: usize, fill: T) -> Raster<T> {
        let width = self.width + left + right;
        let height = self.height + bottom + top;
        Raster::from_fn(width, height, |x, y| {
            let inside_x = x >= left && x < left + self.width;
            let inside_y = y >= bottom && y < bottom + self.height;
            if inside_x && inside_y {
                self.data[self.offset(x - left, y - bottom)]
            } else {
                fill
            }
        })
    }
}

impl Raster<f64> {
    /// Largest value in the half-open window [x0, x1) x [y0, y1), clipped to
    /// the raster. Returns None for an empty window.
    pub fn max_in_rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Option<f64> {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        let mut peak = f64::NEG_INFINITY;
        for y in y0..y1 {
            for &value in &self.row(y)[x0..x1] {
                peak = peak.max(value);
            }
        }
        Some(peak)
    }

    /// Replace NaN entries with `value`, returning how many were replaced
    pub fn fill_nan(&mut self, value: f64) -> usize {
        let mut replaced = 0;
        for v in self.data.iter_mut().filter(|v| v.is_nan()) {
            *v = value;
            replaced += 1;
        }
        replaced
    }
}

impl<T> Index<(usize, usize)> for Raster<T> {
    type Output = T;

    /// Index by (x, y)
    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width && y < self.height, "raster index out of bounds");
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Raster<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width && y < self.height, "raster index out of bounds");
        &mut self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(width: usize, height: usize) -> Raster<f64> {
        Raster::from_fn(width, height, |x, y| (y * width + x) as f64)
    }

    #[test]
    fn test_new_raster() {
        let raster = Raster::new(4, 3, 0.0);
        assert_eq!(raster.dims(), (4, 3));
        assert_eq!(raster.as_slice().len(), 12);
    }

    #[test]
    fn test_get_set() {
        let mut raster = Raster::new(10, 10, 0.0);
        raster.set(5, 6, 2.5);
        assert_eq!(raster.get(5, 6), Some(2.5));
        assert_eq!(raster[(5, 6)], 2.5);

        // Out of bounds should return None and writes are ignored
        assert_eq!(raster.get(10, 0), None);
        raster.set(10, 0, 1.0);
        assert!(raster.as_slice().iter().all(|&v| v == 0.0 || v == 2.5));
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Raster::from_vec(2, 2, vec![1, 2, 3, 4]).is_ok());
        assert_eq!(
            Raster::from_vec(2, 2, vec![1, 2, 3]),
            Err(FieldError::BufferLength {
                width: 2,
                height: 2,
                len: 3
            })
        );
    }

    #[test]
    fn test_subsample() {
        let raster = counting(5, 4);
        let sub = raster.subsample(2);
        assert_eq!(sub.dims(), (3, 2));
        assert_eq!(sub.row(0), &[0.0, 2.0, 4.0]);
        assert_eq!(sub.row(1), &[10.0, 12.0, 14.0]);
    }

    #[test]
    fn test_crop_and_pad() {
        let raster = counting(4, 4);
        let crop = raster.crop(1, 1, 2, 3);
        assert_eq!(crop.dims(), (2, 3));
        assert_eq!(crop.row(0), &[5.0, 6.0]);
        assert_eq!(crop.row(2), &[13.0, 14.0]);

        let padded = crop.pad(1, 0, 0, 1, -1.0);
        assert_eq!(padded.dims(), (3, 4));
        assert_eq!(padded.row(0), &[-1.0, 5.0, 6.0]);
        assert_eq!(padded.row(3), &[-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_max_in_rect() {
        let raster = counting(4, 4);
        assert_eq!(raster.max_in_rect(0, 0, 2, 2), Some(5.0));
        assert_eq!(raster.max_in_rect(2, 2, 10, 10), Some(15.0));
        assert_eq!(raster.max_in_rect(2, 2, 2, 4), None);
    }

    #[test]
    fn test_fill_nan() {
        let mut raster = Raster::from_vec(2, 1, vec![f64::NAN, 1.0]).unwrap();
        assert_eq!(raster.fill_nan(0.0), 1);
        assert_eq!(raster.row(0), &[0.0, 1.0]);
    }

    #[test]
    fn test_zip_map_shape_mismatch() {
        let a = Raster::new(2, 2, 1.0);
        let b = Raster::new(3, 2, 1.0);
        assert!(matches!(
            a.zip_map(&b, |x, y| x + y),
            Err(FieldError::ShapeMismatch { .. })
        ));
    }
}
