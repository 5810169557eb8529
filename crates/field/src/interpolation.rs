//! Gridded interpolation of sample rasters onto arbitrary coordinates.
//!
//! Both schemes are tensor products of a 1D interpolant, so a 2D evaluation
//! is done as two 1D passes: first along x for every sample row, then along y
//! for every output column.
//!
//! - **Linear**: piecewise linear between neighboring samples (bilinear in 2D)
//! - **Cubic**: natural cubic spline (zero second derivative at both ends),
//!   C2 continuous. With fewer than three samples it degenerates to linear.
//!
//! Coordinates outside the sample extent are clamped to the nearest edge, so
//! evaluation never extrapolates.

use tracing::trace;

use crate::raster::Raster;
use crate::types::{FieldError, InterpKind};

/// 1D interpolant over strictly increasing knots.
#[derive(Debug, Clone)]
pub struct Interpolant1d {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Spline second derivatives at the knots (all zero for linear)
    second: Vec<f64>,
}

impl Interpolant1d {
    /// Fit an interpolant of the given kind. `knots` and `values` must have
    /// equal, non-zero length and `knots` must be strictly increasing.
    pub fn new(knots: &[f64], values: &[f64], kind: InterpKind) -> Result<Self, FieldError> {
        validate_axis(knots)?;
        if values.len() != knots.len() {
            return Err(FieldError::ShapeMismatch {
                expected: (knots.len(), 1),
                actual: (values.len(), 1),
            });
        }

        let second = match kind {
            InterpKind::Linear => vec![0.0; knots.len()],
            InterpKind::Cubic => natural_second_derivatives(knots, values),
        };

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second,
        })
    }

    /// Evaluate at `x`, clamped to the knot range
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.knots.len();
        if n == 1 {
            return self.values[0];
        }

        let x = x.clamp(self.knots[0], self.knots[n - 1]);
        let hi = self.knots.partition_point(|&k| k <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let h = self.knots[hi] - self.knots[lo];
        let a = (self.knots[hi] - x) / h;
        let b = (x - self.knots[lo]) / h;

        a * self.values[lo]
            + b * self.values[hi]
            + ((a * a * a - a) * self.second[lo] + (b * b * b - b) * self.second[hi]) * h * h / 6.0
    }
}

/// Second derivatives of the natural cubic spline through (knots, values).
///
/// Solves the tridiagonal system with the Thomas algorithm; the end
/// conditions pin both boundary second derivatives to zero.
fn natural_second_derivatives(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len();
    let mut second = vec![0.0; n];
    if n < 3 {
        return second;
    }

    let mut scratch = vec![0.0; n];
    for i in 1..n - 1 {
        let sig = (knots[i] - knots[i - 1]) / (knots[i + 1] - knots[i - 1]);
        let p = sig * second[i - 1] + 2.0;
        second[i] = (sig - 1.0) / p;
        let slope_right = (values[i + 1] - values[i]) / (knots[i + 1] - knots[i]);
        let slope_left = (values[i] - values[i - 1]) / (knots[i] - knots[i - 1]);
        scratch[i] = (6.0 * (slope_right - slope_left) / (knots[i + 1] - knots[i - 1])
            - sig * scratch[i - 1])
            / p;
    }

    second[n - 1] = 0.0;
    for k in (0..n - 1).rev() {
        second[k] = second[k] * second[k + 1] + scratch[k];
    }
    second
}

fn validate_axis(knots: &[f64]) -> Result<(), FieldError> {
    if knots.is_empty() {
        return Err(FieldError::EmptyAxis);
    }
    if knots.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FieldError::UnsortedAxis);
    }
    Ok(())
}

/// 2D interpolant over a rectilinear sample grid.
///
/// `values` is indexed (x, y) with `values.width() == xs.len()` and
/// `values.height() == ys.len()`.
#[derive(Debug, Clone)]
pub struct GridInterpolant {
    kind: InterpKind,
    ys: Vec<f64>,
    /// One x-direction interpolant per sample row
    rows: Vec<Interpolant1d>,
}

impl GridInterpolant {
    pub fn new(
        xs: &[f64],
        ys: &[f64],
        values: &Raster<f64>,
        kind: InterpKind,
    ) -> Result<Self, FieldError> {
        validate_axis(xs)?;
        validate_axis(ys)?;
        if values.dims() != (xs.len(), ys.len()) {
            return Err(FieldError::ShapeMismatch {
                expected: (xs.len(), ys.len()),
                actual: values.dims(),
            });
        }

        let rows = (0..ys.len())
            .map(|y| Interpolant1d::new(xs, values.row(y), kind))
            .collect::<Result<Vec<_>, _>>()?;
        trace!("GridInterpolant: {:?} over {}x{} samples", kind, xs.len(), ys.len());

        Ok(Self {
            kind,
            ys: ys.to_vec(),
            rows,
        })
    }

    /// Fit to samples on a uniform grid `0, spacing, 2 * spacing, ...`
    pub fn uniform(values: &Raster<f64>, spacing: f64, kind: InterpKind) -> Result<Self, FieldError> {
        let xs = uniform_axis(values.width(), spacing);
        let ys = uniform_axis(values.height(), spacing);
        Self::new(&xs, &ys, values, kind)
    }

    #[inline]
    pub fn kind(&self) -> InterpKind {
        self.kind
    }

    /// Evaluate at a single coordinate
    pub fn eval(&self, x: f64, y: f64) -> Result<f64, FieldError> {
        let column: Vec<f64> = self.rows.iter().map(|row| row.eval(x)).collect();
        Ok(Interpolant1d::new(&self.ys, &column, self.kind)?.eval(y))
    }

    /// Evaluate on the grid `xe x ye`; output is `xe.len()` wide and
    /// `ye.len()` tall.
    pub fn eval_grid(&self, xe: &[f64], ye: &[f64]) -> Result<Raster<f64>, FieldError> {
        // Pass 1: along x for every sample row
        let along_x: Vec<Vec<f64>> = self
            .rows
            .iter()
            .map(|row| xe.iter().map(|&x| row.eval(x)).collect())
            .collect();

        // Pass 2: along y for every output column
        let mut out = Raster::new(xe.len(), ye.len(), 0.0);
        let mut column = vec![0.0; self.ys.len()];
        for i in 0..xe.len() {
            for (j, row) in along_x.iter().enumerate() {
                column[j] = row[i];
            }
            let spline = Interpolant1d::new(&self.ys, &column, self.kind)?;
            for (j, &y) in ye.iter().enumerate() {
                out[(i, j)] = spline.eval(y);
            }
        }
        Ok(out)
    }

    /// Evaluate at every pixel of a `width x height` image
    pub fn eval_pixels(&self, width: usize, height: usize) -> Result<Raster<f64>, FieldError> {
        let xe = uniform_axis(width, 1.0);
        let ye = uniform_axis(height, 1.0);
        self.eval_grid(&xe, &ye)
    }
}

/// `count` coordinates `0, spacing, 2 * spacing, ...`
pub fn uniform_axis(count: usize, spacing: f64) -> Vec<f64> {
    (0..count).map(|i| i as f64 * spacing).collect()
}
