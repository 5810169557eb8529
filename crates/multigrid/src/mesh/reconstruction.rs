//! Multi-level reconstruction of a dense displacement field.
//!
//! Tier 0 is interpolated directly. Each finer tier then contributes a
//! correction: the difference between its measured values and the running
//! solution sampled at the tier's spacing, interpolated back to every pixel.
//! Entries a tier does not own carry a zero correction.

use field::{DenseField, GridInterpolant, InterpKind, Raster};
use tracing::{debug, trace, warn};

use super::AdaptiveMesh;
use crate::types::MeshError;

impl AdaptiveMesh {
    /// Interpolate the measured displacements onto every pixel of the image.
    ///
    /// Tier-0 points without a displacement are treated as zero.
    pub fn reconstruct_dense_field(&self, kind: InterpKind) -> Result<DenseField, MeshError> {
        let width = self.width as usize;
        let height = self.height as usize;

        let base = &self.grids[0];
        let (mut u0, mut v0) = base.values(&self.points);
        let missing = u0.fill_nan(0.0).max(v0.fill_nan(0.0));
        if missing > 0 {
            warn!(
                "reconstruct_dense_field: {} tier-0 points have no displacement, using zero",
                missing
            );
        }

        let spacing = base.spacing() as f64;
        let mut u = GridInterpolant::uniform(&u0, spacing, kind)?.eval_pixels(width, height)?;
        let mut v = GridInterpolant::uniform(&v0, spacing, kind)?.eval_pixels(width, height)?;

        for (tier, grid) in self.grids.iter().enumerate().skip(1) {
            if grid.registered_count() == 0 {
                continue;
            }
            let step = grid.spacing() as usize;
            let (tier_u, tier_v) = grid.values(&self.points);
            u = apply_correction(&u, &tier_u, step, kind)?;
            v = apply_correction(&v, &tier_v, step, kind)?;
            trace!("reconstruct_dense_field: applied tier {} at step {}", tier, step);
        }

        debug!(
            "reconstruct_dense_field: {:?} over {}x{} from {} tiers",
            kind,
            width,
            height,
            self.tier_count()
        );

        Ok(DenseField::new(u, v, None)?)
    }

    /// Per-pixel disagreement between cubic and linear reconstruction.
    ///
    /// Large where the displacement field has structure the current sampling
    /// does not resolve; zero wherever the field is locally bilinear.
    pub fn refinement_objective(&self) -> Result<Raster<f64>, MeshError> {
        let cubic = self.reconstruct_dense_field(InterpKind::Cubic)?;
        let linear = self.reconstruct_dense_field(InterpKind::Linear)?;
        Ok(cubic.try_sub(&linear)?.magnitude())
    }
}

/// Add one tier's interpolated correction to the running solution
fn apply_correction(
    solution: &Raster<f64>,
    tier_values: &Raster<f64>,
    step: usize,
    kind: InterpKind,
) -> Result<Raster<f64>, MeshError> {
    let sampled = solution.subsample(step);
    let mut delta = tier_values.zip_map(&sampled, |measured, current| measured - current)?;
    delta.fill_nan(0.0);

    let correction = GridInterpolant::uniform(&delta, step as f64, kind)?
        .eval_pixels(solution.width(), solution.height())?;
    Ok(solution.zip_map(&correction, |a, b| a + b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellId, Quadrant};

    const EPS: f64 = 1e-9;

    fn bilinear(x: i32, y: i32) -> (f64, f64) {
        let (x, y) = (x as f64, y as f64);
        (1.0 + 0.5 * x - 0.25 * y + 0.125 * x * y, -2.0 + 0.75 * y + 0.05 * x * y)
    }

    fn assert_matches_bilinear(field: &DenseField, extent: usize) {
        for y in 0..=extent {
            for x in 0..=extent {
                let (u, v) = field.get(x, y).unwrap();
                let (eu, ev) = bilinear(x as i32, y as i32);
                assert!((u - eu).abs() < EPS, "u at ({x}, {y}): {u} vs {eu}");
                assert!((v - ev).abs() < EPS, "v at ({x}, {y}): {v} vs {ev}");
            }
        }
    }

    #[test]
    fn test_linear_reproduces_bilinear_on_tier_zero() {
        let mut mesh = AdaptiveMesh::new(9, 9, 4, 7).unwrap();
        mesh.set_displacements_with(bilinear);
        let field = mesh.reconstruct_dense_field(InterpKind::Linear).unwrap();
        assert_eq!(field.dims(), (9, 9));
        assert_matches_bilinear(&field, 8);
    }

    #[test]
    fn test_refined_mesh_reproduces_bilinear() {
        let mut mesh = AdaptiveMesh::new(17, 17, 8, 7).unwrap();
        mesh.split(CellId(0)).unwrap();
        let tr = mesh.cell(CellId(0)).unwrap().child(Quadrant::TopRight).unwrap();
        mesh.split(tr).unwrap();
        mesh.set_displacements_with(bilinear);

        for kind in [InterpKind::Linear, InterpKind::Cubic] {
            let field = mesh.reconstruct_dense_field(kind).unwrap();
            assert_matches_bilinear(&field, 16);
        }
    }

    #[test]
    fn test_missing_displacements_read_as_zero() {
        let mesh = AdaptiveMesh::new(9, 9, 4, 7).unwrap();
        let field = mesh.reconstruct_dense_field(InterpKind::Cubic).unwrap();
        assert!(field.u().as_slice().iter().all(|&u| u == 0.0));
        assert!(field.v().as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unmeasured_fine_points_leave_coarse_solution() {
        let mut mesh = AdaptiveMesh::new(9, 9, 4, 7).unwrap();
        mesh.set_displacements_with(bilinear);
        // New points from the split have no displacement yet
        mesh.split(CellId(0)).unwrap();
        let field = mesh.reconstruct_dense_field(InterpKind::Linear).unwrap();
        assert_matches_bilinear(&field, 8);
    }

    #[test]
    fn test_fine_tier_corrects_coarse_solution() {
        let mut mesh = AdaptiveMesh::new(9, 9, 4, 7).unwrap();
        mesh.set_displacements_with(|_, _| (0.0, 0.0));
        mesh.split(CellId(0)).unwrap();
        let centre = mesh.point_at(2, 2).unwrap();
        mesh.set_displacement(centre, 3.0, -1.0).unwrap();

        let field = mesh.reconstruct_dense_field(InterpKind::Linear).unwrap();
        let (u, v) = field.get(2, 2).unwrap();
        assert!((u - 3.0).abs() < EPS);
        assert!((v + 1.0).abs() < EPS);
        // Halfway between the centre and a zero corner
        let (u, _) = field.get(1, 1).unwrap();
        assert!((u - 0.75).abs() < EPS);
    }

    #[test]
    fn test_objective_zero_for_constant_field() {
        let mut mesh = AdaptiveMesh::new(17, 17, 4, 7).unwrap();
        mesh.set_displacements_with(|_, _| (2.5, -1.0));
        let objective = mesh.refinement_objective().unwrap();
        assert_eq!(objective.dims(), (17, 17));
        assert!(objective.as_slice().iter().all(|&o| o.abs() < EPS));
    }

    #[test]
    fn test_objective_non_negative_and_detects_curvature() {
        let mut mesh = AdaptiveMesh::new(33, 33, 4, 7).unwrap();
        mesh.set_displacements_with(|x, y| {
            let (x, y) = (x as f64, y as f64);
            ((x * 0.3).sin() * 4.0, (y * 0.2).cos() * 2.0)
        });
        let objective = mesh.refinement_objective().unwrap();
        assert!(objective.as_slice().iter().all(|&o| o >= 0.0));
        assert!(objective.as_slice().iter().any(|&o| o > 1e-3));
    }
}
