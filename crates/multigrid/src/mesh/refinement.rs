//! Tier creation and refinement policies.
//!
//! Two policies drive splitting:
//! - **Uniform**: every current leaf is split once.
//! - **Adaptive**: leaves are ranked by the peak of an objective field over
//!   their extent, and the top half is split.
//!
//! Cascaded splits can split a ranked cell before its turn comes; those are
//! counted and skipped rather than treated as failures.

use field::Raster;
use multigrid_config::RefinementConfig;
use serde::Serialize;
use tracing::{debug, info};

use super::AdaptiveMesh;
use crate::sample_grid::SampleGrid;
use crate::types::{CellId, MeshError};

/// Statistics from one refinement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefinementStats {
    /// Leaf count when the pass started
    pub leaves_before: usize,
    /// Splits the pass aimed for
    pub quota: usize,
    /// Cells split on request
    pub splits_performed: usize,
    /// Cells split to keep neighbors balanced
    pub cascaded_splits: usize,
    /// Requested cells that an earlier cascade had already split
    pub skipped_already_split: usize,
    pub points_created: usize,
    pub cells_created: usize,
}

impl AdaptiveMesh {
    /// Append a tier at half the deepest spacing, returning its index.
    ///
    /// Fails without changing the mesh if the deepest spacing is odd.
    pub fn add_tier(&mut self) -> Result<u32, MeshError> {
        let spacing = self.grids[self.max_tier as usize].spacing();
        if spacing % 2 != 0 {
            return Err(MeshError::Refinement {
                tier: self.max_tier,
                spacing,
            });
        }

        let spacing = spacing / 2;
        self.grids.push(SampleGrid::new(self.width, self.height, spacing));
        self.max_tier += 1;

        debug!("add_tier: tier {} at spacing {}", self.max_tier, spacing);
        Ok(self.max_tier)
    }

    /// Split every current leaf once
    pub fn split_all_leaf_cells(&mut self) -> Result<RefinementStats, MeshError> {
        let leaves = self.leaf_cells();
        let quota = leaves.len();
        self.split_ranked(leaves, quota)
    }

    /// Split the half of the leaves with the largest objective peaks.
    ///
    /// `objective` must cover the whole image. Each leaf is scored by the
    /// maximum of `objective` over `[bl.x, tr.x) x [bl.y, tr.y)`; ties keep
    /// leaf order.
    pub fn adaptive_refine(&mut self, objective: &Raster<f64>) -> Result<RefinementStats, MeshError> {
        let expected = (self.width as usize, self.height as usize);
        if objective.dims() != expected {
            return Err(MeshError::ObjectiveShape {
                expected,
                actual: objective.dims(),
            });
        }

        let mut ranked: Vec<(CellId, f64)> = self
            .leaf_cells()
            .into_iter()
            .map(|id| (id, self.leaf_peak(id, objective)))
            .collect();
        // Stable, so equal peaks keep leaf order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let quota = ranked.len() / 2;
        self.split_ranked(ranked.into_iter().map(|(id, _)| id).collect(), quota)
    }

    /// Run uniform then adaptive passes, scoring adaptive passes with
    /// [`Self::refinement_objective`] on the current displacements.
    pub fn refine(&mut self, config: &RefinementConfig) -> Result<Vec<RefinementStats>, MeshError> {
        self.refine_with(config, |_| Ok(()))
    }

    /// Like [`Self::refine`], calling `measure` after every pass so new points
    /// can be given displacements before the next objective is computed.
    pub fn refine_with(
        &mut self,
        config: &RefinementConfig,
        mut measure: impl FnMut(&mut AdaptiveMesh) -> Result<(), MeshError>,
    ) -> Result<Vec<RefinementStats>, MeshError> {
        let mut history = Vec::with_capacity(config.total_passes() as usize);

        for pass in 0..config.uniform_passes {
            let stats = self.split_all_leaf_cells()?;
            info!(
                "refine: uniform pass {} split {} cells, {} points now",
                pass,
                stats.splits_performed,
                self.n_points()
            );
            history.push(stats);
            measure(self)?;
        }

        for pass in 0..config.adaptive_passes {
            let objective = self.refinement_objective()?;
            let stats = self.adaptive_refine(&objective)?;
            info!(
                "refine: adaptive pass {} split {}/{} cells ({} cascaded), {} points now",
                pass,
                stats.splits_performed,
                stats.quota,
                stats.cascaded_splits,
                self.n_points()
            );
            history.push(stats);
            measure(self)?;
        }

        Ok(history)
    }

    /// Split `candidates` in order until `quota` of them have been split.
    fn split_ranked(&mut self, candidates: Vec<CellId>, quota: usize) -> Result<RefinementStats, MeshError> {
        let mut stats = RefinementStats {
            leaves_before: self.leaf_cells().len(),
            quota,
            ..Default::default()
        };
        let points_before = self.n_points();
        let cells_before = self.n_cells();

        for id in candidates {
            if stats.splits_performed >= quota {
                break;
            }
            match self.split(id) {
                Ok(result) => {
                    stats.splits_performed += 1;
                    stats.cascaded_splits += result.cascaded.len();
                }
                Err(MeshError::AlreadySplit(_)) => {
                    stats.skipped_already_split += 1;
                }
                Err(err) => return Err(err),
            }
        }

        stats.points_created = self.n_points() - points_before;
        stats.cells_created = self.n_cells() - cells_before;
        debug!("split_ranked: {:?}", stats);
        Ok(stats)
    }

    /// Peak objective over a leaf's half-open pixel extent; NaN and empty
    /// extents rank last.
    fn leaf_peak(&self, id: CellId, objective: &Raster<f64>) -> f64 {
        let Some(rect) = self.cell_rect(id) else {
            return f64::NEG_INFINITY;
        };
        objective
            .max_in_rect(
                rect.min.x as usize,
                rect.min.y as usize,
                rect.max.x as usize,
                rect.max.y as usize,
            )
            .filter(|peak| !peak.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    }
}
