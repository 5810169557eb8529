//! Cell split protocol.
//!
//! Splitting a cell creates up to five new points and four children:
//!
//! ```text
//!     Before:              After:
//!   tl -------- tr      tl ---- ct ---- tr
//!   |            |      |  tl   |   tr  |
//!   |            |  ->  lm ---- cm ---- rm
//!   |            |      |  bl   |   br  |
//!   bl -------- br      bl ---- cb ---- br
//! ```
//!
//! An edge midpoint (lm, cb, ct, rm) is reused when the neighbor across that
//! edge has already been split, since that neighbor's children own it.
//!
//! ## Balancing
//!
//! A cell below tier 0 may only split once every same-tier neighbor it could
//! have exists. Where a neighbor is missing, the parent's neighbor in that
//! direction must be split first, which may in turn need its own parent's
//! neighbors split. The required splits are discovered breadth-first and run
//! coarsest first, so each runs with its own neighbors already in place.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;
use tracing::{debug, trace};

use super::{AdaptiveMesh, MeshCell};
use crate::types::{CellId, Direction, MeshError, PointId, Quadrant, SamplePoint};

/// Result of splitting a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    /// Children of the split cell in bl, br, tl, tr order
    pub children: [CellId; 4],
    /// Points allocated by this split and every split it forced
    pub new_points: Vec<PointId>,
    /// Cells split beforehand to keep the mesh balanced, in execution order
    pub cascaded: Vec<CellId>,
}

impl AdaptiveMesh {
    /// Split a leaf cell into four children one tier finer.
    ///
    /// Fails with [`MeshError::AlreadySplit`] if the cell has children, and
    /// with [`MeshError::Refinement`] if the finer tier cannot exist. In both
    /// cases the mesh is left unchanged.
    pub fn split(&mut self, id: CellId) -> Result<SplitResult, MeshError> {
        let cell = *self.cell_ref(id)?;
        if cell.has_children() {
            return Err(MeshError::AlreadySplit(id));
        }

        let points_before = self.points.len();

        let mut plan = if cell.tier > 0 {
            self.balance_plan(id)
        } else {
            Vec::new()
        };
        // Required splits are strictly coarser, so coarsest-first is the reverse
        // of discovery order
        plan.reverse();

        if !plan.is_empty() {
            debug!("split {:?}: balancing requires {} splits first", id, plan.len());
        }

        // Make sure the finest tier we are about to populate exists before
        // touching anything
        self.ensure_tier(cell.tier + 1)?;

        let mut cascaded = Vec::with_capacity(plan.len());
        for required in plan {
            if self.cells[required.index()].has_children() {
                continue;
            }
            self.split_balanced(required)?;
            cascaded.push(required);
        }

        let children = self.split_balanced(id)?;
        let new_points = (points_before..self.points.len())
            .map(|i| PointId(i as u32))
            .collect();

        Ok(SplitResult {
            children,
            new_points,
            cascaded,
        })
    }

    /// Cells that must be split before `id`, in breadth-first discovery order.
    fn balance_plan(&self, id: CellId) -> Vec<CellId> {
        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            let cell = &self.cells[current.index()];
            let Some(parent) = cell.parent else {
                continue;
            };
            let parent = &self.cells[parent.index()];

            for dir in Direction::ALL {
                if cell.neighbor(dir).is_some() {
                    continue;
                }
                // Missing neighbor at the image border stays missing
                let Some(coarse) = parent.neighbor(dir) else {
                    continue;
                };
                if self.cells[coarse.index()].is_leaf() && seen.insert(coarse) {
                    trace!("balance_plan: {:?} needs {:?} split ({:?})", current, coarse, dir);
                    plan.push(coarse);
                    queue.push_back(coarse);
                }
            }
        }

        plan
    }

    /// Add tiers until `tier` exists.
    fn ensure_tier(&mut self, tier: u32) -> Result<(), MeshError> {
        while self.max_tier < tier {
            self.add_tier()?;
        }
        Ok(())
    }

    /// Split a cell whose same-tier neighbors are all in place.
    fn split_balanced(&mut self, id: CellId) -> Result<[CellId; 4], MeshError> {
        let cell = *self.cell_ref(id)?;
        if cell.has_children() {
            return Err(MeshError::AlreadySplit(id));
        }
        let child_tier = cell.tier + 1;
        self.ensure_tier(child_tier)?;

        let bl = self.points[cell.corner(Quadrant::BottomLeft).index()];
        let br = self.points[cell.corner(Quadrant::BottomRight).index()];
        let tl = self.points[cell.corner(Quadrant::TopLeft).index()];
        let window_size = bl.window_size;

        let ctr_x = (bl.x() + br.x()) / 2;
        let ctr_y = (bl.y() + tl.y()) / 2;

        let left_mid = self.shared_or_new(&cell, Direction::West, IVec2::new(bl.x(), ctr_y), window_size);
        let ctr_btm = self.shared_or_new(&cell, Direction::South, IVec2::new(ctr_x, bl.y()), window_size);
        // The centre can never exist yet
        let ctr_mid = self.push_point(SamplePoint::new(IVec2::new(ctr_x, ctr_y), window_size));
        let ctr_top = self.shared_or_new(&cell, Direction::North, IVec2::new(ctr_x, tl.y()), window_size);
        let right_mid = self.shared_or_new(&cell, Direction::East, IVec2::new(br.x(), ctr_y), window_size);

        let corners = [
            [cell.corner(Quadrant::BottomLeft), ctr_btm, left_mid, ctr_mid],
            [ctr_btm, cell.corner(Quadrant::BottomRight), ctr_mid, right_mid],
            [left_mid, ctr_mid, cell.corner(Quadrant::TopLeft), ctr_top],
            [ctr_mid, right_mid, ctr_top, cell.corner(Quadrant::TopRight)],
        ];

        let first = self.cells.len() as u32;
        let children = [CellId(first), CellId(first + 1), CellId(first + 2), CellId(first + 3)];
        let [c_bl, c_br, c_tl, c_tr] = children;

        let mut new_cells: Vec<MeshCell> = Quadrant::ALL
            .iter()
            .map(|q| {
                let (dx, dy) = q.offset();
                MeshCell::new(
                    child_tier,
                    cell.ix * 2 + dx,
                    cell.iy * 2 + dy,
                    corners[q.index()],
                    Some(id),
                )
            })
            .collect();

        // -----------
        // | tl | tr |
        // -----------
        // | bl | br |
        // -----------
        new_cells[Quadrant::BottomLeft.index()].set_neighbor(Direction::North, c_tl);
        new_cells[Quadrant::BottomLeft.index()].set_neighbor(Direction::East, c_br);
        new_cells[Quadrant::BottomRight.index()].set_neighbor(Direction::North, c_tr);
        new_cells[Quadrant::BottomRight.index()].set_neighbor(Direction::West, c_bl);
        new_cells[Quadrant::TopLeft.index()].set_neighbor(Direction::South, c_bl);
        new_cells[Quadrant::TopLeft.index()].set_neighbor(Direction::East, c_tr);
        new_cells[Quadrant::TopRight.index()].set_neighbor(Direction::South, c_br);
        new_cells[Quadrant::TopRight.index()].set_neighbor(Direction::West, c_tl);

        self.cells.extend(new_cells);
        self.cells[id.index()].children = Some(children);

        self.stitch_children(id);

        let grid = &mut self.grids[child_tier as usize];
        let col = (cell.ix * 2) as usize;
        let row = (cell.iy * 2) as usize;
        grid.set(col, row + 1, left_mid);
        grid.set(col + 1, row, ctr_btm);
        grid.set(col + 1, row + 1, ctr_mid);
        grid.set(col + 1, row + 2, ctr_top);
        grid.set(col + 2, row + 1, right_mid);

        trace!(
            "split_balanced: {:?} (tier {}) -> {:?}",
            id,
            cell.tier,
            children
        );

        Ok(children)
    }

    /// Midpoint of the edge shared with `dir`'s neighbor: reused from the
    /// neighbor's children when it has been split, otherwise allocated.
    fn shared_or_new(&mut self, cell: &MeshCell, dir: Direction, position: IVec2, window_size: u32) -> PointId {
        let (child_quadrant, corner) = dir.shared_midpoint();
        let existing = cell
            .neighbor(dir)
            .and_then(|n| self.cells[n.index()].child(child_quadrant))
            .map(|child| self.cells[child.index()].corner(corner));

        match existing {
            Some(point) => point,
            None => self.push_point(SamplePoint::new(position, window_size)),
        }
    }

    /// Link a freshly split cell's children with the children of its split
    /// neighbors, in both directions.
    fn stitch_children(&mut self, id: CellId) {
        let cell = self.cells[id.index()];
        let Some(children) = cell.children else {
            return;
        };

        for dir in Direction::ALL {
            let Some(neighbor) = cell.neighbor(dir) else {
                continue;
            };
            let Some(their_children) = self.cells[neighbor.index()].children else {
                continue;
            };
            for (own, theirs) in dir.facing_children() {
                let own = children[own.index()];
                let theirs = their_children[theirs.index()];
                self.cells[own.index()].set_neighbor(dir, theirs);
                self.cells[theirs.index()].set_neighbor(dir.opposite(), own);
            }
        }
    }
}
