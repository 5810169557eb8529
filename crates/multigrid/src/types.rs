//! Core types for the multigrid mesh: ids, sample points, cell orientation
//! enums and the error type.

use field::FieldError;
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Type-safe sample point identifier (index into the mesh's point arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub u32);

/// Type-safe cell identifier (index into the mesh's cell arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl PointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl CellId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A location at which a displacement-estimation window is placed.
///
/// `u` and `v` stay `None` until an external estimation pass fills them in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Pixel position (x = column, y = row)
    pub position: IVec2,
    /// Side length of the estimation window
    pub window_size: u32,
    /// Horizontal displacement
    pub u: Option<f64>,
    /// Vertical displacement
    pub v: Option<f64>,
}

impl SamplePoint {
    pub fn new(position: IVec2, window_size: u32) -> Self {
        Self {
            position,
            window_size,
            u: None,
            v: None,
        }
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.position.y
    }

    /// True once both displacement components are known
    #[inline]
    pub fn has_displacement(&self) -> bool {
        self.u.is_some() && self.v.is_some()
    }

    pub fn set_displacement(&mut self, u: f64, v: f64) {
        self.u = Some(u);
        self.v = Some(v);
    }
}

/// Per-point property selector for [`crate::AdaptiveMesh::point_values`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointProperty {
    X,
    Y,
    WindowSize,
    U,
    V,
}

impl PointProperty {
    /// Read the property as f64; missing displacements are NaN
    pub fn read(self, point: &SamplePoint) -> f64 {
        match self {
            PointProperty::X => point.position.x as f64,
            PointProperty::Y => point.position.y as f64,
            PointProperty::WindowSize => point.window_size as f64,
            PointProperty::U => point.u.unwrap_or(f64::NAN),
            PointProperty::V => point.v.unwrap_or(f64::NAN),
        }
    }
}

/// Position of a corner within a cell, or of a child within its parent.
///
/// ```text
/// -----------
/// | tl | tr |
/// -----------
/// | bl | br |
/// -----------
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Quadrant {
    BottomLeft = 0,
    BottomRight = 1,
    TopLeft = 2,
    TopRight = 3,
}

impl Quadrant {
    /// Canonical bl, br, tl, tr order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// (dx, dy) offset of this quadrant in a 2x2 block
    #[inline]
    pub fn offset(self) -> (u32, u32) {
        match self {
            Quadrant::BottomLeft => (0, 0),
            Quadrant::BottomRight => (1, 0),
            Quadrant::TopLeft => (0, 1),
            Quadrant::TopRight => (1, 1),
        }
    }
}

/// Same-tier neighbor direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Children along the shared edge, paired with the neighbor's facing
    /// children: `(own child, neighbor child)`.
    pub fn facing_children(self) -> [(Quadrant, Quadrant); 2] {
        use Quadrant::*;
        match self {
            Direction::North => [(TopLeft, BottomLeft), (TopRight, BottomRight)],
            Direction::East => [(BottomRight, BottomLeft), (TopRight, TopLeft)],
            Direction::South => [(BottomLeft, TopLeft), (BottomRight, TopRight)],
            Direction::West => [(BottomLeft, BottomRight), (TopLeft, TopRight)],
        }
    }

    /// Where a split neighbor keeps the midpoint of the shared edge:
    /// `(neighbor child, corner of that child)`.
    pub fn shared_midpoint(self) -> (Quadrant, Quadrant) {
        use Quadrant::*;
        match self {
            Direction::North => (BottomRight, BottomLeft),
            Direction::East => (BottomLeft, TopLeft),
            Direction::South => (TopLeft, TopRight),
            Direction::West => (BottomRight, TopRight),
        }
    }
}

/// Errors that can occur during mesh operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Grid refinement not possible: spacing {spacing} at tier {tier} cannot be halved")]
    Refinement { tier: u32, spacing: u32 },
    #[error("Cell {0:?} has already been split")]
    AlreadySplit(CellId),
    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),
    #[error("Objective field is {actual:?}, expected image size {expected:?}")]
    ObjectiveShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Unknown cell {0:?}")]
    UnknownCell(CellId),
    #[error("Unknown point {0:?}")]
    UnknownPoint(PointId),
    #[error("Invalid mesh topology: {0}")]
    Topology(String),
    #[error(transparent)]
    Field(#[from] FieldError),
}
