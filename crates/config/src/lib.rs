//! Shared configuration for the multigrid sampling mesh
//!
//! This crate provides the single source of truth for image dimensions,
//! sample spacing, window sizes and refinement pass counts used when a mesh
//! is built and refined.

use serde::{Deserialize, Serialize};

/// Default image width in pixels
pub const DEFAULT_WIDTH: u32 = 512;

/// Default image height in pixels
pub const DEFAULT_HEIGHT: u32 = 512;

/// Default tier-0 sample spacing in pixels (allows five halvings)
pub const DEFAULT_SPACING: u32 = 64;

/// Default correlation window size assigned to new sample points
pub const DEFAULT_WINDOW_SIZE: u32 = 33;

/// Default number of uniform refinement passes
pub const DEFAULT_UNIFORM_PASSES: u32 = 0;

/// Default number of objective-driven refinement passes
pub const DEFAULT_ADAPTIVE_PASSES: u32 = 2;

/// Mesh construction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Image width in pixels (number of columns)
    pub width: u32,
    /// Image height in pixels (number of rows)
    pub height: u32,
    /// Distance between tier-0 sample points
    pub spacing: u32,
    /// Window size given to every sample point the mesh creates
    pub window_size: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            spacing: DEFAULT_SPACING,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl MeshConfig {
    /// Create a mesh config for the given image dimensions, keeping default
    /// spacing and window size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Builder-style spacing override
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Builder-style window size override
    pub fn with_window_size(mut self, window_size: u32) -> Self {
        self.window_size = window_size;
        self
    }

    /// Number of times the tier-0 spacing can be halved while staying an
    /// integer. Zero spacing yields zero.
    pub fn max_refinement_depth(&self) -> u32 {
        if self.spacing == 0 {
            0
        } else {
            self.spacing.trailing_zeros()
        }
    }
}

/// Refinement schedule applied after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Passes that split every leaf cell
    pub uniform_passes: u32,
    /// Passes that split the half of the leaves with the largest objective
    pub adaptive_passes: u32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            uniform_passes: DEFAULT_UNIFORM_PASSES,
            adaptive_passes: DEFAULT_ADAPTIVE_PASSES,
        }
    }
}

impl RefinementConfig {
    /// Total number of passes in the schedule
    pub fn total_passes(&self) -> u32 {
        self.uniform_passes + self.adaptive_passes
    }
}
