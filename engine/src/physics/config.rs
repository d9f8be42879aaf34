//! Physics configuration
//!
//! Centralized tunables for the simulation. Replaces constants scattered
//! across the game code; `Default` returns the canonical values. Loadable
//! from JSON so arenas can ship their own physics tuning.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Global configuration for a physics world.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration vector (m/s²).
    /// Earth default: Vec3::new(0.0, -9.81, 0.0)
    pub gravity: Vec3,
    /// Edge length of one spatial-grid cell (meters)
    pub cell_size: f32,
    /// Half the grid's extent in cells per axis; the grid spans
    /// `2 * grid_half_extent` cells centered on `grid_center`
    pub grid_half_extent: u32,
    /// World-space center of the spatial grid
    pub grid_center: Vec3,
    /// Contact tolerance used by collision queries (meters)
    pub collision_tolerance: f32,
    /// Upper bound on the per-step delta time (seconds). Frame hitches and
    /// backgrounded clients produce huge deltas; clamping keeps the
    /// integration stable.
    pub max_delta: f32,
    /// Magnitude bound applied to accelerations and velocities. Division by
    /// near-zero mass or a force spike clamps here instead of crashing the
    /// frame.
    pub numeric_bound: f32,
    /// When false, candidate pairs come from an O(n²) scan over all bodies
    /// instead of the grid. Diagnostic fallback for small scenes.
    pub use_spatial_grid: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            cell_size: 4.0,
            grid_half_extent: 32,
            grid_center: Vec3::ZERO,
            collision_tolerance: 0.1,
            max_delta: 0.1,
            numeric_bound: 1.0e4,
            use_spatial_grid: true,
        }
    }
}

impl PhysicsConfig {
    /// Parses a config from a JSON document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
