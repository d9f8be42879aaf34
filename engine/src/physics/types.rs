//! Physics type re-exports and vector helpers
//!
//! This module provides the core mathematical types used throughout
//! the physics system, re-exported from the glam library, plus a few
//! free functions over them that the rest of the crate shares.

pub use glam::{Mat4, Quat, Vec3};

/// Components with absolute value below this are treated as zero by
/// [`zero_snap`].
pub const ZERO_EPSILON: f32 = 1e-6;

/// Snaps near-zero components of a vector to exactly zero.
///
/// Projection and normal math accumulates tiny residues (e.g. 1e-8 on an
/// axis that should be exactly zero); snapping keeps axis comparisons and
/// sign tests stable.
pub fn zero_snap(v: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.abs() < ZERO_EPSILON { 0.0 } else { v.x },
        if v.y.abs() < ZERO_EPSILON { 0.0 } else { v.y },
        if v.z.abs() < ZERO_EPSILON { 0.0 } else { v.z },
    )
}

/// Clamps a vector's length to `max_len`, preserving direction.
///
/// Returns the vector unchanged when it is already within the bound or has
/// zero length.
pub fn clamp_length(v: Vec3, max_len: f32) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > max_len * max_len && len_sq > 0.0 {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}
