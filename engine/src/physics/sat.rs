//! SAT narrow-phase collision detection
//!
//! Separating Axis Theorem test between two bodies' world-space face sets:
//! two convex shapes are disjoint iff some axis exists onto which their
//! projections do not overlap. The candidate axes are the union of both
//! shapes' face normals; if every axis overlaps, the axis with the smallest
//! overlap is the minimum translation vector.
//!
//! A swept variant expands each projection interval by the relative motion
//! over the step, catching fast bodies that would tunnel through each other
//! within one frame. It is a secondary algorithm; the world's default step
//! uses the discrete test.

use glam::Vec3;

use super::body::RigidBody;

/// Result of a discrete collision test.
///
/// The normal points from the second body's center toward the first body's
/// center: the first body moves `normal * penetration` to separate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact normal, unit length, oriented to push the first body away
    pub normal: Vec3,
    /// Overlap distance along the normal
    pub penetration: f32,
}

/// Result of the swept collision test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptContact {
    /// Contact normal, oriented like [`Contact::normal`]
    pub normal: Vec3,
    /// Overlap of the motion-expanded intervals along the normal
    pub penetration: f32,
    /// Earliest time within the step at which the shapes touch, in [0, dt]
    pub time: f32,
}

/// Reusable projection buffers for the SAT tests.
///
/// One scratch lives on the world and is reused across every pair each
/// step, so the narrow phase does not allocate.
#[derive(Debug, Default)]
pub struct SatScratch {
    axes: Vec<Vec3>,
    verts_a: Vec<Vec3>,
    verts_b: Vec<Vec3>,
}

/// Projects `points` onto `axis`, returning the [min, max] interval.
fn project(points: &[Vec3], axis: Vec3) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for p in points {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Gathers world vertices and pooled candidate axes for a body pair.
fn gather(a: &RigidBody, b: &RigidBody, scratch: &mut SatScratch) {
    let world_a = a.world_matrix();
    let world_b = b.world_matrix();
    a.shape.vertices_into(&world_a, &mut scratch.verts_a);
    b.shape.vertices_into(&world_b, &mut scratch.verts_b);
    scratch.axes.clear();
    a.shape.normals_append(&world_a, &mut scratch.axes);
    b.shape.normals_append(&world_b, &mut scratch.axes);
}

/// Orients `axis` so it points from `b`'s center toward `a`'s center.
///
/// With exactly coincident centers the dot product is zero and the sign is
/// left as-computed (known ambiguity; callers see an arbitrary but unit
/// normal).
fn orient(axis: Vec3, a: &RigidBody, b: &RigidBody) -> Vec3 {
    let between = a.world_sphere().center - b.world_sphere().center;
    if between.dot(axis) < 0.0 { -axis } else { axis }
}

/// Exact SAT test between two bodies at their current poses.
///
/// Returns `None` as soon as any candidate axis separates the projections
/// (the SAT early exit). Otherwise returns the minimum-overlap axis as the
/// contact normal, oriented from `b` toward `a`, with the overlap length as
/// penetration depth.
///
/// Zero-length candidate axes (from degenerate faces) are skipped so they
/// cannot corrupt the minimum-overlap search; a pair with no valid axes at
/// all reports no collision.
pub fn check_collision(a: &RigidBody, b: &RigidBody, scratch: &mut SatScratch) -> Option<Contact> {
    gather(a, b, scratch);

    let mut best_axis = Vec3::ZERO;
    let mut best_overlap = f32::MAX;

    for &axis in &scratch.axes {
        if axis.length_squared() < 1e-10 {
            continue;
        }
        let (min_a, max_a) = project(&scratch.verts_a, axis);
        let (min_b, max_b) = project(&scratch.verts_b, axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            // Separating axis found; exact touch counts as separated
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = axis;
        }
    }

    if best_axis == Vec3::ZERO {
        return None;
    }

    Some(Contact {
        normal: orient(best_axis, a, b),
        penetration: best_overlap,
    })
}

/// Swept SAT test: projection intervals grow by the relative motion over
/// `dt`, so a fast body closing the gap within the step still reports a
/// contact.
///
/// Returns the minimum-overlap axis of the expanded intervals plus the
/// earliest time at which the slowest-closing axis comes into contact,
/// clamped to [0, dt] (0 when the shapes already overlap). Returns `None`
/// when some axis stays separated for the whole step.
pub fn check_collision_swept(
    a: &RigidBody,
    b: &RigidBody,
    dt: f32,
    scratch: &mut SatScratch,
) -> Option<SweptContact> {
    gather(a, b, scratch);

    let relative = (a.linear_velocity - b.linear_velocity) * dt;

    let mut best_axis = Vec3::ZERO;
    let mut best_overlap = f32::MAX;
    let mut entry_time = 0.0_f32;

    for &axis in &scratch.axes {
        if axis.length_squared() < 1e-10 {
            continue;
        }
        let (mut min_a, mut max_a) = project(&scratch.verts_a, axis);
        let (min_b, max_b) = project(&scratch.verts_b, axis);

        // Static gap along this axis before expanding by the motion
        let gap = (min_b - max_a).max(min_a - max_b);

        // Expand a's interval by its motion relative to b over the step
        let motion = relative.dot(axis);
        if motion > 0.0 {
            max_a += motion;
        } else {
            min_a += motion;
        }

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = axis;
        }

        // A currently separated axis contributes the time its gap closes;
        // the pair first touches when the last such axis closes
        if gap > 0.0 && motion.abs() > 1e-10 {
            let axis_entry = gap / motion.abs() * dt;
            entry_time = entry_time.max(axis_entry);
        }
    }

    if best_axis == Vec3::ZERO || entry_time > dt {
        return None;
    }

    Some(SweptContact {
        normal: orient(best_axis, a, b),
        penetration: best_overlap,
        time: entry_time.min(dt),
    })
}
