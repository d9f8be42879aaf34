//! Ray intersection primitives
//!
//! Line/plane and line/face tests shared between the narrow phase and the
//! hitscan query surface. The world-level raycast over registered bodies
//! lives on [`crate::physics::world::PhysicsWorld`]; this module provides
//! the per-primitive math.

use glam::Vec3;

use super::geometry::Face;

/// A ray for hitscan queries and collision probing.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized by [`Ray::new`])
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point along the ray at distance `t`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersects the ray with the plane `normal · x = offset`.
///
/// # Returns
///
/// * `Some(t)` - Distance to the plane (t >= 0)
/// * `None` - Ray is parallel to the plane or the plane is behind it
pub fn ray_plane_intersect(ray: &Ray, normal: Vec3, offset: f32) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-10 {
        return None;
    }
    let t = (offset - normal.dot(ray.origin)) / denom;
    if t >= 0.0 { Some(t) } else { None }
}

/// Intersects the ray with one triangular face (Moller-Trumbore).
///
/// # Returns
///
/// * `Some(t)` - Distance to the hit point inside the triangle (t >= 0)
/// * `None` - Miss, back-facing parallel ray, or degenerate face
pub fn ray_face_intersect(ray: &Ray, face: &Face) -> Option<f32> {
    let edge1 = face.b - face.a;
    let edge2 = face.c - face.a;

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-10 {
        // Parallel to the triangle plane, or a zero-area triangle
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - face.a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t >= 0.0 { Some(t) } else { None }
}
