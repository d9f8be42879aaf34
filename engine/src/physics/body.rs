//! Rigid bodies and the movement integrator
//!
//! A [`RigidBody`] carries mass, material, pose, velocities, and a per-frame
//! force accumulator. [`RigidBody::step`] advances the body one discrete
//! time step: force accumulation → acceleration → displacement → velocity,
//! with gravity, planar friction drag, per-direction axis locks, and
//! defensive clamping of runaway values.
//!
//! A body with `mass == 0` is static: the integrator never moves it and
//! applied forces are ignored.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::bounds::{Aabb, BoundingSphere};
use super::geometry::Shape;
use super::types::{clamp_length, zero_snap};

/// Surface/material response factors, each clamped to [0, 1].
///
/// Immutable value type; bodies of the same surface type share one material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Planar drag factor applied against the horizontal force components
    pub friction: f32,
    /// Velocity fraction retained per step (1.0 = no damping)
    pub inertia: f32,
    /// Bounciness factor, consumed by collision-response code in listeners
    pub restitution: f32,
}

impl Material {
    /// Creates a material, clamping each factor into [0, 1].
    ///
    /// Malformed factors are clamped rather than rejected.
    pub fn new(friction: f32, inertia: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            inertia: inertia.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Frictionless, undamped, non-bouncy material.
    pub fn frictionless() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.2,
            inertia: 0.95,
            restitution: 0.3,
        }
    }
}

/// Per-direction movement locks.
///
/// Each bit locks motion along one signed axis direction: a body with
/// `Constraints::NEG_Y` set never receives negative-Y displacement or
/// velocity (the "standing on ground" lock), while positive-Y motion stays
/// free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints(u8);

impl Constraints {
    pub const NONE: Constraints = Constraints(0);
    pub const NEG_X: Constraints = Constraints(1 << 0);
    pub const POS_X: Constraints = Constraints(1 << 1);
    pub const NEG_Y: Constraints = Constraints(1 << 2);
    pub const POS_Y: Constraints = Constraints(1 << 3);
    pub const NEG_Z: Constraints = Constraints(1 << 4);
    pub const POS_Z: Constraints = Constraints(1 << 5);

    /// Union of two constraint sets.
    pub fn with(self, other: Constraints) -> Constraints {
        Constraints(self.0 | other.0)
    }

    pub fn contains(self, other: Constraints) -> bool {
        self.0 & other.0 == other.0
    }

    /// Zeroes the components of `v` whose signed direction is locked.
    pub fn apply(self, v: Vec3) -> Vec3 {
        let mut out = v;
        if (out.x < 0.0 && self.contains(Self::NEG_X)) || (out.x > 0.0 && self.contains(Self::POS_X)) {
            out.x = 0.0;
        }
        if (out.y < 0.0 && self.contains(Self::NEG_Y)) || (out.y > 0.0 && self.contains(Self::POS_Y)) {
            out.y = 0.0;
        }
        if (out.z < 0.0 && self.contains(Self::NEG_Z)) || (out.z > 0.0 && self.contains(Self::POS_Z)) {
            out.z = 0.0;
        }
        out
    }
}

/// A simulated body: collision shape plus kinematic state.
///
/// Fields are public plain data; the world and game code read and write them
/// directly between steps. The force accumulator and previous-step
/// acceleration are internal to the integrator.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Mass in kg; 0 marks the body static/immovable
    pub mass: f32,
    /// Collision geometry in local space
    pub shape: Shape,
    /// Surface response factors
    pub material: Material,
    /// Position in world space
    pub position: Vec3,
    /// Orientation as quaternion
    pub orientation: Quat,
    /// Linear velocity (m/s)
    pub linear_velocity: Vec3,
    /// Angular velocity; carried through to the pose read-out, not integrated
    pub angular_velocity: Vec3,
    /// Per-direction movement locks
    pub constraints: Constraints,
    /// Scalar multiplier on world gravity (1.0 = full gravity)
    pub gravity_influence: f32,
    /// Accumulated force for this frame, reset by `step`
    applied_force: Vec3,
    /// Acceleration from the previous step, averaged into the next
    linear_acceleration: Vec3,
}

impl RigidBody {
    /// Creates a dynamic body at the origin.
    ///
    /// `mass` is clamped to be non-negative; pass 0 (or use
    /// [`RigidBody::new_static`]) for an immovable body.
    pub fn new(shape: Shape, mass: f32) -> Self {
        Self {
            mass: mass.max(0.0),
            shape,
            material: Material::default(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            constraints: Constraints::NONE,
            gravity_influence: 1.0,
            applied_force: Vec3::ZERO,
            linear_acceleration: Vec3::ZERO,
        }
    }

    /// Creates a static (immovable) body at `position`.
    pub fn new_static(shape: Shape, position: Vec3) -> Self {
        let mut body = Self::new(shape, 0.0);
        body.position = position;
        body
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_gravity_influence(mut self, influence: f32) -> Self {
        self.gravity_influence = influence;
        self
    }

    /// True when the body is an immovable collision target.
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Accumulates a force for the next step. No-op on static bodies.
    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_static() {
            return;
        }
        self.applied_force += force;
    }

    /// World transform built from position and orientation.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// World-space bounding box of the body's shape at its current pose.
    pub fn world_bounds(&self) -> Aabb {
        self.shape.world_bounds(&self.world_matrix())
    }

    /// World-space bounding sphere at the current pose.
    ///
    /// The radius is pose-independent (rotation preserves distances), so only
    /// the center moves.
    pub fn world_sphere(&self) -> BoundingSphere {
        let local = self.shape.local_sphere();
        BoundingSphere::new(
            self.world_matrix().transform_point3(local.center),
            local.radius,
        )
    }

    /// Current pose for the render layer. One-way copy: physics → visual.
    pub fn pose(&self) -> (Vec3, Quat) {
        (self.position, self.orientation)
    }

    /// Advances the body one time step.
    ///
    /// Pipeline: accumulate forces (applied + external + gravity scaled by
    /// `gravity_influence`), subtract the planar friction drag, average the
    /// resulting acceleration with the previous step's, move by
    /// `v·dt + ½·a·dt²` with locked directions zeroed, then update velocity
    /// as `v·inertia + a·dt`, constrained and clamped. The force accumulator
    /// resets afterward.
    ///
    /// The friction drag opposes the horizontal force components whether or
    /// not the body touches anything; this is a deliberate simplification,
    /// not Coulomb friction.
    ///
    /// Static bodies (mass <= 0) short-circuit: no state changes at all.
    pub fn step(&mut self, dt: f32, gravity: Vec3, external_force: Vec3, numeric_bound: f32) {
        if self.is_static() {
            return;
        }

        let mut current_force = self.applied_force
            + external_force
            + gravity * self.mass * self.gravity_influence;

        // Planar drag: oppose the horizontal force components, Y untouched
        let planar = Vec3::new(current_force.x, 0.0, current_force.z);
        current_force -= planar * self.material.friction;

        let raw_acceleration = current_force / self.mass;
        if raw_acceleration.length_squared() > numeric_bound * numeric_bound {
            trace!(
                acceleration = raw_acceleration.length(),
                bound = numeric_bound,
                "acceleration clamped"
            );
        }
        let current_acceleration = clamp_length(raw_acceleration, numeric_bound);

        // Average with the previous step's acceleration to smooth force spikes
        let acceleration =
            clamp_length((self.linear_acceleration + current_acceleration) * 0.5, numeric_bound);

        let displacement = self.linear_velocity * dt + acceleration * (0.5 * dt * dt);
        self.position += self.constraints.apply(zero_snap(displacement));

        let velocity = self.linear_velocity * self.material.inertia + acceleration * dt;
        self.linear_velocity = self.constraints.apply(clamp_length(velocity, numeric_bound));

        self.linear_acceleration = acceleration;
        self.applied_force = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_cube(mass: f32) -> RigidBody {
        RigidBody::new(Shape::cuboid(Vec3::splat(0.5)), mass)
            .with_material(Material::frictionless())
    }

    #[test]
    fn test_material_clamps_factors() {
        let m = Material::new(-0.5, 2.0, 1.5);
        assert_eq!(m.friction, 0.0);
        assert_eq!(m.inertia, 1.0);
        assert_eq!(m.restitution, 1.0);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut body = RigidBody::new_static(Shape::cuboid(Vec3::splat(0.5)), Vec3::ZERO);
        body.apply_force(Vec3::new(1000.0, 1000.0, 1000.0));
        for _ in 0..100 {
            body.step(0.1, Vec3::new(0.0, -9.81, 0.0), Vec3::ZERO, 1.0e4);
        }
        assert_eq!(body.position, Vec3::ZERO);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_apply_force_noop_on_static() {
        let mut body = RigidBody::new_static(Shape::cuboid(Vec3::splat(0.5)), Vec3::ZERO);
        body.apply_force(Vec3::X);
        assert_eq!(body.applied_force, Vec3::ZERO);
    }

    #[test]
    fn test_fall_distance_approximates_half_g_t_squared() {
        // mass 10, gravity -10, 1 second in 0.1 steps: ~0.5*10*1^2 = 5 units,
        // within scheme tolerance (acceleration averaging warms up from zero)
        let mut body = dynamic_cube(10.0);
        for _ in 0..10 {
            body.step(0.1, Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO, 1.0e4);
        }
        let fallen = -body.position.y;
        assert!(
            (3.8..=5.7).contains(&fallen),
            "expected ~5 units fallen, got {}",
            fallen
        );
    }

    #[test]
    fn test_gravity_influence_scales_fall() {
        let mut full = dynamic_cube(1.0);
        let mut none = dynamic_cube(1.0).with_gravity_influence(0.0);
        for _ in 0..10 {
            full.step(0.1, Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO, 1.0e4);
            none.step(0.1, Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO, 1.0e4);
        }
        assert!(full.position.y < 0.0);
        assert_eq!(none.position.y, 0.0);
    }

    #[test]
    fn test_bottom_constraint_blocks_downward_motion() {
        let mut body = dynamic_cube(1.0).with_constraints(Constraints::NEG_Y);
        let mut last_y = body.position.y;
        for _ in 0..50 {
            body.step(0.1, Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO, 1.0e4);
            assert!(body.position.y >= last_y, "y decreased under NEG_Y lock");
            assert!(body.linear_velocity.y >= 0.0);
            last_y = body.position.y;
        }
    }

    #[test]
    fn test_constraint_allows_opposite_direction() {
        let mut body = dynamic_cube(1.0).with_constraints(Constraints::NEG_Y);
        // Upward force still moves the body up
        for _ in 0..10 {
            body.apply_force(Vec3::new(0.0, 50.0, 0.0));
            body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        }
        assert!(body.position.y > 0.0);
    }

    #[test]
    fn test_applied_force_resets_each_step() {
        let mut body = dynamic_cube(1.0);
        body.apply_force(Vec3::new(10.0, 0.0, 0.0));
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        let v_after_impulse = body.linear_velocity.x;
        assert!(v_after_impulse > 0.0);

        // Next step has no applied force; acceleration decays toward zero
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        let residual = body.linear_acceleration.x;
        assert!(residual < 10.0 * 0.5, "acceleration did not decay: {}", residual);
    }

    #[test]
    fn test_friction_damps_horizontal_force_only() {
        let grippy = Material::new(1.0, 1.0, 0.0);
        let mut body = dynamic_cube(1.0).with_material(grippy);
        // Full friction cancels the horizontal force entirely
        body.apply_force(Vec3::new(10.0, 10.0, 0.0));
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        assert_eq!(body.linear_velocity.x, 0.0);
        assert!(body.linear_velocity.y > 0.0);
    }

    #[test]
    fn test_numeric_bound_clamps_spike() {
        let mut body = dynamic_cube(0.001);
        body.apply_force(Vec3::new(1.0e9, 0.0, 0.0));
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        assert!(body.linear_velocity.length() <= 1.0e4 + 1.0);
        assert!(body.position.x.is_finite());
    }

    #[test]
    fn test_inertia_damps_velocity() {
        let damped = Material::new(0.0, 0.5, 0.0);
        let mut body = dynamic_cube(1.0).with_material(damped);
        body.linear_velocity = Vec3::new(8.0, 0.0, 0.0);
        body.step(0.1, Vec3::ZERO, Vec3::ZERO, 1.0e4);
        assert!((body.linear_velocity.x - 4.0).abs() < 1e-4);
    }
}
