//! Shardfall Physics Library
//!
//! The physics and collision core of the Shardfall game client: rigid-body
//! integration, SAT narrow-phase collision detection, a uniform-grid
//! broad phase, and hitscan raycasts. The render scene graph, asset
//! loading, input, and UI live outside this crate; they feed geometry and
//! transforms in, and consume updated poses and collision events.
//!
//! # Example
//!
//! ```ignore
//! use shardfall_physics::physics::{
//!     Material, PhysicsConfig, PhysicsWorld, RigidBody, Shape, Vec3,
//! };
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//!
//! // Static floor slab and a falling crate
//! let floor = Shape::cuboid(Vec3::new(20.0, 0.5, 20.0));
//! world.add_body(RigidBody::new_static(floor, Vec3::new(0.0, -0.5, 0.0)));
//!
//! let crate_shape = Shape::cuboid(Vec3::splat(0.5));
//! let handle = world.add_body(
//!     RigidBody::new(crate_shape, 10.0).with_position(Vec3::new(0.0, 5.0, 0.0)),
//! );
//!
//! // Once per rendered frame
//! let contacts = world.step(1.0 / 60.0);
//! for (_handle, position, orientation) in world.poses() {
//!     // copy onto the render-side mesh
//! }
//! ```

pub mod physics;

// Re-export the physics module contents at crate level for convenience
pub use physics::*;
