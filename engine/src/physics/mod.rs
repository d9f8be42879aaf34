//! Physics module for the Shardfall client
//!
//! Custom rigid-body and collision implementation built from scratch,
//! without external physics library dependencies (no Rapier).
//!
//! # Philosophy
//!
//! Study reference implementations, understand algorithms, build our own.
//! This gives full control over performance and deep understanding of the
//! physics math.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat, Mat4) re-exported from glam
//! - [`error`] - Shape construction errors
//! - [`geometry`] - Face extraction and collision shapes
//! - [`bounds`] - AABB and bounding-sphere broad-phase volumes
//! - [`body`] - Materials, axis constraints, rigid bodies, and the integrator
//! - [`sat`] - Separating-axis narrow phase (discrete and swept)
//! - [`spatial`] - Uniform-grid spatial partition with overflow list
//! - [`raycast`] - Ray/plane and ray/face primitives
//! - [`config`] - Simulation tunables
//! - [`world`] - The physics world: step loop, listeners, raycasts
//!
//! # Frame Pipeline
//!
//! `PhysicsWorld::step(delta)` integrates every dynamic body, re-files it in
//! the spatial grid, prunes candidate pairs through the grid, rejects pairs
//! with disjoint bounding boxes, runs SAT on the survivors, and dispatches
//! collision listeners with the contact normal and penetration depth.
//! Listeners (player, robot, door, prop logic) own position correction and
//! game-state effects; the core only detects.

pub mod body;
pub mod bounds;
pub mod config;
pub mod error;
pub mod geometry;
pub mod raycast;
pub mod sat;
pub mod spatial;
pub mod types;
pub mod world;

// Re-export commonly used types at the physics module level
pub use body::{Constraints, Material, RigidBody};
pub use bounds::{Aabb, BoundingSphere, ray_aabb_intersect};
pub use config::PhysicsConfig;
pub use error::GeometryError;
pub use geometry::{Face, Shape};
pub use raycast::{Ray, ray_face_intersect, ray_plane_intersect};
pub use sat::{Contact, SatScratch, SweptContact, check_collision, check_collision_swept};
pub use spatial::CollisionMap;
pub use types::{Mat4, Quat, Vec3};
pub use world::{BodyHandle, CollisionListener, ContactEvent, PhysicsWorld, RayHit};
