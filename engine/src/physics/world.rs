//! Physics world orchestration
//!
//! [`PhysicsWorld`] owns every registered body, the spatial partition, and
//! the per-step pipeline: integrate all dynamic bodies, prune candidate
//! pairs through the grid, quick-reject on bounding volumes, run the SAT
//! narrow phase on survivors, and dispatch collision listeners. The core
//! detects only; position correction and game effects are the listener's
//! responsibility.
//!
//! Single-threaded and not re-entrant: `step` is called once per rendered
//! frame from the main loop, and bodies are added or removed between steps.

use std::collections::{HashMap, HashSet};

use glam::{Quat, Vec3};
use slab::Slab;
use tracing::debug;

use super::body::RigidBody;
use super::bounds::ray_aabb_intersect;
use super::config::PhysicsConfig;
use super::raycast::{Ray, ray_face_intersect};
use super::sat::{self, Contact, SatScratch};
use super::spatial::CollisionMap;

/// Stable identifier of a body registered in a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

/// Receives collision notifications for one body.
///
/// Implemented per game-entity type (player, robot, door, static prop) and
/// registered on the world against that entity's body handle. The listener
/// may mutate its own body (typically position correction by
/// `contact.normal * contact.penetration`) and read the other body.
pub trait CollisionListener {
    /// Called once per contact involving the listening body.
    ///
    /// `contact.normal` is oriented to push `body` away from `other`.
    fn on_collision(&mut self, body: &mut RigidBody, other: &RigidBody, contact: &Contact, dt: f32);
}

/// One detected contact, as returned from [`PhysicsWorld::step`].
///
/// The normal is oriented from `b` toward `a`: moving `a` by
/// `normal * penetration` separates the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub normal: Vec3,
    pub penetration: f32,
}

/// One body intersected by a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space position where the ray enters the body
    pub point: Vec3,
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// The body that was hit
    pub body: BodyHandle,
}

/// The simulation: bodies, spatial partition, gravity, and the step loop.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: Slab<RigidBody>,
    grid: CollisionMap,
    listeners: HashMap<usize, Box<dyn CollisionListener>>,
    // Per-step scratch, reused to keep the hot path allocation-free
    sat_scratch: SatScratch,
    handles_scratch: Vec<usize>,
    candidates: Vec<BodyHandle>,
    tested_pairs: HashSet<(usize, usize)>,
}

impl PhysicsWorld {
    /// Creates an empty world from a configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        let grid = CollisionMap::new(config.cell_size, config.grid_half_extent, config.grid_center);
        Self {
            config,
            bodies: Slab::new(),
            grid,
            listeners: HashMap::new(),
            sat_scratch: SatScratch::default(),
            handles_scratch: Vec::new(),
            candidates: Vec::new(),
            tested_pairs: HashSet::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Registers a body and files it in the spatial partition.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let position = body.position;
        let is_static = body.is_static();
        let key = self.bodies.insert(body);
        let handle = BodyHandle(key);
        self.grid.insert(handle, position);
        debug!(?handle, ?position, is_static, "body registered");
        handle
    }

    /// Deregisters a body from the body list, the spatial partition, and
    /// the listener table.
    ///
    /// Must be called between steps (despawn handling), never from inside a
    /// collision listener.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        if !self.bodies.contains(handle.0) {
            return None;
        }
        self.grid.remove(handle);
        self.listeners.remove(&handle.0);
        let body = self.bodies.remove(handle.0);
        debug!(?handle, "body removed");
        Some(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0)
    }

    /// Registers the collision listener for a body, replacing any previous
    /// one.
    pub fn set_listener(&mut self, handle: BodyHandle, listener: Box<dyn CollisionListener>) {
        self.listeners.insert(handle.0, listener);
    }

    pub fn remove_listener(&mut self, handle: BodyHandle) -> Option<Box<dyn CollisionListener>> {
        self.listeners.remove(&handle.0)
    }

    /// Iterates all body handles.
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter().map(|(key, _)| BodyHandle(key))
    }

    /// Proximity query through the spatial partition: every body filed
    /// within `position ± max(radius, cell_size)`, plus the out-of-bounds
    /// overflow list when the range touches a grid boundary.
    ///
    /// The result is a superset of the bodies whose origin lies within
    /// `radius` — cell granularity over-includes, it never misses.
    pub fn bodies_near(&self, position: Vec3, radius: f32) -> Vec<BodyHandle> {
        let mut out = Vec::new();
        self.grid.query(position, radius, &mut out);
        out
    }

    /// Current poses of all dynamic bodies, for the render layer to copy
    /// onto its meshes. One-way: physics → visual.
    pub fn poses(&self) -> impl Iterator<Item = (BodyHandle, Vec3, Quat)> + '_ {
        self.bodies
            .iter()
            .filter(|(_, body)| !body.is_static())
            .map(|(key, body)| (BodyHandle(key), body.position, body.orientation))
    }

    /// Advances the simulation one frame.
    ///
    /// The delta is clamped to `config.max_delta` so frame hitches cannot
    /// destabilize the integration. All dynamic bodies are integrated
    /// before any collision is tested (integrate-then-detect), then each
    /// surviving pair's listeners fire and the contact is recorded in the
    /// returned event list.
    pub fn step(&mut self, delta: f32) -> Vec<ContactEvent> {
        let dt = delta.min(self.config.max_delta);
        let mut events = Vec::new();
        if dt <= 0.0 {
            return events;
        }

        // Phase 1: integrate every dynamic body, then refresh its grid cell
        self.handles_scratch.clear();
        self.handles_scratch.extend(self.bodies.iter().map(|(key, _)| key));
        for idx in 0..self.handles_scratch.len() {
            let key = self.handles_scratch[idx];
            if self.bodies[key].is_static() {
                continue;
            }
            let gravity = self.config.gravity;
            let bound = self.config.numeric_bound;
            self.bodies[key].step(dt, gravity, Vec3::ZERO, bound);
            let position = self.bodies[key].position;
            self.grid.insert(BodyHandle(key), position);
        }

        // Phase 2: candidate pruning + narrow phase against updated poses
        self.tested_pairs.clear();
        for idx in 0..self.handles_scratch.len() {
            let i = self.handles_scratch[idx];
            if self.bodies[i].is_static() {
                continue;
            }

            if self.config.use_spatial_grid {
                let sphere = self.bodies[i].world_sphere();
                let radius = sphere.radius + self.config.collision_tolerance;
                self.grid.query(sphere.center, radius, &mut self.candidates);
            } else {
                // O(n²) fallback: every other body is a candidate
                self.candidates.clear();
                self.candidates
                    .extend(self.bodies.iter().map(|(key, _)| BodyHandle(key)));
            }

            let bounds_i = self.bodies[i]
                .world_bounds()
                .expanded(self.config.collision_tolerance);
            for c_idx in 0..self.candidates.len() {
                let j = self.candidates[c_idx].0;
                if j == i {
                    continue;
                }
                let pair = (i.min(j), i.max(j));
                if !self.tested_pairs.insert(pair) {
                    continue;
                }

                // Cheap bounding-volume rejection before the exact test
                if !bounds_i.intersects(&self.bodies[j].world_bounds()) {
                    continue;
                }

                let contact = {
                    let a = &self.bodies[i];
                    let b = &self.bodies[j];
                    sat::check_collision(a, b, &mut self.sat_scratch)
                };
                let Some(contact) = contact else { continue };

                events.push(ContactEvent {
                    a: BodyHandle(i),
                    b: BodyHandle(j),
                    normal: contact.normal,
                    penetration: contact.penetration,
                });

                // Both sides hear about the contact, each with the normal
                // oriented to push itself away
                if let Some(mut listener) = self.listeners.remove(&i) {
                    if let Some((body, other)) = self.bodies.get2_mut(i, j) {
                        listener.on_collision(body, other, &contact, dt);
                    }
                    self.listeners.insert(i, listener);
                }
                if let Some(mut listener) = self.listeners.remove(&j) {
                    let flipped = Contact {
                        normal: -contact.normal,
                        penetration: contact.penetration,
                    };
                    if let Some((body, other)) = self.bodies.get2_mut(j, i) {
                        listener.on_collision(body, other, &flipped, dt);
                    }
                    self.listeners.insert(j, listener);
                }
            }
        }

        events
    }

    /// Casts a ray against every registered body.
    ///
    /// Returns one hit per intersected body (the closest face hit), sorted
    /// ascending by distance. `exclude` skips the shooter's own body so a
    /// weapon never hits its wielder.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Vec<RayHit> {
        let ray = Ray::new(origin, direction);
        let mut hits = Vec::new();
        if ray.direction == Vec3::ZERO {
            return hits;
        }

        let mut faces = Vec::new();
        for (key, body) in self.bodies.iter() {
            let handle = BodyHandle(key);
            if exclude == Some(handle) {
                continue;
            }

            // Bounding-box pre-test before per-face intersection
            match ray_aabb_intersect(ray.origin, ray.direction, &body.world_bounds()) {
                Some(t) if t <= max_distance => {}
                _ => continue,
            }

            body.shape.faces_into(&body.world_matrix(), &mut faces);
            let mut closest: Option<f32> = None;
            for face in &faces {
                if let Some(t) = ray_face_intersect(&ray, face) {
                    if t <= max_distance && closest.is_none_or(|c| t < c) {
                        closest = Some(t);
                    }
                }
            }
            if let Some(t) = closest {
                hits.push(RayHit {
                    point: ray.point_at(t),
                    distance: t,
                    body: handle,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }
}
