//! World Tests - Integration, Constraints, and Collision Dispatch
//!
//! End-to-end tests of the physics world: integrator sanity, axis
//! constraints, static-body immobility, listener dispatch, and the
//! integrate-then-detect step pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use shardfall_physics::physics::{
    CollisionListener, Constraints, Contact, Material, PhysicsConfig, PhysicsWorld, RigidBody,
    Shape,
};

fn world_with_gravity(gravity: Vec3) -> PhysicsWorld {
    let config = PhysicsConfig {
        gravity,
        ..PhysicsConfig::default()
    };
    PhysicsWorld::new(config)
}

fn frictionless_cube(position: Vec3, mass: f32) -> RigidBody {
    RigidBody::new(Shape::cuboid(Vec3::splat(0.5)), mass)
        .with_material(Material::frictionless())
        .with_position(position)
}

// ============================================================================
// Integrator Sanity
// ============================================================================

#[test]
fn test_fall_distance_after_one_second() {
    // mass 10, gravity -10, stepped in 0.1 increments for 1 second:
    // free fall predicts 0.5 * 10 * 1^2 = 5 units, within scheme tolerance
    let mut world = world_with_gravity(Vec3::new(0.0, -10.0, 0.0));
    let handle = world.add_body(frictionless_cube(Vec3::new(0.0, 100.0, 0.0), 10.0));

    for _ in 0..10 {
        world.step(0.1);
    }

    let fallen = 100.0 - world.body(handle).unwrap().position.y;
    assert!(
        (3.8..=5.7).contains(&fallen),
        "expected ~5 units of free fall, got {}",
        fallen
    );
}

#[test]
fn test_static_body_ignores_gravity_and_forces() {
    let mut world = world_with_gravity(Vec3::new(0.0, -10.0, 0.0));
    let handle = world.add_body(frictionless_cube(Vec3::new(0.0, 3.0, 0.0), 0.0));

    world.body_mut(handle).unwrap().apply_force(Vec3::new(1.0e6, 1.0e6, 1.0e6));
    for _ in 0..100 {
        world.step(0.1);
    }

    let body = world.body(handle).unwrap();
    assert_eq!(body.position, Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(body.linear_velocity, Vec3::ZERO);
}

#[test]
fn test_bottom_constraint_y_never_decreases() {
    let mut world = world_with_gravity(Vec3::new(0.0, -10.0, 0.0));
    let handle = world.add_body(
        frictionless_cube(Vec3::new(0.0, 2.0, 0.0), 1.0).with_constraints(Constraints::NEG_Y),
    );

    let mut last_y = 2.0;
    for _ in 0..100 {
        world.step(0.1);
        let y = world.body(handle).unwrap().position.y;
        assert!(y >= last_y, "y decreased from {} to {} under NEG_Y lock", last_y, y);
        last_y = y;
    }
}

#[test]
fn test_poses_lists_dynamic_bodies_only() {
    let mut world = world_with_gravity(Vec3::ZERO);
    let dynamic = world.add_body(frictionless_cube(Vec3::new(5.0, 0.0, 0.0), 1.0));
    let _static = world.add_body(frictionless_cube(Vec3::ZERO, 0.0));

    let poses: Vec<_> = world.poses().collect();
    assert_eq!(poses.len(), 1);
    assert_eq!(poses[0].0, dynamic);
    assert_eq!(poses[0].1, Vec3::new(5.0, 0.0, 0.0));
}

// ============================================================================
// Collision Dispatch
// ============================================================================

#[derive(Default)]
struct ContactLog {
    contacts: Vec<(Vec3, f32)>,
}

struct LogListener(Rc<RefCell<ContactLog>>);

impl CollisionListener for LogListener {
    fn on_collision(
        &mut self,
        _body: &mut RigidBody,
        _other: &RigidBody,
        contact: &Contact,
        _dt: f32,
    ) {
        self.0
            .borrow_mut()
            .contacts
            .push((contact.normal, contact.penetration));
    }
}

#[test]
fn test_falling_body_reports_floor_contact() {
    let mut world = world_with_gravity(Vec3::new(0.0, -10.0, 0.0));
    let floor = Shape::cuboid(Vec3::new(10.0, 0.5, 10.0));
    world.add_body(RigidBody::new_static(floor, Vec3::new(0.0, -0.5, 0.0)));

    let log = Rc::new(RefCell::new(ContactLog::default()));
    let faller = world.add_body(frictionless_cube(Vec3::new(0.0, 0.8, 0.0), 1.0));
    world.set_listener(faller, Box::new(LogListener(log.clone())));

    // Fall until the cube sinks into the floor slab
    let mut saw_contact = false;
    for _ in 0..200 {
        let events = world.step(0.016);
        if !events.is_empty() {
            saw_contact = true;
            break;
        }
    }

    assert!(saw_contact, "falling cube never contacted the floor");
    let log = log.borrow();
    assert!(!log.contacts.is_empty());
    let (normal, penetration) = log.contacts[0];
    // The floor pushes the faller up
    assert!(normal.y > 0.9, "contact normal {:?} should point up", normal);
    assert!(penetration > 0.0);
}

#[test]
fn test_events_returned_even_without_listeners() {
    let mut world = world_with_gravity(Vec3::ZERO);
    world.add_body(frictionless_cube(Vec3::new(0.25, 0.0, 0.0), 1.0));
    world.add_body(frictionless_cube(Vec3::ZERO, 1.0));

    let events = world.step(0.016);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_listener_position_correction_separates_pair() {
    struct PushOut;
    impl CollisionListener for PushOut {
        fn on_collision(
            &mut self,
            body: &mut RigidBody,
            _other: &RigidBody,
            contact: &Contact,
            _dt: f32,
        ) {
            body.position += contact.normal * contact.penetration;
        }
    }

    let mut world = world_with_gravity(Vec3::ZERO);
    let a = world.add_body(frictionless_cube(Vec3::new(0.3, 0.0, 0.0), 1.0));
    world.add_body(frictionless_cube(Vec3::ZERO, 1.0));
    world.set_listener(a, Box::new(PushOut));

    assert_eq!(world.step(0.016).len(), 1);
    assert!(
        world.step(0.016).is_empty(),
        "pair still overlapping after listener resolution"
    );
}

#[test]
fn test_removed_body_no_longer_collides() {
    let mut world = world_with_gravity(Vec3::ZERO);
    let a = world.add_body(frictionless_cube(Vec3::new(0.25, 0.0, 0.0), 1.0));
    world.add_body(frictionless_cube(Vec3::ZERO, 1.0));

    assert_eq!(world.step(0.016).len(), 1);
    world.remove_body(a);
    assert!(world.step(0.016).is_empty());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_json_round_trip_into_world() {
    let config = PhysicsConfig::from_json(
        r#"{
            "gravity": [0.0, -25.0, 0.0],
            "cell_size": 2.0,
            "grid_half_extent": 16
        }"#,
    )
    .unwrap();
    assert_eq!(config.gravity.y, -25.0);

    let mut world = PhysicsWorld::new(config);
    let handle = world.add_body(frictionless_cube(Vec3::new(0.0, 50.0, 0.0), 1.0));
    world.step(0.1);
    assert!(world.body(handle).unwrap().position.y < 50.0);
    assert_eq!(world.gravity().y, -25.0);
}
