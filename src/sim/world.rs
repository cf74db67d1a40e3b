//! Physics world backed by rapier2d
//!
//! Pegs and walls are fixed bodies, the ball is the only dynamic body. Contact
//! starts are queued by a collector during the step and handed back tagged
//! with what the ball touched.
//!
//! The API speaks board pixels. Inside, the world is simulated in metres
//! (`PIXELS_PER_METER`), the scale rapier's sleep thresholds and contact
//! tolerances are tuned for.

use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use super::layout::BoardLayout;
use super::particle::ParticleId;
use crate::consts::{BALL_LINEAR_DAMPING, PIXELS_PER_METER, SIM_DT};
use crate::error::PlinkoError;

fn to_physics(v: Vec2) -> Vector<Real> {
    vector![v.x / PIXELS_PER_METER, v.y / PIXELS_PER_METER]
}

fn to_pixels(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y) * PIXELS_PER_METER
}

/// What a collider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    /// Index into `BoardLayout::pegs`
    Peg(usize),
    /// Index into `BoardLayout::boundaries`
    Boundary(usize),
    Ball(ParticleId),
}

/// A ball touched something during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub ball: ParticleId,
    pub other: BodyTag,
}

/// Snapshot of a dynamic body after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pos: Vec2,
    pub speed: f32,
    pub sleeping: bool,
}

/// Queues contact starts while the pipeline runs
#[derive(Default)]
struct ContactCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        match self.started.lock() {
            Ok(mut started) => std::mem::take(&mut *started),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, _) = event {
            if let Ok(mut started) = self.started.lock() {
                started.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// The one simulation world of a page
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    collector: ContactCollector,
    tags: HashMap<ColliderHandle, BodyTag>,
}

impl PhysicsWorld {
    /// Empty world with downward gravity (px/s²)
    pub fn new(gravity: f32) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = SIM_DT;
        Self {
            gravity: vector![0.0, gravity / PIXELS_PER_METER],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            collector: ContactCollector::default(),
            tags: HashMap::new(),
        }
    }

    /// World populated with the static pegs and walls of a layout
    pub fn from_layout(layout: &BoardLayout, gravity: f32) -> Self {
        let mut world = Self::new(gravity);
        for (i, peg) in layout.pegs.iter().enumerate() {
            let collider = ColliderBuilder::ball(peg.radius / PIXELS_PER_METER).build();
            world.insert_fixed(peg.pos, collider, BodyTag::Peg(i));
        }
        for (i, boundary) in layout.boundaries.iter().enumerate() {
            let half = boundary.half_extents() / PIXELS_PER_METER;
            let collider = ColliderBuilder::cuboid(half.x, half.y).build();
            world.insert_fixed(boundary.center, collider, BodyTag::Boundary(i));
        }
        world
    }

    fn insert_fixed(&mut self, pos: Vec2, collider: Collider, tag: BodyTag) {
        let body = RigidBodyBuilder::fixed().translation(to_physics(pos)).build();
        let handle = self.bodies.insert(body);
        let collider = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.tags.insert(collider, tag);
    }

    /// Insert a dynamic ball; contacts involving it are reported by `step`
    ///
    /// Restitution combines with `Max` and friction with `Min`, so the ball's
    /// own coefficients win against the untuned pegs and walls. Air drag
    /// (`BALL_LINEAR_DAMPING`) bleeds off the energy a frictionless ball
    /// would otherwise keep sliding between two dividers.
    pub fn add_ball(
        &mut self,
        id: ParticleId,
        pos: Vec2,
        radius: f32,
        restitution: f32,
        friction: f32,
    ) -> Result<RigidBodyHandle, PlinkoError> {
        PlinkoError::check_positive("ball radius", radius)?;

        let body = RigidBodyBuilder::dynamic()
            .translation(to_physics(pos))
            .linear_damping(BALL_LINEAR_DAMPING)
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::ball(radius / PIXELS_PER_METER)
            .restitution(restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(friction)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let handle = self.bodies.insert(body);
        let collider = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.tags.insert(collider, BodyTag::Ball(id));
        Ok(handle)
    }

    /// Remove a ball and its collider
    pub fn remove_ball(&mut self, handle: RigidBodyHandle) {
        let removed = self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if let Some(body) = removed {
            for collider in body.colliders() {
                self.tags.remove(collider);
            }
        }
    }

    /// Advance one fixed step and return the contacts that started during it
    pub fn step(&mut self) -> Vec<Contact> {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.collector,
        );

        self.collector
            .drain()
            .into_iter()
            .filter_map(|(a, b)| {
                let tag_a = *self.tags.get(&a)?;
                let tag_b = *self.tags.get(&b)?;
                match (tag_a, tag_b) {
                    (BodyTag::Ball(ball), other) | (other, BodyTag::Ball(ball)) => {
                        Some(Contact { ball, other })
                    }
                    _ => None,
                }
            })
            .collect()
    }

    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle)?;
        Some(BodyState {
            pos: to_pixels(body.translation()),
            speed: body.linvel().norm() * PIXELS_PER_METER,
            sleeping: body.is_sleeping(),
        })
    }

    /// Number of simulated (non-static) bodies
    pub fn dynamic_body_count(&self) -> usize {
        self.bodies.iter().filter(|(_, b)| b.is_dynamic()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::layout::{BoardConfig, layout};

    #[test]
    fn test_world_from_layout_is_static() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let world = PhysicsWorld::from_layout(&layout, 1000.0);
        assert_eq!(world.dynamic_body_count(), 0);
        assert_eq!(world.tags.len(), layout.pegs.len() + layout.boundaries.len());
    }

    #[test]
    fn test_ball_falls_under_gravity() {
        let mut world = PhysicsWorld::new(1000.0);
        let handle = world
            .add_ball(1, Vec2::new(100.0, 0.0), 12.0, 0.8, 0.0)
            .unwrap();
        for _ in 0..30 {
            world.step();
        }
        let state = world.body_state(handle).unwrap();
        assert!(state.pos.y > 50.0);
        assert!((state.pos.x - 100.0).abs() < 1e-3);
        assert!(state.speed > 0.0);
    }

    #[test]
    fn test_contact_reported_on_floor() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let mut world = PhysicsWorld::from_layout(&layout, 1000.0);
        // Drop inside the first zone, below the peg rows
        let start = Vec2::new(layout.zone_width() / 2.0, layout.height - 60.0);
        world.add_ball(7, start, 12.0, 0.8, 0.0).unwrap();

        let mut contacts = Vec::new();
        for _ in 0..120 {
            contacts.extend(world.step());
        }
        assert!(!contacts.is_empty());
        assert!(contacts.iter().all(|c| c.ball == 7));
        assert!(
            contacts
                .iter()
                .any(|c| matches!(c.other, BodyTag::Boundary(_)))
        );
    }

    #[test]
    fn test_ball_settles_on_floor() {
        let layout = layout(&BoardConfig::default()).unwrap();
        let mut world = PhysicsWorld::from_layout(&layout, 1000.0);
        // Mid-zone, below the pegs: falls, bounces and should come to a stop
        let start = Vec2::new(layout.zone_width() * 2.5, layout.height - 80.0);
        let handle = world.add_ball(3, start, 12.0, 0.8, 0.0).unwrap();
        for _ in 0..900 {
            world.step();
        }
        let state = world.body_state(handle).unwrap();
        assert!((state.pos.y - (layout.height - 12.0)).abs() < 1.0);
        assert!(state.speed < 20.0, "speed {}", state.speed);
    }

    #[test]
    fn test_body_state_in_pixels() {
        let mut world = PhysicsWorld::new(1000.0);
        let handle = world
            .add_ball(1, Vec2::new(250.0, 40.0), 12.0, 0.8, 0.0)
            .unwrap();
        let state = world.body_state(handle).unwrap();
        assert!((state.pos - Vec2::new(250.0, 40.0)).length() < 1e-3);
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_remove_ball() {
        let mut world = PhysicsWorld::new(1000.0);
        let handle = world.add_ball(1, Vec2::ZERO, 12.0, 0.8, 0.0).unwrap();
        assert_eq!(world.dynamic_body_count(), 1);
        world.remove_ball(handle);
        assert_eq!(world.dynamic_body_count(), 0);
        assert!(world.body_state(handle).is_none());
        assert!(world.tags.is_empty());
    }

    #[test]
    fn test_add_ball_rejects_bad_radius() {
        let mut world = PhysicsWorld::new(1000.0);
        assert!(world.add_ball(1, Vec2::ZERO, 0.0, 0.8, 0.0).is_err());
        assert_eq!(world.dynamic_body_count(), 0);
    }
}
