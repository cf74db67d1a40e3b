//! One board and its round state
//!
//! A `PlinkoSession` owns everything a round touches: the layout, the zone
//! assignment, the physics world, the ball and the random source. It knows
//! nothing about time; the sequencer decides when to drop and when to reset.

use glam::Vec2;

use super::events::{CollisionEvent, Obstacle, PlinkoEvent};
use super::layout::{BoardConfig, BoardLayout, assign_zones, layout};
use super::particle::{Hsb, Particle, ParticleId};
use super::scoring;
use super::world::{BodyTag, PhysicsWorld};
use crate::catalog::Catalog;
use crate::consts::{
    OFF_SCREEN_MARGIN, REST_FRAMES, REST_SPEED, SETTLE_TIMEOUT_FRAMES, SIM_DT,
};
use crate::error::PlinkoError;
use crate::seed::{RandomSource, SeededRandom};

pub struct PlinkoSession {
    config: BoardConfig,
    catalog: Catalog,
    rng: Box<dyn RandomSource>,
    /// Seed of a seeded (one-shot, automatic) round
    seed: Option<String>,
    layout: BoardLayout,
    /// Left-to-right titles; empty until assigned
    zones: Vec<String>,
    world: PhysicsWorld,
    /// The preview or the dropped ball; never more than one
    ball: Option<Particle>,
    /// Gate for the single drop of a round
    dropped: bool,
    resolved: Option<String>,
    next_id: ParticleId,
}

impl PlinkoSession {
    /// Build the board and assign zones from `rng`
    pub fn new(
        config: BoardConfig,
        catalog: Catalog,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, PlinkoError> {
        let layout = layout(&config)?;
        let world = PhysicsWorld::from_layout(&layout, config.gravity);
        let mut session = Self {
            config,
            catalog,
            rng,
            seed: None,
            layout,
            zones: Vec::new(),
            world,
            ball: None,
            dropped: false,
            resolved: None,
            next_id: 1,
        };
        session.assign();
        Ok(session)
    }

    /// Session whose every draw derives from `seed`
    pub fn seeded(seed: &str, catalog: Catalog, config: BoardConfig) -> Result<Self, PlinkoError> {
        let mut session = Self::new(config, catalog, Box::new(SeededRandom::new(seed)))?;
        session.seed = Some(seed.to_string());
        log::info!("Seeded board '{}': {:?}", seed, session.zones);
        Ok(session)
    }

    /// Session the user drops into by hand
    ///
    /// Zones and ball colours still come from `seed` (normally the current
    /// week); only the drop position is left to the player.
    pub fn interactive(
        seed: &str,
        catalog: Catalog,
        config: BoardConfig,
    ) -> Result<Self, PlinkoError> {
        let session = Self::new(config, catalog, Box::new(SeededRandom::new(seed)))?;
        log::info!("Interactive board from seed '{}': {:?}", seed, session.zones);
        Ok(session)
    }

    fn assign(&mut self) {
        self.zones = assign_zones(self.catalog.titles(), self.layout.columns, self.rng.as_mut());
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn zone_width(&self) -> f32 {
        self.layout.zone_width()
    }

    pub fn ball(&self) -> Option<&Particle> {
        self.ball.as_ref()
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Final title once the ball came to rest
    pub fn resolved(&self) -> Option<&str> {
        self.resolved.as_deref()
    }

    /// Particles tracked by the session (preview included)
    pub fn particle_count(&self) -> usize {
        usize::from(self.ball.is_some())
    }

    /// Bodies being simulated
    pub fn dynamic_body_count(&self) -> usize {
        self.world.dynamic_body_count()
    }

    /// Show or move the preview ball at `x`
    ///
    /// No-op once the round's ball has been dropped.
    pub fn create_preview(&mut self, x: f32) -> Result<(), PlinkoError> {
        if self.dropped {
            return Ok(());
        }
        let pos = Vec2::new(x, self.config.ball_radius);
        match self.ball.as_mut() {
            Some(ball) => ball.pos = pos,
            None => {
                let color = Hsb::random(self.rng.as_mut());
                self.ball = Some(Particle::new(self.next_id, pos, self.config.ball_radius, color)?);
                self.next_id += 1;
            }
        }
        Ok(())
    }

    pub fn clear_preview(&mut self) {
        if !self.dropped {
            self.ball = None;
        }
    }

    /// Attach a physics body to the preview and start simulating it
    ///
    /// Returns `None` when there is nothing to drop or the round already
    /// has its ball.
    pub fn drop_ball(&mut self) -> Result<Option<PlinkoEvent>, PlinkoError> {
        if self.dropped {
            return Ok(None);
        }
        let Some(ball) = self.ball.as_mut() else {
            return Ok(None);
        };
        let handle = self.world.add_ball(
            ball.id,
            ball.pos,
            ball.radius,
            self.config.ball_restitution,
            self.config.ball_friction,
        )?;
        ball.body = Some(handle);
        self.dropped = true;
        log::info!("Dropped ball {} at x={:.1}", ball.id, ball.pos.x);
        Ok(Some(PlinkoEvent::Dropped {
            particle: ball.id,
            x: ball.pos.x,
        }))
    }

    /// Preview at `x` and drop immediately
    pub fn drop_at(&mut self, x: f32) -> Result<Option<PlinkoEvent>, PlinkoError> {
        self.create_preview(x)?;
        self.drop_ball()
    }

    /// Drop position drawn from the session's random source
    pub fn seeded_drop_x(&mut self) -> f32 {
        let r = self.rng.next_f64() as f32;
        let spacing = self.layout.spacing;
        spacing / 2.0 + r * (self.layout.width - spacing)
    }

    /// Seeded round: colour first, then position, then drop
    pub fn seeded_drop(&mut self) -> Result<Option<PlinkoEvent>, PlinkoError> {
        if self.dropped {
            return Ok(None);
        }
        let color = Hsb::random(self.rng.as_mut());
        let x = self.seeded_drop_x();
        let pos = Vec2::new(x, self.config.ball_radius);
        self.ball = Some(Particle::new(self.next_id, pos, self.config.ball_radius, color)?);
        self.next_id += 1;
        self.drop_ball()
    }

    pub fn is_off_screen(&self, particle: &Particle) -> bool {
        particle.is_off_screen(self.layout.width, self.layout.height, OFF_SCREEN_MARGIN)
    }

    /// Advance the round by one physics step
    ///
    /// Order within a step: physics, colour tagging, off-screen removal,
    /// zone resolution. Does nothing unless a ball has been dropped.
    pub fn step(&mut self) -> Vec<PlinkoEvent> {
        let mut events = Vec::new();
        let Some(handle) = self.ball.as_ref().and_then(|b| b.body) else {
            return events;
        };

        let contacts = self.world.step();

        let Some(ball) = self.ball.as_mut() else {
            return events;
        };
        for contact in contacts {
            let other = match contact.other {
                BodyTag::Peg(i) => {
                    if let Some(peg) = self.layout.pegs.get_mut(i) {
                        peg.color = ball.color;
                    }
                    Obstacle::Peg(i)
                }
                BodyTag::Boundary(i) => {
                    if let Some(boundary) = self.layout.boundaries.get_mut(i) {
                        boundary.color = ball.color;
                    }
                    Obstacle::Boundary(i)
                }
                BodyTag::Ball(_) => continue,
            };
            events.push(PlinkoEvent::Collision(CollisionEvent {
                particle: contact.ball,
                other,
                color: ball.color,
            }));
        }

        let Some(state) = self.world.body_state(handle) else {
            return events;
        };
        // Speed as the ball was actually seen to move; the solver's velocity
        // keeps gravity's share while the ball sits on the floor
        let moved = state.pos.distance(ball.pos) / SIM_DT;
        ball.pos = state.pos;

        if ball.is_off_screen(self.layout.width, self.layout.height, OFF_SCREEN_MARGIN) {
            let id = ball.id;
            log::info!("Ball {} left the board at {:?}", id, ball.pos);
            self.world.remove_ball(handle);
            self.ball = None;
            if self.resolved.is_none() {
                events.push(PlinkoEvent::BallLost(id));
            }
            return events;
        }

        if self.resolved.is_some() {
            return events;
        }

        let threshold = self.config.scoring_threshold();
        let zone_width = self.layout.zone_width();
        let Some(title) = scoring::resolve(ball.pos, threshold, zone_width, &self.zones) else {
            ball.slow_frames = 0;
            ball.settle_frames = 0;
            return events;
        };
        if ball.selection.as_deref() != Some(title) {
            ball.selection = Some(title.to_string());
            events.push(PlinkoEvent::SelectionChanged(title.to_string()));
        }

        if moved < REST_SPEED {
            ball.slow_frames += 1;
        } else {
            ball.slow_frames = 0;
        }
        ball.settle_frames += 1;
        let at_rest = state.sleeping || ball.slow_frames >= REST_FRAMES;
        if at_rest || ball.settle_frames >= SETTLE_TIMEOUT_FRAMES {
            log::info!("Ball {} resolved to '{}'", ball.id, title);
            self.resolved = Some(title.to_string());
            events.push(PlinkoEvent::Resolved(title.to_string()));
        }
        events
    }

    /// Reshuffle the zones while no ball is in play
    pub fn randomize(&mut self) -> bool {
        if self.dropped {
            return false;
        }
        self.assign();
        log::debug!("Zones reshuffled: {:?}", self.zones);
        true
    }

    /// Clear the round: remove the ball, untag obstacles, reassign zones
    pub fn reset(&mut self) -> Result<(), PlinkoError> {
        if let Some(handle) = self.ball.take().and_then(|b| b.body) {
            self.world.remove_ball(handle);
        }
        self.dropped = false;
        self.resolved = None;
        self.zones.clear();
        self.layout = layout(&self.config)?;
        self.world = PhysicsWorld::from_layout(&self.layout, self.config.gravity);
        self.assign();
        Ok(())
    }

    /// New board size; discards the round in progress
    pub fn relayout(&mut self, width: f32, height: f32) -> Result<(), PlinkoError> {
        let config = BoardConfig {
            width,
            height,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        log::info!("Board resized to {}x{}, round discarded", width, height);
        self.reset()
    }
}
