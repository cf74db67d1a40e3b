//! Board simulation
//!
//! Everything that decides which game gets picked lives here:
//! - Fixed timestep only
//! - All randomness comes from the session's `RandomSource`
//! - No rendering, DOM or timer dependencies

pub mod events;
pub mod layout;
pub mod particle;
pub mod predict;
pub mod scoring;
pub mod session;
pub mod world;

pub use events::{CollisionEvent, EventHandlers, Obstacle, PlinkoEvent};
pub use layout::{BoardConfig, BoardLayout, Boundary, BoundaryKind, Peg, assign_zones, layout};
pub use particle::{Hsb, Particle, ParticleId};
pub use predict::{Prediction, predict};
pub use scoring::{resolve, zone_index};
pub use session::PlinkoSession;
pub use world::{BodyState, BodyTag, Contact, PhysicsWorld};
