//! Headless seeded rounds
//!
//! Runs the same round a browser would run for a seed, without a countdown
//! or a canvas, and reports where the ball ends up.

use serde::{Deserialize, Serialize};

use super::events::PlinkoEvent;
use super::layout::BoardConfig;
use super::session::PlinkoSession;
use crate::catalog::Catalog;
use crate::error::PlinkoError;

/// Outcome of a seeded round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub seed: String,
    pub zones: Vec<String>,
    pub drop_x: f32,
    /// `None` when the ball was lost or did not settle within the step budget
    pub title: Option<String>,
    pub steps: usize,
}

pub fn predict(
    seed: &str,
    catalog: &Catalog,
    config: &BoardConfig,
    max_steps: usize,
) -> Result<Prediction, PlinkoError> {
    let mut session = PlinkoSession::seeded(seed, catalog.clone(), *config)?;
    let zones = session.zones().to_vec();

    let drop_x = match session.seeded_drop()? {
        Some(PlinkoEvent::Dropped { x, .. }) => x,
        _ => session.ball().map(|b| b.pos.x).unwrap_or_default(),
    };

    let mut title = None;
    let mut steps = 0;
    'run: while steps < max_steps {
        steps += 1;
        for event in session.step() {
            match event {
                PlinkoEvent::Resolved(t) => {
                    title = Some(t);
                    break 'run;
                }
                PlinkoEvent::BallLost(_) => break 'run,
                _ => {}
            }
        }
    }

    if title.is_none() {
        log::warn!("Seed '{}' did not resolve after {} steps", seed, steps);
    }

    Ok(Prediction {
        seed: seed.to_string(),
        zones,
        drop_x,
        title,
        steps,
    })
}
