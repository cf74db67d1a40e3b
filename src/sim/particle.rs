//! The falling ball and the colour tags it leaves on obstacles

use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::error::PlinkoError;
use crate::seed::RandomSource;

/// Colour in hue / saturation / brightness (0-360, 0-100, 0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsb {
    pub hue: u16,
    pub saturation: u8,
    pub brightness: u8,
}

impl Hsb {
    pub const WHITE: Hsb = Hsb {
        hue: 0,
        saturation: 0,
        brightness: 100,
    };

    pub fn new(hue: u16, saturation: u8, brightness: u8) -> Self {
        Self {
            hue: hue % 360,
            saturation: saturation.min(100),
            brightness: brightness.min(100),
        }
    }

    /// Vivid random colour: any hue, saturation and brightness in 80..100
    ///
    /// Consumes exactly three draws (hue, saturation, brightness).
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        let hue = (rng.next_f64() * 360.0).floor() as u16;
        let saturation = 80 + (rng.next_f64() * 20.0).floor() as u8;
        let brightness = 80 + (rng.next_f64() * 20.0).floor() as u8;
        Self::new(hue, saturation, brightness)
    }

    /// CSS `hsl()` string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        let s = self.saturation as f32 / 100.0;
        let v = self.brightness as f32 / 100.0;
        let l = v * (1.0 - s / 2.0);
        let sl = if l <= 0.0 || l >= 1.0 {
            0.0
        } else {
            (v - l) / l.min(1.0 - l)
        };
        format!(
            "hsl({}, {:.0}%, {:.0}%)",
            self.hue,
            sl * 100.0,
            l * 100.0
        )
    }
}

/// Stable identifier of a particle within a session
pub type ParticleId = u32;

/// The ball
///
/// A particle starts as a preview with only a position. Dropping it attaches
/// a physics body; from then on its position comes from the simulation.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    /// Last known position (preview position, or body position after each step)
    pub pos: Vec2,
    pub radius: f32,
    pub color: Hsb,
    /// Title of the zone the ball is currently scored against
    pub selection: Option<String>,
    /// Physics body once dropped
    pub body: Option<RigidBodyHandle>,
    /// Consecutive steps spent below the rest speed
    pub(crate) slow_frames: u32,
    /// Steps spent below the scoring line
    pub(crate) settle_frames: u32,
}

impl Particle {
    pub fn new(id: ParticleId, pos: Vec2, radius: f32, color: Hsb) -> Result<Self, PlinkoError> {
        PlinkoError::check_positive("particle radius", radius)?;
        Ok(Self {
            id,
            pos,
            radius,
            color,
            selection: None,
            body: None,
            slow_frames: 0,
            settle_frames: 0,
        })
    }

    pub fn is_dropped(&self) -> bool {
        self.body.is_some()
    }

    /// More than the margin outside the sides, or below the bottom edge
    pub fn is_off_screen(&self, board_width: f32, board_height: f32, margin: f32) -> bool {
        self.pos.x < -margin || self.pos.x > board_width + margin || self.pos.y > board_height + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeededRandom;

    #[test]
    fn test_random_color_ranges() {
        let mut rng = SeededRandom::new("colours");
        for _ in 0..200 {
            let c = Hsb::random(&mut rng);
            assert!(c.hue < 360);
            assert!((80..100).contains(&c.saturation));
            assert!((80..100).contains(&c.brightness));
        }
    }

    #[test]
    fn test_random_color_is_seeded() {
        let a = Hsb::random(&mut SeededRandom::new("202501"));
        let b = Hsb::random(&mut SeededRandom::new("202501"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_css_conversion() {
        assert_eq!(Hsb::WHITE.to_css(), "hsl(0, 0%, 100%)");
        assert_eq!(Hsb::new(120, 100, 100).to_css(), "hsl(120, 100%, 50%)");
        assert_eq!(Hsb::new(0, 0, 0).to_css(), "hsl(0, 0%, 0%)");
    }

    #[test]
    fn test_invalid_radius() {
        assert!(Particle::new(1, Vec2::ZERO, 0.0, Hsb::WHITE).is_err());
        assert!(Particle::new(1, Vec2::ZERO, -3.0, Hsb::WHITE).is_err());
        assert!(Particle::new(1, Vec2::ZERO, 12.0, Hsb::WHITE).is_ok());
    }

    #[test]
    fn test_off_screen_bounds() {
        let mut p = Particle::new(1, Vec2::new(100.0, 100.0), 12.0, Hsb::WHITE).unwrap();
        assert!(!p.is_off_screen(768.0, 1610.0, 50.0));
        p.pos = Vec2::new(-51.0, 100.0);
        assert!(p.is_off_screen(768.0, 1610.0, 50.0));
        p.pos = Vec2::new(818.5, 100.0);
        assert!(p.is_off_screen(768.0, 1610.0, 50.0));
        p.pos = Vec2::new(300.0, 1660.5);
        assert!(p.is_off_screen(768.0, 1610.0, 50.0));
        // Above the board is never off-screen
        p.pos = Vec2::new(300.0, -500.0);
        assert!(!p.is_off_screen(768.0, 1610.0, 50.0));
    }
}
