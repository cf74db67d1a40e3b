//! Audio feedback using the Web Audio API
//!
//! Procedurally generated clicks and chimes - no sound files. Playback is
//! best effort: a missing or suspended AudioContext just means silence.

use crate::sim::{Obstacle, PlinkoEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits a peg
    PegClick,
    /// Ball hits a divider or an enclosing wall
    WallClick,
    /// Countdown number shown
    CountdownTick,
    /// Countdown finished, ball released
    CountdownGo,
    /// Ball settled in a zone
    Selected,
    /// Ball left the board
    Lost,
}

impl SoundEffect {
    /// Sound to play for a round event, if any
    pub fn for_event(event: &PlinkoEvent) -> Option<Self> {
        match event {
            PlinkoEvent::Collision(c) => Some(match c.other {
                Obstacle::Peg(_) => SoundEffect::PegClick,
                Obstacle::Boundary(_) => SoundEffect::WallClick,
            }),
            PlinkoEvent::Countdown(label) if label.parse::<u32>().is_ok() => {
                Some(SoundEffect::CountdownTick)
            }
            PlinkoEvent::Countdown(_) => Some(SoundEffect::CountdownGo),
            PlinkoEvent::Resolved(_) => Some(SoundEffect::Selected),
            PlinkoEvent::BallLost(_) => Some(SoundEffect::Lost),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use manager::AudioManager;

#[cfg(target_arch = "wasm32")]
mod manager {
    use super::SoundEffect;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the board
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set volume (0.0 - 1.0)
        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::PegClick => self.play_click(ctx, vol, 800.0),
                SoundEffect::WallClick => self.play_click(ctx, vol, 520.0),
                SoundEffect::CountdownTick => self.play_beep(ctx, vol, 440.0, 0.12),
                SoundEffect::CountdownGo => self.play_beep(ctx, vol, 880.0, 0.3),
                SoundEffect::Selected => self.play_selected(ctx, vol),
                SoundEffect::Lost => self.play_lost(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// 30ms sine click
        fn play_click(&self, ctx: &AudioContext, vol: f32, freq: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.03)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.03).ok();
        }

        fn play_beep(&self, ctx: &AudioContext, vol: f32, freq: f32, length: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.02).ok();
        }

        /// Rising major arpeggio
        fn play_selected(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [523.25_f32, 659.25, 783.99, 1046.5].iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let start = t + i as f64 * 0.09;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.35)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.4).ok();
            }
        }

        /// Falling whistle
        fn play_lost(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(600.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(120.0, t + 0.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CollisionEvent, Hsb};

    #[test]
    fn test_sound_for_event() {
        let hit = |other| {
            PlinkoEvent::Collision(CollisionEvent {
                particle: 1,
                other,
                color: Hsb::WHITE,
            })
        };
        assert_eq!(SoundEffect::for_event(&hit(Obstacle::Peg(3))), Some(SoundEffect::PegClick));
        assert_eq!(
            SoundEffect::for_event(&hit(Obstacle::Boundary(0))),
            Some(SoundEffect::WallClick)
        );
        assert_eq!(
            SoundEffect::for_event(&PlinkoEvent::Countdown("2")),
            Some(SoundEffect::CountdownTick)
        );
        assert_eq!(
            SoundEffect::for_event(&PlinkoEvent::Countdown("PLINKO!")),
            Some(SoundEffect::CountdownGo)
        );
        assert_eq!(
            SoundEffect::for_event(&PlinkoEvent::Resolved("Zelda".into())),
            Some(SoundEffect::Selected)
        );
        assert_eq!(SoundEffect::for_event(&PlinkoEvent::Reset), None);
    }
}
