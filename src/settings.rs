//! Board tuning and player preferences
//!
//! Persisted in LocalStorage in the browser; the native CLI reads the same
//! JSON from a file.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::BoardConfig;

/// Settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlinkoSettings {
    // === Board ===
    pub board_width: f32,
    pub board_height: f32,
    /// Reference zone width; more width means more zones
    pub column_width: f32,
    pub min_columns: usize,
    pub min_rows: usize,
    pub peg_radius: f32,
    pub ball_radius: f32,

    // === Physics ===
    /// Downward gravity (px/s²)
    pub gravity: f32,
    pub ball_restitution: f32,
    pub ball_friction: f32,

    // === Timing ===
    pub countdown_step_ms: f64,
    /// Pause between an interactive result and the next round
    pub reset_delay_ms: f64,

    // === Audio ===
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    // === View ===
    /// Scroll the page to keep the falling ball in view
    pub follow_ball: bool,
}

impl Default for PlinkoSettings {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            column_width: COLUMN_WIDTH,
            min_columns: MIN_COLUMNS,
            min_rows: MIN_ROWS,
            peg_radius: PEG_RADIUS,
            ball_radius: BALL_RADIUS,

            gravity: GRAVITY,
            ball_restitution: BALL_RESTITUTION,
            ball_friction: BALL_FRICTION,

            countdown_step_ms: COUNTDOWN_STEP_MS,
            reset_delay_ms: RESET_DELAY_MS,

            sound: true,
            volume: 0.8,

            follow_ball: true,
        }
    }
}

impl PlinkoSettings {
    /// Layout and physics input for the session
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            width: self.board_width,
            height: self.board_height,
            column_width: self.column_width,
            min_columns: self.min_columns,
            min_rows: self.min_rows,
            peg_radius: self.peg_radius,
            ball_radius: self.ball_radius,
            gravity: self.gravity,
            ball_restitution: self.ball_restitution,
            ball_friction: self.ball_friction,
        }
    }

    /// Volume actually applied to sounds (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "plinko_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_board() {
        let settings = PlinkoSettings::default();
        assert_eq!(settings.board_config(), BoardConfig::default());
        assert_eq!(settings.countdown_step_ms, 800.0);
        assert_eq!(settings.reset_delay_ms, 2000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = PlinkoSettings::from_json(r#"{"column_width": 192, "sound": false}"#).unwrap();
        assert_eq!(settings.column_width, 192.0);
        assert!(!settings.sound);
        assert_eq!(settings.board_width, BOARD_WIDTH);
        assert!(settings.follow_ball);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(PlinkoSettings::from_json("{ not json").is_err());
        assert!(PlinkoSettings::from_json(r#"{"gravity": "down"}"#).is_err());
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = PlinkoSettings {
            volume: 1.7,
            ..Default::default()
        };
        assert_eq!(settings.effective_volume(), 1.0);
        settings.sound = false;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_round_trip_json() {
        let settings = PlinkoSettings {
            min_columns: 6,
            follow_ball: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(PlinkoSettings::from_json(&json).unwrap(), settings);
    }
}
