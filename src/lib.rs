//! Arcade Plinko - seeded Plinko board that picks the featured game
//!
//! Core modules:
//! - `seed`: Weekly seed derivation and the seeded pseudo-random generator
//! - `catalog`: Game list parsing
//! - `sim`: Board layout, physics world, scoring and the round session
//! - `sequencer`: Countdown / drop / resolve state machine on an injected clock
//! - `renderer`: Shape helpers and the Canvas 2D renderer (browser only)

pub mod audio;
pub mod catalog;
pub mod error;
pub mod history;
pub mod renderer;
pub mod seed;
pub mod sequencer;
pub mod settings;
pub mod sim;
pub mod timer;

pub use catalog::Catalog;
pub use error::PlinkoError;
pub use history::SelectionHistory;
pub use seed::{RandomSource, SeedParam, SeedSource, SeededRandom, get_seed};
pub use sequencer::{Mode, RoundPhase, Sequencer};
pub use settings::PlinkoSettings;
pub use sim::{PlinkoEvent, PlinkoSession, Prediction, predict};
pub use timer::{TimerHandle, Timers};

/// Board and timing constants of the reference layout
pub mod consts {
    /// Fixed simulation timestep (one physics step per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Reference canvas dimensions
    pub const BOARD_WIDTH: f32 = 768.0;
    pub const BOARD_HEIGHT: f32 = 1610.0;
    /// Reference zone width used to derive the column count
    pub const COLUMN_WIDTH: f32 = 64.0;
    pub const MIN_COLUMNS: usize = 4;
    pub const MIN_ROWS: usize = 6;
    /// Rows at the bottom of the grid left without pegs
    pub const PEG_FREE_ROWS: usize = 2;

    pub const PEG_RADIUS: f32 = 4.0;
    pub const BALL_RADIUS: f32 = 12.0;
    pub const BALL_RESTITUTION: f32 = 0.8;
    pub const BALL_FRICTION: f32 = 0.0;
    /// Downward gravity in px/s²
    pub const GRAVITY: f32 = 1000.0;
    /// Air drag on the ball; 1/s, about 2% of the velocity per step
    pub const BALL_LINEAR_DAMPING: f32 = 1.2;
    /// Board pixels per physics metre; rapier's tolerances are tuned for metres
    pub const PIXELS_PER_METER: f32 = 100.0;

    /// Zone divider walls at the bottom of the board
    pub const DIVIDER_WIDTH: f32 = 5.0;
    pub const DIVIDER_HEIGHT: f32 = 100.0;
    /// Enclosing walls
    pub const SIDE_WALL_WIDTH: f32 = 50.0;
    pub const FLOOR_HEIGHT: f32 = 100.0;

    /// Distance above the bottom edge where zone resolution starts
    pub const SCORING_MARGIN: f32 = 150.0;
    /// Slack outside the board before a particle counts as off-screen
    pub const OFF_SCREEN_MARGIN: f32 = 50.0;

    /// Below this speed (px/s, measured from the step's displacement) a
    /// ball counts as settling
    pub const REST_SPEED: f32 = 20.0;
    /// Consecutive settling steps before a ball rests
    pub const REST_FRAMES: u32 = 30;
    /// Steps below the scoring line after which a still-moving ball is
    /// resolved where it is
    pub const SETTLE_TIMEOUT_FRAMES: u32 = 600;

    /// Countdown cadence and labels for seeded rounds
    pub const COUNTDOWN_STEP_MS: f64 = 800.0;
    pub const COUNTDOWN_LABELS: [&str; 4] = ["3", "2", "1", "PLINKO!"];
    /// Delay before an interactive round resets after resolving
    pub const RESET_DELAY_MS: f64 = 2000.0;
    /// Quiet period after the last resize event before the board is rebuilt
    pub const RESIZE_DEBOUNCE_MS: f64 = 250.0;

    /// Label used for zones when the catalog is smaller than the column count
    pub const PLACEHOLDER_TITLE: &str = "-- No Game --";
}
