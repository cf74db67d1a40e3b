//! Round state machine
//!
//! Interactive rounds follow the pointer, drop on click and reset a couple
//! of seconds after the ball settles. Seeded rounds run a countdown, drop at
//! a seeded position and stay on the result; they happen once per page load.
//!
//! The sequencer owns no clock. Every entry point that depends on time takes
//! the current timestamp in milliseconds, and `frame` is called once per
//! animation frame.

use crate::consts::{COUNTDOWN_LABELS, COUNTDOWN_STEP_MS, RESET_DELAY_MS, RESIZE_DEBOUNCE_MS};
use crate::error::PlinkoError;
use crate::sim::{BoardConfig, EventHandlers, PlinkoEvent, PlinkoSession};
use crate::timer::{TimerHandle, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No seed: the user previews and drops
    Interactive,
    /// Seed present: countdown then automatic drop
    Seeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Previewing,
    /// Index into `COUNTDOWN_LABELS` currently displayed
    Countdown { step: usize },
    Dropping,
    /// Ball settled or was lost
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cue {
    Countdown(usize),
    Reset,
    Resize { width: f32, height: f32 },
}

pub struct Sequencer {
    mode: Mode,
    session: PlinkoSession,
    phase: RoundPhase,
    timers: Timers<Cue>,
    countdown: Option<TimerHandle>,
    pending_reset: Option<TimerHandle>,
    pending_resize: Option<TimerHandle>,
    handlers: EventHandlers,
    countdown_step_ms: f64,
    reset_delay_ms: f64,
    now: f64,
}

impl Sequencer {
    /// Seeded sessions run in `Mode::Seeded`, everything else interactively
    pub fn new(session: PlinkoSession) -> Self {
        let mode = if session.seed().is_some() {
            Mode::Seeded
        } else {
            Mode::Interactive
        };
        Self {
            mode,
            session,
            phase: RoundPhase::Idle,
            timers: Timers::new(),
            countdown: None,
            pending_reset: None,
            pending_resize: None,
            handlers: EventHandlers::new(),
            countdown_step_ms: COUNTDOWN_STEP_MS,
            reset_delay_ms: RESET_DELAY_MS,
            now: 0.0,
        }
    }

    pub fn with_timing(mut self, countdown_step_ms: f64, reset_delay_ms: f64) -> Self {
        self.countdown_step_ms = countdown_step_ms;
        self.reset_delay_ms = reset_delay_ms;
        self
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&PlinkoEvent) + 'static) {
        self.handlers.subscribe(handler);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn session(&self) -> &PlinkoSession {
        &self.session
    }

    /// The randomize control is offered only before an interactive drop
    pub fn randomize_visible(&self) -> bool {
        self.mode == Mode::Interactive && !self.session.is_dropped()
    }

    fn emit(&mut self, events: Vec<PlinkoEvent>) -> Vec<PlinkoEvent> {
        self.handlers.dispatch(&events);
        events
    }

    /// Announce the board; seeded rounds start their countdown
    pub fn start(&mut self, now: f64) -> Vec<PlinkoEvent> {
        self.now = now;
        let mut events = vec![PlinkoEvent::ZonesAssigned(self.session.zones().to_vec())];
        if self.mode == Mode::Seeded {
            events.push(self.begin_countdown());
        }
        self.emit(events)
    }

    fn begin_countdown(&mut self) -> PlinkoEvent {
        self.phase = RoundPhase::Countdown { step: 0 };
        self.countdown = Some(
            self.timers
                .schedule(self.now, self.countdown_step_ms, Cue::Countdown(1)),
        );
        PlinkoEvent::Countdown(COUNTDOWN_LABELS[0])
    }

    fn in_board(&self, x: f32) -> bool {
        x > 0.0 && x < self.session.layout().width
    }

    /// Pointer moved over the board at `x`
    pub fn pointer_move(&mut self, x: f32) -> Result<(), PlinkoError> {
        if self.mode != Mode::Interactive
            || !matches!(self.phase, RoundPhase::Idle | RoundPhase::Previewing)
        {
            return Ok(());
        }
        if self.in_board(x) {
            self.session.create_preview(x)?;
            self.phase = RoundPhase::Previewing;
        } else {
            self.pointer_leave();
        }
        Ok(())
    }

    pub fn pointer_leave(&mut self) {
        if self.phase == RoundPhase::Previewing {
            self.session.clear_preview();
            self.phase = RoundPhase::Idle;
        }
    }

    /// Click or tap at `x`; skips a running countdown
    pub fn click(&mut self, x: f32) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        if matches!(self.phase, RoundPhase::Countdown { .. }) {
            return self.skip_countdown();
        }
        if self.mode != Mode::Interactive || !self.in_board(x) {
            return Ok(Vec::new());
        }
        self.manual_drop(x)
    }

    /// Keyboard drop at the board centre; skips a running countdown
    pub fn key_drop(&mut self) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        if matches!(self.phase, RoundPhase::Countdown { .. }) {
            return self.skip_countdown();
        }
        if self.mode != Mode::Interactive {
            return Ok(Vec::new());
        }
        let centre = self.session.layout().width / 2.0;
        self.manual_drop(centre)
    }

    fn manual_drop(&mut self, x: f32) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        if !matches!(self.phase, RoundPhase::Idle | RoundPhase::Previewing) {
            return Ok(Vec::new());
        }
        let events: Vec<_> = self.session.drop_at(x)?.into_iter().collect();
        if !events.is_empty() {
            self.phase = RoundPhase::Dropping;
        }
        Ok(self.emit(events))
    }

    fn skip_countdown(&mut self) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
        log::info!("Countdown skipped");
        let mut events = vec![PlinkoEvent::CountdownCancelled];
        events.extend(self.seeded_drop()?);
        Ok(self.emit(events))
    }

    fn seeded_drop(&mut self) -> Result<Option<PlinkoEvent>, PlinkoError> {
        let dropped = self.session.seeded_drop()?;
        if dropped.is_some() {
            self.phase = RoundPhase::Dropping;
        }
        Ok(dropped)
    }

    /// Reshuffle the zones if the randomize control is visible
    pub fn randomize(&mut self) -> Vec<PlinkoEvent> {
        if !self.randomize_visible() || !self.session.randomize() {
            return Vec::new();
        }
        let events = vec![PlinkoEvent::ZonesAssigned(self.session.zones().to_vec())];
        self.emit(events)
    }

    /// Window resized; the board is rebuilt once resizing settles
    pub fn resize(&mut self, now: f64, width: f32, height: f32) {
        if let Some(handle) = self.pending_resize.take() {
            handle.cancel();
        }
        self.pending_resize =
            Some(self.timers.schedule(now, RESIZE_DEBOUNCE_MS, Cue::Resize { width, height }));
    }

    /// One animation frame: fire due timers, then step the round
    pub fn frame(&mut self, now: f64) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        self.now = now;
        let mut events = Vec::new();

        while let Some(cue) = self.timers.pop_due(now) {
            match cue {
                Cue::Countdown(step) => {
                    self.countdown = None;
                    if !matches!(self.phase, RoundPhase::Countdown { .. }) {
                        continue;
                    }
                    let Some(label) = COUNTDOWN_LABELS.get(step) else {
                        continue;
                    };
                    self.phase = RoundPhase::Countdown { step };
                    events.push(PlinkoEvent::Countdown(label));
                    if step + 1 < COUNTDOWN_LABELS.len() {
                        self.countdown = Some(self.timers.schedule(
                            now,
                            self.countdown_step_ms,
                            Cue::Countdown(step + 1),
                        ));
                    } else {
                        events.extend(self.seeded_drop()?);
                    }
                }
                Cue::Reset => {
                    self.pending_reset = None;
                    events.extend(self.reset()?);
                }
                Cue::Resize { width, height } => {
                    self.pending_resize = None;
                    events.extend(self.apply_resize(width, height)?);
                }
            }
        }

        if self.phase == RoundPhase::Dropping {
            for event in self.session.step() {
                match event {
                    PlinkoEvent::Resolved(_) | PlinkoEvent::BallLost(_) => {
                        self.phase = RoundPhase::Resolved;
                        if self.mode == Mode::Interactive {
                            self.pending_reset =
                                Some(self.timers.schedule(now, self.reset_delay_ms, Cue::Reset));
                        }
                    }
                    _ => {}
                }
                events.push(event);
            }
        }

        Ok(self.emit(events))
    }

    fn cancel_pending(&mut self) {
        for handle in [self.countdown.take(), self.pending_reset.take()]
            .into_iter()
            .flatten()
        {
            handle.cancel();
        }
    }

    /// Clear the round and show a fresh board
    fn reset(&mut self) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        self.cancel_pending();
        self.session.reset()?;
        self.phase = RoundPhase::Idle;
        Ok(vec![
            PlinkoEvent::Reset,
            PlinkoEvent::ZonesAssigned(self.session.zones().to_vec()),
        ])
    }

    fn apply_resize(&mut self, width: f32, height: f32) -> Result<Vec<PlinkoEvent>, PlinkoError> {
        match self.session.seed().map(str::to_string) {
            Some(seed) => {
                self.cancel_pending();
                let config = BoardConfig {
                    width,
                    height,
                    ..*self.session.config()
                };
                self.session = PlinkoSession::seeded(&seed, self.session.catalog().clone(), config)?;
                Ok(vec![
                    PlinkoEvent::Reset,
                    PlinkoEvent::ZonesAssigned(self.session.zones().to_vec()),
                    self.begin_countdown(),
                ])
            }
            None => {
                self.cancel_pending();
                self.session.relayout(width, height)?;
                self.phase = RoundPhase::Idle;
                Ok(vec![
                    PlinkoEvent::Reset,
                    PlinkoEvent::ZonesAssigned(self.session.zones().to_vec()),
                ])
            }
        }
    }

    /// Where the page should scroll to keep the falling ball centred
    pub fn scroll_target(&self, container_top: f32, viewport_height: f32) -> Option<f32> {
        if self.phase != RoundPhase::Dropping {
            return None;
        }
        let ball = self.session.ball()?;
        Some(camera_target(container_top, ball.pos.y, viewport_height))
    }
}

/// Scroll offset that centres `ball_y` (board coordinates) in the viewport
pub fn camera_target(container_top: f32, ball_y: f32, viewport_height: f32) -> f32 {
    container_top + ball_y - viewport_height / 2.0
}
