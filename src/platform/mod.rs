//! Platform abstraction layer
//!
//! The simulation never looks at a clock, a keyboard or a screen directly.
//! This module defines those collaborators and the frame-paced loop that
//! wires them to `sim::tick`:
//! - Time (frame `dt` and the pacing wait)
//! - Input signals
//! - Frame presentation

pub mod native;

use std::time::Duration;

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{GameOverReason, GamePhase, GameState, TickInput, tick};

pub use native::{AutopilotInput, LogRenderer, ManualClock, ScriptedInput, SystemClock};

/// Monotonic time source
pub trait Clock {
    /// Time since the clock started
    fn now(&self) -> Duration;
    /// Block (or pretend to) for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Signals for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub tick: TickInput,
    /// Close the session (window closed)
    pub quit: bool,
}

/// Source of per-frame input signals
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> FrameInput;
}

/// Presents the simulation; receives data only
pub trait Renderer {
    /// Present one frame
    fn draw(&mut self, state: &GameState);
    /// Present the end-of-round message
    fn game_over(&mut self, state: &GameState);
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionOutcome {
    GameOver(GameOverReason),
    Quit,
    /// Headless frame limit reached
    FrameLimit,
}

/// Summary of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub frames: u64,
    pub elapsed: Duration,
    pub destroyed: u32,
    pub shots_fired: u32,
    pub health: u32,
}

impl SessionReport {
    fn new(outcome: SessionOutcome, frames: u64, state: &GameState) -> Self {
        Self {
            outcome,
            frames,
            elapsed: state.elapsed,
            destroyed: state.destroyed,
            shots_fired: state.ship.shots_fired,
            health: state.ship.health,
        }
    }
}

/// Run one session until game over, quit, or the frame limit.
///
/// Each frame polls input, ticks the simulation with the real time since the
/// previous frame, draws, then waits out the rest of the frame budget.
pub fn run_session<C, I, R>(
    state: &mut GameState,
    clock: &mut C,
    input: &mut I,
    renderer: &mut R,
    settings: &Settings,
) -> SessionReport
where
    C: Clock,
    I: InputSource,
    R: Renderer,
{
    let frame_budget = settings.frame_duration();
    let mut last_frame = clock.now();
    let mut frames: u64 = 0;

    log::info!("Session started (seed {}, {} fps)", state.seed, settings.target_fps);

    let outcome = loop {
        if settings.max_frames.is_some_and(|max| frames >= max) {
            log::info!("Frame limit reached after {} frames", frames);
            break SessionOutcome::FrameLimit;
        }

        let frame_start = clock.now();
        let dt = frame_start.saturating_sub(last_frame);
        last_frame = frame_start;

        let frame = input.poll(state);
        if frame.quit {
            log::info!("Session closed by player");
            break SessionOutcome::Quit;
        }

        tick(state, &frame.tick, dt);
        frames += 1;
        renderer.draw(state);

        if let GamePhase::GameOver { reason } = state.phase {
            renderer.game_over(state);
            clock.sleep(settings.game_over_hold());
            break SessionOutcome::GameOver(reason);
        }

        let spent = clock.now().saturating_sub(frame_start);
        if spent < frame_budget {
            clock.sleep(frame_budget - spent);
        }
    };

    SessionReport::new(outcome, frames, state)
}
