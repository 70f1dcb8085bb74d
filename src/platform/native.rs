//! Headless native implementations of the platform seams

use std::time::{Duration, Instant};

use super::{Clock, FrameInput, InputSource, Renderer};
use crate::sim::{GameEvent, GameState, TickInput};

/// Wall clock backed by `Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock: time only passes while sleeping.
///
/// Runs a paced session as fast as the CPU allows, with exact frame times.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Lets the built-in pilot fly the ship every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct AutopilotInput;

impl InputSource for AutopilotInput {
    fn poll(&mut self, _state: &GameState) -> FrameInput {
        FrameInput {
            tick: TickInput {
                autopilot: true,
                ..Default::default()
            },
            quit: false,
        }
    }
}

/// Replays a fixed list of inputs, then asks to quit
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<TickInput>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<TickInput>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _state: &GameState) -> FrameInput {
        match self.frames.get(self.cursor) {
            Some(tick) => {
                self.cursor += 1;
                FrameInput {
                    tick: tick.clone(),
                    quit: false,
                }
            }
            None => FrameInput {
                quit: true,
                ..Default::default()
            },
        }
    }
}

/// Renders the game as log lines: events as they happen, plus a periodic HUD
#[derive(Debug, Clone)]
pub struct LogRenderer {
    /// HUD line every N frames (0 = never)
    hud_interval: u32,
    timer_warning: bool,
    frames: u64,
}

impl LogRenderer {
    pub fn new(hud_interval: u32, timer_warning: bool) -> Self {
        Self {
            hud_interval,
            timer_warning,
            frames: 0,
        }
    }

    /// One-line summary of what would be on screen
    pub fn hud_line(&self, state: &GameState) -> String {
        let bombs: Vec<String> = state
            .hazards
            .iter()
            .map(|h| {
                let warn = if self.timer_warning && h.is_critical() { "!" } else { "" };
                format!("{}#{}:{}hp/{}s{}", h.kind.as_str(), h.id, h.hp, h.ttl as u32, warn)
            })
            .collect();
        format!(
            "[{:>6.1}s] destroyed {} | health {:.0}% | bombs [{}] | meteors {} | shots {}",
            state.elapsed.as_secs_f32(),
            state.destroyed,
            state.ship.health_fraction() * 100.0,
            bombs.join(", "),
            state.meteors.len(),
            state.ship.projectiles.len(),
        )
    }
}

impl Renderer for LogRenderer {
    fn draw(&mut self, state: &GameState) {
        self.frames += 1;

        for event in &state.events {
            match event {
                GameEvent::ShotFired | GameEvent::MeteorLeft { .. } => {
                    log::trace!("{:?}", event)
                }
                _ => log::debug!("{:?}", event),
            }
        }

        if self.hud_interval > 0 && self.frames % self.hud_interval as u64 == 0 {
            log::info!("{}", self.hud_line(state));
        }
    }

    fn game_over(&mut self, state: &GameState) {
        log::info!("{}", self.hud_line(state));
        log::info!("GAME OVER!");
    }
}
