//! Planet Defender - orbit a planet, shoot the bombs before they blow
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, orbits, collisions, session loop)
//! - `platform`: Clock / input / renderer seams and the frame-paced driver
//! - `settings`: Runtime session settings

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Target frame rate of the session loop
    pub const FPS: u32 = 60;

    /// Arena dimensions (screen space, origin top-left)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 800.0;

    /// Planet sits in the middle of the arena
    pub const PLANET_RADIUS: f32 = 200.0;
    /// Planet rotation per tick (radians, frame-coupled)
    pub const PLANET_ROTATION_SPEED: f32 = 0.01;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 30.0;
    pub const SHIP_ORBIT_GAP: f32 = 100.0;
    pub const SHIP_HEALTH: u32 = 50;
    /// Degrees per tick while a rotate key is held
    pub const SHIP_ROTATION_STEP: f32 = 4.0;

    /// Fire rate limit
    pub const SHOTS_PER_SECOND: u32 = 10;
    pub const TIME_BETWEEN_SHOTS: Duration = Duration::from_millis(1000 / SHOTS_PER_SECOND as u64);

    /// Projectile defaults (units per tick)
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const PROJECTILE_RADIUS: f32 = 5.0;

    /// Minimum number of standard bombs on the planet
    pub const STANDARD_POOL_FLOOR: usize = 3;
    /// Destroyed-count multiples that summon the special bombs
    pub const BOSS_THRESHOLD: u32 = 25;
    pub const MOVING_THRESHOLD: u32 = 35;
    /// Timer value below which a bomb is drawn as critical (seconds)
    pub const TIMER_WARNING: f32 = 6.0;

    /// Meteor defaults
    pub const METEOR_SPEED: f32 = 5.0;
    pub const METEOR_RADIUS: f32 = 15.0;
    pub const METEOR_DAMAGE: u32 = 10;
    pub const METEOR_SPAWN_INTERVAL: Duration = Duration::from_secs(2);
    /// How far outside the arena meteors spawn
    pub const METEOR_SPAWN_MARGIN: f32 = 10.0;
    /// How far past the far edge meteors aim
    pub const METEOR_TARGET_OVERSHOOT: f32 = 100.0;

    /// How long the end-of-round message stays up
    pub const GAME_OVER_HOLD: Duration = Duration::from_secs(3);
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Arena centre, where the planet lives
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}
