//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Time only enters through the `dt` passed to `tick`
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod orbit;
pub mod state;
pub mod tick;

pub use collision::{approaching_planet_hit, circles_overlap, point_in_circle};
pub use orbit::{orbit_point, reproject};
pub use state::{
    GameEvent, GameOverReason, GamePhase, GameState, Hazard, HazardKind, HazardStats, Meteor,
    MeteorCourse, Planet, Projectile, RotateDirection, Ship,
};
pub use tick::{TickInput, meteor_path, tick};
