//! Orbit geometry around the planet
//!
//! Every moving body that circles the planet is positioned by an angle and a
//! distance from the planet centre. Re-projection keeps the distance and only
//! advances the angle, so orbiting bodies never drift off their ring.

use glam::Vec2;

use crate::{cartesian_to_polar, normalize_angle, polar_to_cartesian};

/// Point at `distance` from `center` in direction `angle` (radians)
#[inline]
pub fn orbit_point(center: Vec2, distance: f32, angle: f32) -> Vec2 {
    center + polar_to_cartesian(distance, angle)
}

/// Rotate `pos` around `center` by `delta` radians.
///
/// Returns the new position and its angle from the centre (normalized, used
/// for placing labels next to the body).
pub fn reproject(center: Vec2, pos: Vec2, delta: f32) -> (Vec2, f32) {
    let (distance, angle) = cartesian_to_polar(pos - center);
    let angle = normalize_angle(angle + delta);
    (orbit_point(center, distance, angle), angle)
}
