//! Collision detection for circular bodies
//!
//! Everything in Planet Defender is a circle, so collision boils down to
//! comparing centre distances against radii. The planet test is the one
//! subtle case: a projectile only hits the planet while it is closing in.

use glam::Vec2;

/// Check if a point lies within a circle (inclusive)
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) <= radius
}

/// Check if two circles overlap or touch
#[inline]
pub fn circles_overlap(a_center: Vec2, a_radius: f32, b_center: Vec2, b_radius: f32) -> bool {
    a_center.distance(b_center) <= a_radius + b_radius
}

/// Check if a projectile reached the planet's near side
///
/// `origin` is where the projectile was fired from. The hit only counts when
/// the projectile is closer to the planet than it started (approaching) and
/// inside the planet radius. A projectile that passed through the planet and
/// is moving away never counts.
pub fn approaching_planet_hit(
    origin: Vec2,
    pos: Vec2,
    planet_center: Vec2,
    planet_radius: f32,
) -> bool {
    let start_distance = origin.distance(planet_center);
    let current_distance = pos.distance(planet_center);
    current_distance < start_distance && current_distance <= planet_radius
}
