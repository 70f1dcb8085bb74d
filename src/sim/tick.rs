//! Per-frame simulation tick
//!
//! Core session loop that advances the game one frame. Orbits and projectiles
//! are frame-coupled (fixed step per tick), while bomb timers and the
//! meteor/shot cadences follow real elapsed time.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;

use super::state::{
    GameEvent, GameOverReason, GamePhase, GameState, HazardKind, Meteor, MeteorCourse,
    RotateDirection,
};
use crate::consts::*;
use crate::normalize_angle;

/// Input signals for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Orbit the ship with increasing angle
    pub rotate_left: bool,
    /// Orbit the ship with decreasing angle
    pub rotate_right: bool,
    /// Hold to fire (rate limited)
    pub fire: bool,
    /// Autopilot - AI flies the ship
    pub autopilot: bool,
}

/// Advance the game state by one frame that took `dt` of real time
pub fn tick(state: &mut GameState, input: &TickInput, dt: Duration) {
    // Nothing moves once the round is over
    if state.is_over() {
        return;
    }

    state.events.clear();
    state.time_ticks += 1;
    state.elapsed += dt;
    let dt_secs = dt.as_secs_f32();

    let mut input = input.clone();
    if input.autopilot {
        steer_autopilot(state, &mut input);
    }

    // Player input
    if input.rotate_left {
        state.ship.rotate(&state.planet, RotateDirection::Left);
    }
    if input.rotate_right {
        state.ship.rotate(&state.planet, RotateDirection::Right);
    }
    if input.fire && state.ship.try_shoot(&state.planet, state.elapsed) {
        state.events.push(GameEvent::ShotFired);
    }

    // Planet spin drags the bombs along
    state.planet.advance_rotation(&mut state.hazards);

    for hazard in &mut state.hazards {
        hazard.tick_timer(dt_secs);
    }

    let hits = state.ship.update_projectiles(&mut state.hazards, &state.planet);
    for id in hits {
        if let Some(hazard) = state.hazards.iter().find(|h| h.id == id) {
            state.events.push(GameEvent::HazardHit { id, hp: hazard.hp });
        }
    }

    // Hit-point depletion wins over a timer that ran out on the same tick
    let prev_destroyed = state.destroyed;
    let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.hazards)
        .into_iter()
        .partition(|h| h.is_destroyed() || h.is_expired());
    state.hazards = kept;

    let mut detonated = false;
    for hazard in removed {
        if hazard.is_destroyed() {
            state.destroyed += 1;
            log::debug!(
                "Destroyed {} #{} ({} total)",
                hazard.kind.as_str(),
                hazard.id,
                state.destroyed
            );
            state.events.push(GameEvent::HazardDestroyed {
                id: hazard.id,
                kind: hazard.kind,
            });
        } else {
            detonated = true;
            log::info!("{} #{} detonated", hazard.kind.as_str(), hazard.id);
            state.events.push(GameEvent::HazardDetonated {
                id: hazard.id,
                kind: hazard.kind,
            });
        }
    }

    if detonated {
        end_session(state, GameOverReason::BombDetonated);
        return;
    }

    // Keep the planet stocked
    let standard = state.count(HazardKind::Standard);
    for _ in standard..STANDARD_POOL_FLOOR {
        state.spawn_hazard(HazardKind::Standard);
    }

    if crossed_multiple(prev_destroyed, state.destroyed, BOSS_THRESHOLD) && state.boss().is_none() {
        let id = state.spawn_hazard(HazardKind::Boss);
        log::info!("Boss bomb #{} arrived at {} destroyed", id, state.destroyed);
    }
    if crossed_multiple(prev_destroyed, state.destroyed, MOVING_THRESHOLD)
        && state.moving().is_none()
    {
        let id = state.spawn_hazard(HazardKind::Moving);
        log::info!("Moving bomb #{} arrived at {} destroyed", id, state.destroyed);
    }

    if state.elapsed >= state.next_meteor_at {
        spawn_meteor(state);
        while state.next_meteor_at <= state.elapsed {
            state.next_meteor_at += METEOR_SPAWN_INTERVAL;
        }
    }

    // Meteors: a collision takes priority over leaving the screen
    let mut remaining = Vec::with_capacity(state.meteors.len());
    for mut meteor in std::mem::take(&mut state.meteors) {
        meteor.advance();
        if meteor.test_collision(&state.ship) {
            state.ship.apply_damage(METEOR_DAMAGE);
            log::info!("Meteor #{} hit the ship, health {}", meteor.id, state.ship.health);
            state.events.push(GameEvent::ShipHit {
                meteor_id: meteor.id,
                health: state.ship.health,
            });
        } else if meteor.is_off_screen(ARENA_WIDTH, ARENA_HEIGHT) {
            state.events.push(GameEvent::MeteorLeft { id: meteor.id });
        } else {
            remaining.push(meteor);
        }
    }
    state.meteors = remaining;

    if state.ship.is_destroyed() {
        end_session(state, GameOverReason::ShipDestroyed);
    }
}

fn end_session(state: &mut GameState, reason: GameOverReason) {
    state.phase = GamePhase::GameOver { reason };
    state.events.push(GameEvent::GameOver { reason });
    log::info!(
        "Game over ({:?}) after {:.1}s with {} bombs destroyed",
        reason,
        state.elapsed.as_secs_f32(),
        state.destroyed
    );
}

/// True if a multiple of `step` lies in `(prev, now]`
fn crossed_multiple(prev: u32, now: u32, step: u32) -> bool {
    now > prev && now / step > prev / step
}

/// Launch one meteor on a random course
fn spawn_meteor(state: &mut GameState) {
    let id = state.next_entity_id();
    let course = MeteorCourse::ALL[state.rng.random_range(0..MeteorCourse::ALL.len())];
    let (start, target) = meteor_path(&mut state.rng, course, ARENA_WIDTH, ARENA_HEIGHT);
    log::debug!("Meteor #{} {:?} from {} toward {}", id, course, start, target);
    state.meteors.push(Meteor::new(id, start, target, course));
    state.events.push(GameEvent::MeteorSpawned { id, course });
}

/// Pick a start just outside an edge and a target past the opposite side,
/// so the meteor always crosses the arena
pub fn meteor_path(
    rng: &mut impl Rng,
    course: MeteorCourse,
    width: f32,
    height: f32,
) -> (Vec2, Vec2) {
    let margin = METEOR_SPAWN_MARGIN;
    let overshoot = METEOR_TARGET_OVERSHOOT;

    match course {
        MeteorCourse::Horizontal => {
            let y = rng.random_range(0.0..=height);
            let (x, target_x) = if rng.random_bool(0.5) {
                (-margin, width + overshoot)
            } else {
                (width + margin, -overshoot)
            };
            (Vec2::new(x, y), Vec2::new(target_x, y))
        }
        MeteorCourse::Vertical => {
            let x = rng.random_range(0.0..=width);
            let (y, target_y) = if rng.random_bool(0.5) {
                (-margin, height + overshoot)
            } else {
                (height + margin, -overshoot)
            };
            (Vec2::new(x, y), Vec2::new(x, target_y))
        }
        MeteorCourse::Diagonal => {
            let start = match rng.random_range(0..4) {
                0 => Vec2::new(rng.random_range(0.0..=width), -margin),
                1 => Vec2::new(width + margin, rng.random_range(0.0..=height)),
                2 => Vec2::new(rng.random_range(0.0..=width), height + margin),
                _ => Vec2::new(-margin, rng.random_range(0.0..=height)),
            };
            // Aim at the far corner
            let target_x = if start.x < width / 2.0 { width + overshoot } else { -overshoot };
            let target_y = if start.y < height / 2.0 { height + overshoot } else { -overshoot };
            (start, Vec2::new(target_x, target_y))
        }
    }
}

/// Fly toward the bomb closest to detonating, leading it by the planet spin,
/// and keep the trigger held
fn steer_autopilot(state: &GameState, input: &mut TickInput) {
    input.fire = true;
    input.rotate_left = false;
    input.rotate_right = false;

    let target = state.hazards.iter().min_by(|a, b| {
        a.ttl
            .partial_cmp(&b.ttl)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.hp.cmp(&b.hp))
    });
    let Some(target) = target else {
        return;
    };

    // Ticks a projectile needs to reach the surface
    let flight_ticks = (state.ship.distance - state.planet.radius) / PROJECTILE_SPEED;
    let lead = PLANET_ROTATION_SPEED * target.kind.orbit_direction() * flight_ticks;
    let aim = target.angle + lead;

    let diff = normalize_angle(aim - state.ship.angle_deg.to_radians());
    let deadband = (SHIP_ROTATION_STEP / 2.0).to_radians();
    if diff > deadband {
        input.rotate_left = true;
    } else if diff < -deadband {
        input.rotate_right = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Hazard;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn quiet_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        // Keep meteors out of the way
        state.next_meteor_at = Duration::from_secs(3600);
        state
    }

    fn first_standard(state: &mut GameState) -> &mut Hazard {
        state
            .hazards
            .iter_mut()
            .find(|h| h.kind == HazardKind::Standard)
            .expect("standard bomb")
    }

    #[test]
    fn test_tick_rotates_and_fires() {
        let mut state = quiet_state(1);
        let input = TickInput {
            rotate_left: true,
            fire: true,
            ..Default::default()
        };
        for _ in 0..6 {
            tick(&mut state, &input, FRAME);
        }
        assert_eq!(state.ship.angle_deg, 6.0 * SHIP_ROTATION_STEP);
        assert_eq!(state.ship.shots_fired, 1);
        assert_eq!(state.time_ticks, 6);
    }

    #[test]
    fn test_planet_rotates_every_tick() {
        let mut state = quiet_state(2);
        let before: Vec<f32> = state.hazards.iter().map(|h| h.angle).collect();
        // Zero elapsed time still turns the planet
        tick(&mut state, &TickInput::default(), Duration::ZERO);
        assert!((state.planet.rotation_angle - PLANET_ROTATION_SPEED).abs() < 1e-6);
        for (h, old) in state.hazards.iter().zip(before) {
            let moved = normalize_angle(h.angle - old);
            assert!((moved - PLANET_ROTATION_SPEED).abs() < 1e-4);
            assert_eq!(h.ttl, HazardKind::Standard.stats().ttl);
        }
    }

    #[test]
    fn test_three_hits_destroy_bomb() {
        let mut state = quiet_state(3);
        let bomb = first_standard(&mut state);
        let id = bomb.id;
        for _ in 0..3 {
            bomb.apply_hit();
        }
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.destroyed, 1);
        assert!(state.hazards.iter().all(|h| h.id != id));
        assert!(state.events.contains(&GameEvent::HazardDestroyed {
            id,
            kind: HazardKind::Standard
        }));
        // Pool topped back up
        assert_eq!(state.count(HazardKind::Standard), STANDARD_POOL_FLOOR);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_hp_depletion_beats_timer_expiry() {
        let mut state = quiet_state(4);
        let bomb = first_standard(&mut state);
        bomb.hp = 0;
        bomb.ttl = 0.001;
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.destroyed, 1);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_timer_expiry_ends_session() {
        let mut state = quiet_state(5);
        first_standard(&mut state).ttl = 0.001;
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(
            state.phase,
            GamePhase::GameOver {
                reason: GameOverReason::BombDetonated
            }
        );
        assert_eq!(state.destroyed, 0);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::HazardDetonated { .. })));

        // Frozen from here on
        let ticks = state.time_ticks;
        let elapsed = state.elapsed;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.elapsed, elapsed);
    }

    #[test]
    fn test_boss_spawns_once() {
        let mut state = quiet_state(6);
        state.destroyed = 24;
        first_standard(&mut state).hp = 0;
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.destroyed, 25);
        assert_eq!(state.count(HazardKind::Boss), 1);
        let boss_id = state.boss().map(|b| b.id);

        // Reaching 50 while the first boss lives does not add another
        state.destroyed = 49;
        first_standard(&mut state).hp = 0;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.destroyed, 50);
        assert_eq!(state.count(HazardKind::Boss), 1);
        assert_eq!(state.boss().map(|b| b.id), boss_id);
    }

    #[test]
    fn test_boss_timer_expiry_ends_session() {
        let mut state = quiet_state(7);
        state.spawn_hazard(HazardKind::Boss);
        if let Some(boss) = state.hazards.iter_mut().find(|h| h.kind == HazardKind::Boss) {
            boss.ttl = 0.001;
        }
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.events.contains(&GameEvent::GameOver {
            reason: GameOverReason::BombDetonated
        }));
    }

    #[test]
    fn test_moving_bomb_one_shot_until_destroyed() {
        let mut state = quiet_state(8);
        state.destroyed = 34;
        first_standard(&mut state).hp = 0;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.count(HazardKind::Moving), 1);

        // Counter-rotates against the planet
        let before = state.moving().map(|m| m.angle).unwrap_or_default();
        tick(&mut state, &TickInput::default(), FRAME);
        let after = state.moving().map(|m| m.angle).unwrap_or_default();
        assert!((normalize_angle(after - before) + PLANET_ROTATION_SPEED).abs() < 1e-4);

        // Destroying it at 36 does not bring it back
        if let Some(moving) = state.hazards.iter_mut().find(|h| h.kind == HazardKind::Moving) {
            moving.hp = 0;
        }
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.destroyed, 36);
        assert!(state.moving().is_none());

        // The next multiple summons a fresh one
        state.destroyed = 69;
        first_standard(&mut state).hp = 0;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.count(HazardKind::Moving), 1);
    }

    #[test]
    fn test_counter_jump_still_triggers_boss() {
        let mut state = quiet_state(9);
        state.destroyed = 23;
        for hazard in state.hazards.iter_mut().take(3) {
            hazard.hp = 0;
        }
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.destroyed, 26);
        assert_eq!(state.count(HazardKind::Boss), 1);
    }

    #[test]
    fn test_meteor_cadence() {
        let mut state = GameState::new(10);
        let mut spawned = 0;
        // ~2.02 seconds of frames
        for _ in 0..121 {
            tick(&mut state, &TickInput::default(), FRAME);
            spawned += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::MeteorSpawned { .. }))
                .count();
        }
        assert_eq!(spawned, 2);
        assert_eq!(state.next_meteor_at, Duration::from_secs(4));
    }

    #[test]
    fn test_meteor_hit_damages_ship() {
        let mut state = quiet_state(11);
        let id = state.next_entity_id();
        let center = state.ship.center;
        state.meteors.push(Meteor::new(
            id,
            center + Vec2::new(50.0, 0.0),
            Vec2::new(-100.0, center.y),
            MeteorCourse::Horizontal,
        ));
        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.ship.health, SHIP_HEALTH - METEOR_DAMAGE);
        assert!(state.meteors.is_empty());
        assert!(state.events.contains(&GameEvent::ShipHit {
            meteor_id: id,
            health: SHIP_HEALTH - METEOR_DAMAGE
        }));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_ship_destroyed_ends_session() {
        let mut state = quiet_state(12);
        state.ship.health = METEOR_DAMAGE;
        let id = state.next_entity_id();
        let center = state.ship.center;
        state.meteors.push(Meteor::new(
            id,
            center + Vec2::new(0.0, -50.0),
            Vec2::new(center.x, ARENA_HEIGHT + 100.0),
            MeteorCourse::Vertical,
        ));
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(
            state.phase,
            GamePhase::GameOver {
                reason: GameOverReason::ShipDestroyed
            }
        );
    }

    #[test]
    fn test_autopilot_destroys_bombs() {
        let mut state = quiet_state(13);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        // Ten seconds, shorter than a standard timer
        for _ in 0..600 {
            tick(&mut state, &input, FRAME);
        }
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.destroyed >= 3, "destroyed only {}", state.destroyed);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut state1, &input, FRAME);
            tick(&mut state2, &input, FRAME);
        }
        let a = serde_json::to_string(&state1).expect("serialize");
        let b = serde_json::to_string(&state2).expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn test_crossed_multiple() {
        assert!(crossed_multiple(24, 25, 25));
        assert!(crossed_multiple(23, 26, 25));
        assert!(!crossed_multiple(25, 25, 25));
        assert!(!crossed_multiple(25, 26, 25));
        assert!(crossed_multiple(49, 50, 25));
    }

    proptest! {
        #[test]
        fn meteors_always_cross_the_arena(seed in any::<u64>(), course_idx in 0usize..3) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let course = MeteorCourse::ALL[course_idx];
            let (start, target) = meteor_path(&mut rng, course, ARENA_WIDTH, ARENA_HEIGHT);
            let mut meteor = Meteor::new(1, start, target, course);
            prop_assert!(!meteor.is_off_screen(ARENA_WIDTH, ARENA_HEIGHT));

            let mut visited = false;
            let mut left = false;
            for _ in 0..1000 {
                meteor.advance();
                let p = meteor.pos;
                if p.x >= 0.0 && p.x <= ARENA_WIDTH && p.y >= 0.0 && p.y <= ARENA_HEIGHT {
                    visited = true;
                }
                if meteor.is_off_screen(ARENA_WIDTH, ARENA_HEIGHT) {
                    left = true;
                    break;
                }
            }
            prop_assert!(visited);
            prop_assert!(left);
        }
    }
}
