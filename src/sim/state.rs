//! Game state and core simulation types
//!
//! Everything the session loop mutates lives here. The state is serializable
//! so a run can be snapshotted and compared for determinism.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{approaching_planet_hit, circles_overlap, point_in_circle};
use super::orbit::{orbit_point, reproject};
use crate::arena_center;
use crate::consts::*;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A bomb timer ran out
    BombDetonated,
    /// Meteors wore the ship's health down to zero
    ShipDestroyed,
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Session ended, no further simulation
    GameOver { reason: GameOverReason },
}

/// The planet: a fixed circular pivot that drags every bomb around with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub center: Vec2,
    pub radius: f32,
    /// Accumulated rotation (radians), never wrapped
    pub rotation_angle: f32,
}

impl Planet {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            rotation_angle: 0.0,
        }
    }

    /// Advance the planet one tick and carry every hazard along.
    ///
    /// Frame-coupled: the delta is fixed per tick, not scaled by elapsed time.
    pub fn advance_rotation(&mut self, hazards: &mut [Hazard]) {
        self.rotation_angle += PLANET_ROTATION_SPEED;
        for hazard in hazards.iter_mut() {
            let delta = PLANET_ROTATION_SPEED * hazard.kind.orbit_direction();
            let (pos, angle) = reproject(self.center, hazard.pos, delta);
            hazard.pos = pos;
            hazard.angle = angle;
        }
    }
}

/// A projectile fired from the ship toward the planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Where it was fired from
    pub origin: Vec2,
    pub pos: Vec2,
    /// Direction of travel (radians), fixed at creation
    pub heading: f32,
    /// Set once on any hit; the projectile is pruned the same tick
    pub collided: bool,
}

impl Projectile {
    pub fn new(origin: Vec2, aim: Vec2) -> Self {
        let to_aim = aim - origin;
        Self {
            origin,
            pos: origin,
            heading: to_aim.y.atan2(to_aim.x),
            collided: false,
        }
    }

    pub fn advance(&mut self) {
        if !self.collided {
            self.pos += Vec2::from_angle(self.heading) * PROJECTILE_SPEED;
        }
    }

    /// Test against a circular target, marking the projectile on a hit
    pub fn test_collision(&mut self, target_pos: Vec2, target_radius: f32) -> bool {
        if point_in_circle(self.pos, target_pos, target_radius) {
            self.collided = true;
            return true;
        }
        false
    }

    /// Test against the planet's near side, marking the projectile on a hit
    pub fn test_planet_collision(&mut self, planet: &Planet) -> bool {
        if approaching_planet_hit(self.origin, self.pos, planet.center, planet.radius) {
            self.collided = true;
            return true;
        }
        false
    }
}

/// Player rotate command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    /// Orbit angle increases
    Left,
    /// Orbit angle decreases
    Right,
}

/// The player's ship, orbiting at a fixed distance from the planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub center: Vec2,
    pub radius: f32,
    /// Orbital angle in degrees, unbounded
    pub angle_deg: f32,
    /// Orbit distance from the planet centre
    pub distance: f32,
    pub health: u32,
    pub max_health: u32,
    /// Live projectiles, in firing order
    pub projectiles: Vec<Projectile>,
    /// Session time of the last accepted shot
    pub last_shot: Duration,
    /// Total projectiles ever fired
    pub shots_fired: u32,
}

impl Ship {
    pub fn new(planet: &Planet) -> Self {
        let distance = planet.radius + SHIP_ORBIT_GAP;
        let angle_deg = 0.0;
        Self {
            center: orbit_point(planet.center, distance, f32::to_radians(angle_deg)),
            radius: SHIP_RADIUS,
            angle_deg,
            distance,
            health: SHIP_HEALTH,
            max_health: SHIP_HEALTH,
            projectiles: Vec::new(),
            last_shot: Duration::ZERO,
            shots_fired: 0,
        }
    }

    /// Step the orbit angle and re-derive the ship position
    pub fn rotate(&mut self, planet: &Planet, direction: RotateDirection) {
        match direction {
            RotateDirection::Left => self.angle_deg += SHIP_ROTATION_STEP,
            RotateDirection::Right => self.angle_deg -= SHIP_ROTATION_STEP,
        }
        self.center = orbit_point(planet.center, self.distance, self.angle_deg.to_radians());
    }

    /// Fire at the planet centre if the rate limit allows it
    pub fn try_shoot(&mut self, planet: &Planet, now: Duration) -> bool {
        if now.saturating_sub(self.last_shot) < TIME_BETWEEN_SHOTS {
            return false;
        }
        self.projectiles.push(Projectile::new(self.center, planet.center));
        self.last_shot = now;
        self.shots_fired += 1;
        true
    }

    /// Advance projectiles, resolve hits, and prune the spent ones.
    ///
    /// A projectile is tested against every hazard on the tick it connects,
    /// so overlapping bombs each lose a hit point. Returns the ids of hazards
    /// that took a hit (one entry per hit).
    pub fn update_projectiles(&mut self, hazards: &mut [Hazard], planet: &Planet) -> Vec<u32> {
        let mut hits = Vec::new();

        for projectile in &mut self.projectiles {
            projectile.advance();

            // Every bomb the projectile overlaps takes a hit
            for hazard in hazards.iter_mut() {
                if projectile.test_collision(hazard.pos, hazard.radius) {
                    hazard.apply_hit();
                    hits.push(hazard.id);
                }
            }

            // Planet hits just absorb the projectile
            if !projectile.collided {
                projectile.test_planet_collision(planet);
            }
        }

        self.projectiles.retain(|p| !p.collided);
        hits
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Health as 0-1 for the health bar
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}

/// Bomb variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardKind {
    #[default]
    Standard,
    /// Summoned every 25 kills, tough and slow-burning
    Boss,
    /// Summoned every 35 kills, orbits against the planet's spin
    Moving,
}

/// Initial stats for a bomb variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardStats {
    pub hp: i32,
    /// Seconds until detonation
    pub ttl: f32,
    pub radius: f32,
}

impl HazardKind {
    pub const fn stats(self) -> HazardStats {
        match self {
            HazardKind::Standard => HazardStats {
                hp: 3,
                ttl: 15.0,
                radius: 20.0,
            },
            HazardKind::Boss => HazardStats {
                hp: 10,
                ttl: 30.0,
                radius: 30.0,
            },
            HazardKind::Moving => HazardStats {
                hp: 5,
                ttl: 21.0,
                radius: 15.0,
            },
        }
    }

    /// +1 rides with the planet, -1 counter-rotates
    pub fn orbit_direction(self) -> f32 {
        match self {
            HazardKind::Moving => -1.0,
            HazardKind::Standard | HazardKind::Boss => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Standard => "bomb",
            HazardKind::Boss => "boss bomb",
            HazardKind::Moving => "moving bomb",
        }
    }
}

/// A timed bomb riding the planet surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub pos: Vec2,
    /// Angle from the planet centre (radians), for timer label placement
    pub angle: f32,
    pub radius: f32,
    /// Remaining hit points; may go negative, removal triggers at <= 0
    pub hp: i32,
    /// Seconds left on the timer, never negative
    pub ttl: f32,
}

impl Hazard {
    /// Create a hazard with `kind` stats at `angle` (radians) on the planet surface
    pub fn new(id: u32, kind: HazardKind, planet: &Planet, angle: f32) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            pos: orbit_point(planet.center, planet.radius, angle),
            angle,
            radius: stats.radius,
            hp: stats.hp,
            ttl: stats.ttl,
        }
    }

    /// Create a hazard at a random point of the planet surface
    pub fn spawn(id: u32, kind: HazardKind, planet: &Planet, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0f32..360.0).to_radians();
        Self::new(id, kind, planet, angle)
    }

    pub fn apply_hit(&mut self) {
        self.hp -= 1;
    }

    /// Count the timer down by real elapsed time, stopping at zero
    pub fn tick_timer(&mut self, dt: f32) {
        self.ttl = (self.ttl - dt.max(0.0)).max(0.0);
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_expired(&self) -> bool {
        self.ttl <= 0.0
    }

    /// Timer is low enough to be drawn as a threat
    pub fn is_critical(&self) -> bool {
        self.ttl < TIMER_WARNING
    }
}

/// Meteor flight paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeteorCourse {
    Horizontal,
    Vertical,
    Diagonal,
}

impl MeteorCourse {
    pub const ALL: [MeteorCourse; 3] = [
        MeteorCourse::Horizontal,
        MeteorCourse::Vertical,
        MeteorCourse::Diagonal,
    ];
}

/// A meteor crossing the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub id: u32,
    pub pos: Vec2,
    pub target: Vec2,
    pub course: MeteorCourse,
    /// Heading toward the target (radians), used by diagonal meteors
    pub heading: f32,
    pub radius: f32,
}

impl Meteor {
    pub fn new(id: u32, start: Vec2, target: Vec2, course: MeteorCourse) -> Self {
        let to_target = target - start;
        Self {
            id,
            pos: start,
            target,
            course,
            heading: to_target.y.atan2(to_target.x),
            radius: METEOR_RADIUS,
        }
    }

    /// Displacement for the next tick
    pub fn step(&self) -> Vec2 {
        match self.course {
            MeteorCourse::Horizontal => {
                let dx = if self.target.x > self.pos.x {
                    METEOR_SPEED
                } else {
                    -METEOR_SPEED
                };
                Vec2::new(dx, 0.0)
            }
            MeteorCourse::Vertical => {
                let dy = if self.target.y > self.pos.y {
                    METEOR_SPEED
                } else {
                    -METEOR_SPEED
                };
                Vec2::new(0.0, dy)
            }
            MeteorCourse::Diagonal => Vec2::from_angle(self.heading) * METEOR_SPEED,
        }
    }

    pub fn advance(&mut self) {
        self.pos += self.step();
    }

    pub fn test_collision(&self, ship: &Ship) -> bool {
        circles_overlap(self.pos, self.radius, ship.center, ship.radius)
    }

    /// Outside the arena on some axis and not heading back in on that axis
    pub fn is_off_screen(&self, width: f32, height: f32) -> bool {
        let step = self.step();
        let gone_x = (self.pos.x < 0.0 && step.x <= 0.0) || (self.pos.x > width && step.x >= 0.0);
        let gone_y = (self.pos.y < 0.0 && step.y <= 0.0) || (self.pos.y > height && step.y >= 0.0);
        gone_x || gone_y
    }
}

/// Things that happened during a tick (for renderer, audio and logs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    HazardHit { id: u32, hp: i32 },
    HazardDestroyed { id: u32, kind: HazardKind },
    HazardDetonated { id: u32, kind: HazardKind },
    HazardSpawned { id: u32, kind: HazardKind },
    MeteorSpawned { id: u32, course: MeteorCourse },
    MeteorLeft { id: u32 },
    ShipHit { meteor_id: u32, health: u32 },
    GameOver { reason: GameOverReason },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn RNG
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Session clock: sum of all tick durations
    pub elapsed: Duration,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub planet: Planet,
    pub ship: Ship,
    /// Live bombs of every kind (sorted by id)
    pub hazards: Vec<Hazard>,
    pub meteors: Vec<Meteor>,
    /// Bombs destroyed so far
    pub destroyed: u32,
    /// Session time at which the next meteor appears
    pub next_meteor_at: Duration,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with the given seed
    pub fn new(seed: u64) -> Self {
        let planet = Planet::new(arena_center(), PLANET_RADIUS);
        let ship = Ship::new(&planet);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            elapsed: Duration::ZERO,
            time_ticks: 0,
            planet,
            ship,
            hazards: Vec::new(),
            meteors: Vec::new(),
            destroyed: 0,
            next_meteor_at: Duration::ZERO,
            events: Vec::new(),
            next_id: 1,
        };

        for _ in 0..STANDARD_POOL_FLOOR {
            state.spawn_hazard(HazardKind::Standard);
        }
        // Initial bombs are not news
        state.events.clear();

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put a new bomb of `kind` somewhere on the planet surface
    pub fn spawn_hazard(&mut self, kind: HazardKind) -> u32 {
        let id = self.next_entity_id();
        let hazard = Hazard::spawn(id, kind, &self.planet, &mut self.rng);
        self.hazards.push(hazard);
        self.events.push(GameEvent::HazardSpawned { id, kind });
        id
    }

    /// Number of live bombs of `kind`
    pub fn count(&self, kind: HazardKind) -> usize {
        self.hazards.iter().filter(|h| h.kind == kind).count()
    }

    pub fn boss(&self) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.kind == HazardKind::Boss)
    }

    pub fn moving(&self) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.kind == HazardKind::Moving)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }
}
