//! Tank Arena - simulation core for an arena tank-combat game
//!
//! Core modules:
//! - `sim`: Authoritative game state, AI, projectiles, rules and the tick orchestrator
//! - `settings`: Data-driven session configuration (difficulty, mode, CTF threshold)

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
///
/// Distances are arena units on the horizontal plane. Per-tick values assume
/// the nominal 60 Hz step.
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena half-width; the playable square is [-GRID_LENGTH, GRID_LENGTH]²
    pub const GRID_LENGTH: f32 = 50.0;
    /// Margin kept from the wall when sampling random placements
    pub const PLACEMENT_MARGIN: f32 = 5.0;

    /// Collision radius of every tank (the boss included)
    pub const TANK_RADIUS: f32 = 2.0;
    pub const TANK_MAX_HEALTH: u32 = 100;
    /// Units per movement step
    pub const TANK_SPEED: f32 = 0.5;
    /// Degrees per rotate command
    pub const PLAYER_ROTATION_STEP: f32 = 5.0;

    /// Units per tick
    pub const BULLET_SPEED: f32 = 0.5;
    pub const PLAYER_DAMAGE: u32 = 20;

    /// Boss health is this multiple of a regular tank
    pub const BOSS_HEALTH_MULTIPLIER: u32 = 5;
    pub const BOSS_SPEED: f32 = 0.4;
    pub const BOSS_ROTATION_STEP: f32 = 4.0;
    pub const BOSS_FIRE_CHANCE: f64 = 0.05;
    /// Angle between the two boss projectiles (degrees)
    pub const BOSS_SPREAD: f32 = 10.0;

    /// Explosion lifetime in ticks
    pub const EXPLOSION_LIFETIME: u32 = 30;
    /// Portal marker lifetime in ticks
    pub const PORTAL_LIFETIME: u32 = 30;

    pub const RESPAWN_ATTEMPTS: u32 = 500;
    pub const TELEPORT_ATTEMPTS: u32 = 100;
    pub const POWERUP_ATTEMPTS: u32 = 100;
    /// Samples tried when placing extra tanks for hard difficulty
    pub const REINFORCEMENT_ATTEMPTS: u32 = 100;
    /// Seconds between automatic teleports
    pub const AUTO_TELEPORT_INTERVAL: f64 = 30.0;

    /// Seconds an uncollected power-up stays on the field
    pub const POWERUP_LIFETIME: f64 = 15.0;
    pub const POWERUP_MIN_IDLE: f64 = 15.0;
    pub const POWERUP_MAX_IDLE: f64 = 20.0;
    pub const SPEED_BOOST_DURATION: f64 = 10.0;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 2.0;

    /// Player kills that summon the boss in normal mode
    pub const BOSS_TRIGGER_KILLS: u32 = 2;
    /// Enemy-side kills that end the match
    pub const ENEMY_WIN_KILLS: u32 = 5;
    pub const DEFAULT_CTF_HOLD_SECONDS: f32 = 10.0;

    /// Enemy count including the player at index 0
    pub const EASY_ROSTER: usize = 2;
    pub const HARD_ROSTER: usize = 4;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `current` to `target`, in [-180, 180)
#[inline]
pub fn angle_delta(target: f32, current: f32) -> f32 {
    (target - current + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit heading vector for a rotation in degrees.
///
/// Rotation 0 faces +z, rotation 90 faces +x.
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Bearing in degrees from `from` to `to`, normalized to [0, 360)
#[inline]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    wrap_degrees(d.x.atan2(d.y).to_degrees())
}
