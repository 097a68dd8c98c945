//! Enemy and boss controllers
//!
//! Enemies run a two-state machine (chasing / avoiding). The boss is a simpler
//! always-chasing variant with a twin-shot cannon.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::out_of_bounds;
use super::obstacles::ObstacleField;
use super::state::{AiMode, Difficulty, GameSession, Projectile, Tank, TankId};
use crate::consts::*;
use crate::{angle_delta, bearing_degrees, heading_vector, wrap_degrees};

/// No turning when already within this many degrees of the target bearing
pub const AI_TURN_DEADBAND: f32 = 5.0;
/// Enemies close in only while farther than this
pub const AI_CHASE_DISTANCE: f32 = 20.0;
/// Enemies advance only when facing within this cone (degrees)
pub const AI_MOVE_CONE: f32 = 10.0;
pub const AI_FIRE_CONE: f32 = 5.0;
pub const AI_FIRE_RANGE: f32 = 40.0;
/// Maximum aim error (degrees) applied to a missed shot
pub const AI_MISS_SPREAD: f32 = 40.0;

pub const AVOID_TICKS: u32 = 20;
/// Degrees per tick while avoiding
pub const AVOID_TURN_STEP: f32 = 2.0;
/// While avoiding, a forward step is attempted every this many ticks
pub const AVOID_MOVE_INTERVAL: u32 = 5;

pub const BOSS_CHASE_DISTANCE: f32 = 15.0;
pub const BOSS_MOVE_CONE: f32 = 15.0;
pub const BOSS_FIRE_CONE: f32 = 10.0;

/// Whether an AI tank may stand at `point`. Lava counts as blocked.
fn path_clear(obstacles: &ObstacleField, point: Vec2) -> bool {
    !out_of_bounds(point) && !obstacles.blocks_movement(point) && !obstacles.hazard_at(point)
}

fn turn_toward(rotation: f32, delta: f32, step: f32) -> f32 {
    if delta.abs() > AI_TURN_DEADBAND {
        wrap_degrees(rotation + step * delta.signum())
    } else {
        rotation
    }
}

/// Run one tick of AI for every live enemy
pub fn update_enemies(session: &mut GameSession, dt: f32) {
    let Some(player) = session.tanks.first() else {
        return;
    };
    if !player.is_alive() {
        return;
    }
    let target = player.position;

    let GameSession {
        tanks,
        projectiles,
        obstacles,
        rng,
        difficulty,
        ..
    } = session;

    for (idx, tank) in tanks.iter_mut().enumerate().skip(1) {
        if !tank.is_alive() {
            continue;
        }
        if let Some(shot) = step_enemy(tank, idx, target, *difficulty, obstacles, rng, dt) {
            projectiles.push(shot);
        }
    }
}

/// Advance one enemy's state machine. Returns a projectile if it fired.
fn step_enemy(
    tank: &mut Tank,
    idx: usize,
    target: Vec2,
    difficulty: Difficulty,
    obstacles: &ObstacleField,
    rng: &mut Pcg32,
    dt: f32,
) -> Option<Projectile> {
    let delta = angle_delta(bearing_degrees(tank.position, target), tank.rotation);
    let distance = tank.position.distance(target);
    let speed = difficulty.move_speed();

    tank.fire_cooldown = (tank.fire_cooldown - dt).max(0.0);

    match tank.ai.mode {
        AiMode::Chasing => {
            tank.rotation = turn_toward(tank.rotation, delta, difficulty.rotation_step());

            if distance > AI_CHASE_DISTANCE && delta.abs() < AI_MOVE_CONE {
                let next = tank.position + heading_vector(tank.rotation) * speed;
                if path_clear(obstacles, next) {
                    tank.position = next;
                } else {
                    tank.ai.mode = AiMode::Avoiding;
                    tank.ai.avoid_timer = AVOID_TICKS;
                    tank.ai.avoid_direction = if rng.random_bool(0.5) { 1 } else { -1 };
                }
            }

            if tank.fire_cooldown <= 0.0 && delta.abs() < AI_FIRE_CONE && distance < AI_FIRE_RANGE
            {
                let mut angle = tank.rotation;
                if rng.random_bool(difficulty.miss_chance()) {
                    angle += rng.random_range(-AI_MISS_SPREAD..=AI_MISS_SPREAD);
                }
                tank.fire_cooldown = difficulty.fire_cooldown();
                return Some(Projectile {
                    position: tank.position,
                    direction: heading_vector(angle),
                    owner: TankId::Tank(idx),
                });
            }
        }
        AiMode::Avoiding => {
            if tank.ai.avoid_timer > 0 {
                let turn = AVOID_TURN_STEP * f32::from(tank.ai.avoid_direction);
                tank.rotation = wrap_degrees(tank.rotation + turn);
                tank.ai.avoid_timer -= 1;

                if tank.ai.avoid_timer % AVOID_MOVE_INTERVAL == 0 {
                    let next = tank.position + heading_vector(tank.rotation) * speed;
                    if path_clear(obstacles, next) {
                        tank.position = next;
                    }
                }
            } else {
                tank.ai.mode = AiMode::Chasing;
            }
        }
    }

    None
}

/// Run one tick of the boss controller
pub fn update_boss(session: &mut GameSession) {
    let Some(player) = session.tanks.first() else {
        return;
    };
    if !player.is_alive() {
        return;
    }
    let target = player.position;

    let GameSession {
        boss,
        projectiles,
        obstacles,
        rng,
        ..
    } = session;
    let Some(boss) = boss.as_mut().filter(|b| b.is_alive()) else {
        return;
    };

    let delta = angle_delta(bearing_degrees(boss.position, target), boss.rotation);
    let distance = boss.position.distance(target);

    boss.rotation = turn_toward(boss.rotation, delta, BOSS_ROTATION_STEP);

    if distance > BOSS_CHASE_DISTANCE && delta.abs() < BOSS_MOVE_CONE {
        let next = boss.position + heading_vector(boss.rotation) * BOSS_SPEED * 0.25;
        if path_clear(obstacles, next) {
            boss.position = next;
        }
    }

    if delta.abs() < BOSS_FIRE_CONE && rng.random_bool(BOSS_FIRE_CHANCE) {
        for offset in [0.0, BOSS_SPREAD] {
            projectiles.push(Projectile {
                position: boss.position,
                direction: heading_vector(boss.rotation + offset),
                owner: TankId::Boss,
            });
        }
    }
}
