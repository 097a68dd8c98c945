//! Mode and progression rules
//!
//! Respawns, win conditions, boss summoning, capture-the-flag, power-ups,
//! teleporting and roster changes. Every placement search is capped.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{out_of_bounds, tanks_overlap};
use super::state::{
    Difficulty, Flag, GameEvent, GameMode, GameSession, Portal, PowerUp, PowerUpEffect, Side,
    Tank, TankId,
};
use crate::consts::*;

/// Boss spawn point and heading
pub const BOSS_SPAWN: Vec2 = Vec2::new(0.0, 30.0);
pub const BOSS_SPAWN_ROTATION: f32 = 180.0;

/// Uniform point inside the arena, away from the walls
fn random_field_point(rng: &mut Pcg32) -> Vec2 {
    let extent = GRID_LENGTH - PLACEMENT_MARGIN;
    Vec2::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
    )
}

/// Whether a tank could stand at `point` without overlapping anything.
///
/// `ignore` is the tank being placed, so its old position does not count.
pub fn spot_is_clear(session: &GameSession, point: Vec2, ignore: Option<TankId>) -> bool {
    if out_of_bounds(point)
        || session.obstacles.blocks_movement(point)
        || session.obstacles.hazard_at(point)
    {
        return false;
    }
    let roster_clear = session.tanks.iter().enumerate().all(|(idx, tank)| {
        Some(TankId::Tank(idx)) == ignore
            || !tank.is_alive()
            || !tanks_overlap(point, tank.position)
    });
    let boss_clear = match &session.boss {
        Some(boss) if ignore != Some(TankId::Boss) && boss.is_alive() => {
            !tanks_overlap(point, boss.position)
        }
        _ => true,
    };
    roster_clear && boss_clear
}

/// Candidate respawn point in the quadrant assigned to a roster slot
fn quadrant_point(idx: usize, rng: &mut Pcg32) -> Vec2 {
    let sign_x = if idx % 2 == 1 { 1.0 } else { -1.0 };
    let sign_z = if (idx / 2) % 2 == 1 { 1.0 } else { -1.0 };
    let reach = GRID_LENGTH - 10.0;
    Vec2::new(
        sign_x * reach * (0.3 + 0.7 * rng.random::<f32>()),
        sign_z * reach * (0.3 + 0.7 * rng.random::<f32>()),
    )
}

/// Find a clear respawn point for a roster slot
pub fn respawn_position(session: &mut GameSession, idx: usize) -> Option<Vec2> {
    for _ in 0..RESPAWN_ATTEMPTS {
        let candidate = quadrant_point(idx, &mut session.rng);
        if spot_is_clear(session, candidate, Some(TankId::Tank(idx))) {
            return Some(candidate);
        }
    }
    None
}

/// Restore a roster tank at a clear spot with full health.
///
/// Returns false (and leaves the tank untouched) if no spot was found.
pub fn respawn_tank(session: &mut GameSession, idx: usize) -> bool {
    if idx >= session.tanks.len() {
        return false;
    }
    let Some(position) = respawn_position(session, idx) else {
        log::warn!("No clear respawn point for tank {} this tick", idx);
        return false;
    };
    let rotation = if idx == 0 { 0.0 } else { 180.0 };
    session.tanks[idx].restore(position, rotation);
    session.events.push(GameEvent::TankRespawned { index: idx });
    true
}

/// Bring back tanks destroyed on earlier ticks
pub fn process_respawns(session: &mut GameSession) {
    let pending = std::mem::take(&mut session.pending_respawns);
    for idx in pending {
        let Some(tank) = session.tanks.get(idx) else {
            continue;
        };
        // The boss has taken this slot for the rest of the match
        if idx == 1 && session.boss_active() {
            continue;
        }
        if tank.is_alive() {
            continue;
        }
        if !respawn_tank(session, idx) {
            session.pending_respawns.push(idx);
        }
    }
}

/// Summon the boss, retiring enemy 1
pub fn spawn_boss(session: &mut GameSession) {
    session.boss = Some(Tank::boss(BOSS_SPAWN, BOSS_SPAWN_ROTATION));
    if let Some(enemy) = session.tanks.get_mut(1) {
        enemy.health = 0;
    }
    session.pending_respawns.retain(|&idx| idx != 1);
    session.events.push(GameEvent::BossSpawned);
    log::info!("Boss spawned after {} player kills", session.scores[0]);
}

pub fn check_win_conditions(session: &mut GameSession) {
    if session.game_over {
        return;
    }

    if session.game_mode == GameMode::Normal
        && session.scores[0] >= BOSS_TRIGGER_KILLS
        && !session.boss_active()
    {
        spawn_boss(session);
    } else if session.scores[1] >= ENEMY_WIN_KILLS {
        session.end_match(Side::Enemy);
    }
}

/// Hand the flag to the first live enemy, or leave it on the ground
/// where enemy 1 stands when no enemy is alive
fn place_flag(session: &GameSession) -> Flag {
    let holder = session
        .tanks
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, tank)| tank.is_alive())
        .map(|(idx, _)| idx);
    match holder {
        Some(holder) => Flag::HeldByEnemy { holder },
        None => Flag::Dropped {
            position: session.tanks.get(1).map_or(Vec2::ZERO, |t| t.position),
        },
    }
}

/// Capture-the-flag state machine
pub fn update_flag(session: &mut GameSession, dt: f32) {
    if session.game_mode != GameMode::Ctf || session.game_over {
        return;
    }

    if session.flag == Flag::None {
        session.flag = place_flag(session);
    }

    // A holder retired or removed outside of combat gives up the flag
    if let Flag::HeldByEnemy { holder } = session.flag {
        match session.tanks.get(holder).map(|t| (t.is_alive(), t.position)) {
            Some((true, _)) => {}
            Some((false, position)) => {
                session.flag = Flag::Dropped { position };
                session.events.push(GameEvent::FlagDropped { position });
            }
            None => session.flag = place_flag(session),
        }
    }

    match session.flag {
        Flag::HeldByPlayer { hold_timer } => {
            let hold_timer = hold_timer + dt;
            session.flag = Flag::HeldByPlayer { hold_timer };
            if hold_timer >= session.ctf_hold_seconds {
                log::info!("Flag held for {:.1}s", hold_timer);
                session.end_match(Side::Player);
            }
        }
        Flag::Dropped { position } => {
            let reached = session
                .player()
                .is_some_and(|p| p.is_alive() && tanks_overlap(p.position, position));
            if reached {
                session.flag = Flag::HeldByPlayer { hold_timer: 0.0 };
                session.events.push(GameEvent::FlagCaptured);
                log::info!("Player picked up the flag");
            }
        }
        _ => {}
    }
}

/// Begin a fresh idle period before the next power-up
pub fn start_powerup_idle(session: &mut GameSession) {
    session.powerup_idle_since = session.elapsed;
    session.powerup_idle_delay = session
        .rng
        .random_range(POWERUP_MIN_IDLE..=POWERUP_MAX_IDLE);
}

fn spawn_powerup(session: &mut GameSession) -> bool {
    for _ in 0..POWERUP_ATTEMPTS {
        let candidate = random_field_point(&mut session.rng);
        if spot_is_clear(session, candidate, None) {
            session.powerup = Some(PowerUp {
                position: candidate,
                spawn_time: session.elapsed,
            });
            session.events.push(GameEvent::PowerUpSpawned {
                position: candidate,
            });
            return true;
        }
    }
    false
}

pub fn apply_powerup(session: &mut GameSession, effect: PowerUpEffect) {
    match effect {
        PowerUpEffect::Heal => {
            if let Some(player) = session.player_mut() {
                player.health = player.max_health;
            }
        }
        PowerUpEffect::SpeedBoost => {
            session.speed_boost_until = Some(session.elapsed + SPEED_BOOST_DURATION);
        }
    }
    session.events.push(GameEvent::PowerUpCollected { effect });
    log::debug!("Power-up collected: {:?}", effect);
}

/// Power-up spawn, expiry, pickup and speed-boost timeout
pub fn update_powerup(session: &mut GameSession) {
    if session.game_over {
        return;
    }
    let now = session.elapsed;

    let expired = session
        .powerup
        .as_ref()
        .map(|p| now - p.spawn_time >= POWERUP_LIFETIME);
    match expired {
        None => {
            if now - session.powerup_idle_since >= session.powerup_idle_delay {
                // On failure the field stays empty and we try again next tick
                spawn_powerup(session);
            }
        }
        Some(true) => {
            session.powerup = None;
            start_powerup_idle(session);
        }
        Some(false) => {}
    }

    let collected = match (session.player(), &session.powerup) {
        (Some(player), Some(powerup)) => {
            player.is_alive() && tanks_overlap(player.position, powerup.position)
        }
        _ => false,
    };
    if collected {
        let effect = if session.rng.random_bool(0.5) {
            PowerUpEffect::Heal
        } else {
            PowerUpEffect::SpeedBoost
        };
        apply_powerup(session, effect);
        session.powerup = None;
        start_powerup_idle(session);
    }

    if session.speed_boost_until.is_some_and(|until| now >= until) {
        session.speed_boost_until = None;
    }
}

/// Move the player to a random clear spot. No-op if none is found.
pub fn teleport_player(session: &mut GameSession) -> bool {
    if session.player().is_none() {
        return false;
    }
    for _ in 0..TELEPORT_ATTEMPTS {
        let candidate = random_field_point(&mut session.rng);
        if spot_is_clear(session, candidate, Some(TankId::PLAYER)) {
            if let Some(player) = session.player_mut() {
                player.position = candidate;
            }
            session.portal = Some(Portal {
                position: candidate,
                ticks_left: PORTAL_LIFETIME,
            });
            session.events.push(GameEvent::Teleported {
                position: candidate,
            });
            log::debug!("Teleported to ({:.1}, {:.1})", candidate.x, candidate.y);
            return true;
        }
    }
    log::debug!("Teleport found no clear spot");
    false
}

pub fn update_portal(session: &mut GameSession) {
    if let Some(portal) = &mut session.portal {
        portal.ticks_left = portal.ticks_left.saturating_sub(1);
        if portal.ticks_left == 0 {
            session.portal = None;
        }
    }
}

pub fn toggle_auto_teleport(session: &mut GameSession) {
    session.auto_teleport = !session.auto_teleport;
    if session.auto_teleport {
        session.last_auto_teleport = session.elapsed;
        teleport_player(session);
    }
}

pub fn update_auto_teleport(session: &mut GameSession) {
    let player_alive = session.player().is_some_and(|p| p.is_alive());
    if !session.auto_teleport || session.game_over || !player_alive {
        return;
    }
    if session.elapsed - session.last_auto_teleport >= AUTO_TELEPORT_INTERVAL {
        teleport_player(session);
        session.last_auto_teleport = session.elapsed;
    }
}

/// Change difficulty, resizing the enemy roster for easy and hard
pub fn set_difficulty(session: &mut GameSession, difficulty: Difficulty) {
    if session.difficulty == difficulty {
        return;
    }
    session.difficulty = difficulty;

    match difficulty {
        Difficulty::Hard => {
            while session.tanks.len() < HARD_ROSTER {
                let position = extra_tank_position(session);
                let rotation = session.rng.random_range(0.0..360.0);
                session.tanks.push(Tank::new(position, rotation));
            }
        }
        Difficulty::Easy => {
            session.tanks.truncate(EASY_ROSTER);
            session.pending_respawns.retain(|&idx| idx < EASY_ROSTER);
        }
        Difficulty::Medium => {}
    }
    log::info!(
        "Difficulty set to {} ({} tanks)",
        difficulty.as_str(),
        session.tanks.len()
    );
}

/// Random spot for a reinforcement, preferring a clear one
fn extra_tank_position(session: &mut GameSession) -> Vec2 {
    let mut candidate = random_field_point(&mut session.rng);
    for _ in 0..REINFORCEMENT_ATTEMPTS {
        if spot_is_clear(session, candidate, None) {
            break;
        }
        candidate = random_field_point(&mut session.rng);
    }
    candidate
}

pub fn set_game_mode(session: &mut GameSession, mode: GameMode) {
    if session.game_mode == mode {
        return;
    }
    session.game_mode = mode;
    if mode != GameMode::Ctf {
        session.flag = Flag::None;
    }
    log::info!("Game mode set to {}", mode.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::{Obstacle, ObstacleField, ObstacleKind};
    use crate::sim::state::FlagStatus;

    fn arena(seed: u64) -> GameSession {
        let mut session = GameSession::new(seed);
        session.obstacles = ObstacleField::default();
        session
    }

    #[test]
    fn test_respawn_avoids_obstacles_and_tanks() {
        for seed in 0..50 {
            let mut session = GameSession::new(seed);
            session.tanks[1].health = 0;
            assert!(respawn_tank(&mut session, 1));
            let enemy = &session.tanks[1];
            assert_eq!(enemy.health, TANK_MAX_HEALTH);
            assert_eq!(enemy.rotation, 180.0);
            assert!(!session.obstacles.blocks_movement(enemy.position));
            assert!(!tanks_overlap(enemy.position, session.tanks[0].position));
            // Slot 1 lands in the +x / -z quadrant
            assert!(enemy.position.x > 0.0 && enemy.position.y < 0.0);
        }
    }

    #[test]
    fn test_respawn_gives_up_in_congested_arena() {
        let mut session = arena(3);
        // One huge building covering the whole field
        session.obstacles = ObstacleField::new(vec![Obstacle::new(
            Vec2::ZERO,
            ObstacleKind::Building { size: 200.0 },
        )]);
        session.tanks[1].health = 0;
        session.pending_respawns.push(1);
        process_respawns(&mut session);
        assert_eq!(session.tanks[1].health, 0);
        assert_eq!(session.pending_respawns, vec![1]);
    }

    #[test]
    fn test_process_respawns_skips_removed_slots() {
        let mut session = arena(4);
        session.pending_respawns = vec![7];
        process_respawns(&mut session);
        assert!(session.pending_respawns.is_empty());
    }

    #[test]
    fn test_boss_spawn_retires_enemy_one() {
        let mut session = arena(5);
        session.scores = [2, 0];
        session.pending_respawns.push(1);
        check_win_conditions(&mut session);
        assert!(session.boss_active());
        assert_eq!(session.tanks[1].health, 0);
        assert!(session.pending_respawns.is_empty());
        assert!(!session.game_over);

        // Only once
        session.scores = [3, 0];
        check_win_conditions(&mut session);
        assert_eq!(session.boss.as_ref().unwrap().health, 500);
    }

    #[test]
    fn test_no_boss_in_ctf() {
        let mut session = arena(6);
        session.game_mode = GameMode::Ctf;
        session.scores = [4, 0];
        check_win_conditions(&mut session);
        assert!(!session.boss_active());
    }

    #[test]
    fn test_enemy_kills_end_match() {
        let mut session = arena(7);
        session.scores = [0, ENEMY_WIN_KILLS];
        check_win_conditions(&mut session);
        assert!(session.game_over);
        assert_eq!(session.winner, Some(Side::Enemy));
    }

    #[test]
    fn test_flag_lifecycle() {
        let mut session = arena(8);
        session.game_mode = GameMode::Ctf;
        session.ctf_hold_seconds = 1.0;

        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag.status(), FlagStatus::HeldByEnemy);
        assert_eq!(session.flag.holder(), Some(1));

        let drop_at = session.tanks[0].position + Vec2::new(1.0, 0.0);
        session.flag = Flag::Dropped { position: drop_at };
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag.status(), FlagStatus::HeldByPlayer);
        assert_eq!(session.flag.hold_timer(), 0.0);

        for _ in 0..70 {
            update_flag(&mut session, SIM_DT);
        }
        assert!(session.game_over);
        assert_eq!(session.winner, Some(Side::Player));
    }

    #[test]
    fn test_flag_never_given_to_retired_enemy() {
        let mut session = arena(18);
        session.scores = [2, 0];
        check_win_conditions(&mut session);
        assert!(session.boss_active());
        let retired_at = session.tanks[1].position;

        set_game_mode(&mut session, GameMode::Ctf);
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag, Flag::Dropped { position: retired_at });

        // The player can still take it
        session.tanks[0].position = retired_at;
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag.status(), FlagStatus::HeldByPlayer);
    }

    #[test]
    fn test_flag_goes_to_first_live_enemy() {
        let mut session = arena(19);
        set_difficulty(&mut session, Difficulty::Hard);
        session.tanks[1].health = 0;
        session.game_mode = GameMode::Ctf;
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag, Flag::HeldByEnemy { holder: 2 });
    }

    #[test]
    fn test_stale_holder_drops_or_hands_over() {
        let mut session = arena(20);
        set_difficulty(&mut session, Difficulty::Hard);
        session.game_mode = GameMode::Ctf;

        session.flag = Flag::HeldByEnemy { holder: 2 };
        session.tanks[2].health = 0;
        let at = session.tanks[2].position;
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag, Flag::Dropped { position: at });

        session.flag = Flag::HeldByEnemy { holder: 3 };
        set_difficulty(&mut session, Difficulty::Easy);
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag, Flag::HeldByEnemy { holder: 1 });
    }

    #[test]
    fn test_flag_not_picked_up_from_afar() {
        let mut session = arena(9);
        session.game_mode = GameMode::Ctf;
        session.flag = Flag::Dropped {
            position: Vec2::new(20.0, 20.0),
        };
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag.status(), FlagStatus::Dropped);
    }

    #[test]
    fn test_powerup_spawns_after_idle_and_expires() {
        let mut session = arena(10);
        session.powerup_idle_since = 0.0;
        session.powerup_idle_delay = 15.0;
        session.tanks[0].position = Vec2::new(-40.0, -40.0);
        session.tanks[1].position = Vec2::new(40.0, 40.0);

        session.elapsed = 14.9;
        update_powerup(&mut session);
        assert!(session.powerup.is_none());

        session.elapsed = 15.0;
        update_powerup(&mut session);
        let powerup = session.powerup.clone().expect("power-up should spawn");
        assert_eq!(powerup.spawn_time, 15.0);

        // Move the player well away so it is not collected, then let it expire
        session.tanks[0].position = -powerup.position.signum() * 45.0;
        session.elapsed = 15.0 + POWERUP_LIFETIME;
        update_powerup(&mut session);
        assert!(session.powerup.is_none());
        assert!((POWERUP_MIN_IDLE..=POWERUP_MAX_IDLE).contains(&session.powerup_idle_delay));
    }

    #[test]
    fn test_powerup_collection() {
        let mut session = arena(11);
        session.tanks[0].health = 10;
        session.powerup = Some(PowerUp {
            position: session.tanks[0].position + Vec2::new(1.0, 1.0),
            spawn_time: 0.0,
        });
        update_powerup(&mut session);
        assert!(session.powerup.is_none());
        let healed = session.tanks[0].health == TANK_MAX_HEALTH;
        let boosted = session.speed_boost_until.is_some();
        assert!(healed != boosted);
    }

    #[test]
    fn test_speed_boost_expires() {
        let mut session = arena(12);
        apply_powerup(&mut session, PowerUpEffect::SpeedBoost);
        assert_eq!(session.speed_multiplier(), SPEED_BOOST_MULTIPLIER);
        session.elapsed += SPEED_BOOST_DURATION;
        update_powerup(&mut session);
        assert_eq!(session.speed_multiplier(), 1.0);
    }

    #[test]
    fn test_teleport_lands_clear() {
        let mut session = GameSession::new(13);
        assert!(teleport_player(&mut session));
        let pos = session.tanks[0].position;
        assert!(spot_is_clear(&session, pos, Some(TankId::PLAYER)));
        let portal = session.portal.clone().unwrap();
        assert_eq!(portal.position, pos);
        assert_eq!(portal.ticks_left, PORTAL_LIFETIME);

        for _ in 0..PORTAL_LIFETIME {
            update_portal(&mut session);
        }
        assert!(session.portal.is_none());
    }

    #[test]
    fn test_teleport_failure_is_noop() {
        let mut session = arena(14);
        session.obstacles = ObstacleField::new(vec![Obstacle::new(
            Vec2::ZERO,
            ObstacleKind::Building { size: 200.0 },
        )]);
        let before = session.tanks[0].position;
        assert!(!teleport_player(&mut session));
        assert_eq!(session.tanks[0].position, before);
        assert!(session.portal.is_none());
    }

    #[test]
    fn test_auto_teleport_interval() {
        let mut session = arena(15);
        toggle_auto_teleport(&mut session);
        assert!(session.auto_teleport);
        let first = session.tanks[0].position;

        session.elapsed = AUTO_TELEPORT_INTERVAL - 1.0;
        update_auto_teleport(&mut session);
        assert_eq!(session.tanks[0].position, first);

        session.elapsed = AUTO_TELEPORT_INTERVAL;
        update_auto_teleport(&mut session);
        assert_ne!(session.tanks[0].position, first);
        assert_eq!(session.last_auto_teleport, AUTO_TELEPORT_INTERVAL);
    }

    #[test]
    fn test_difficulty_resizes_roster() {
        let mut session = GameSession::new(16);
        set_difficulty(&mut session, Difficulty::Hard);
        assert_eq!(session.tanks.len(), HARD_ROSTER);
        assert!(session.tanks[2..].iter().all(|t| t.health == TANK_MAX_HEALTH));

        set_difficulty(&mut session, Difficulty::Medium);
        assert_eq!(session.tanks.len(), HARD_ROSTER);

        session.pending_respawns = vec![1, 3];
        set_difficulty(&mut session, Difficulty::Easy);
        assert_eq!(session.tanks.len(), EASY_ROSTER);
        assert_eq!(session.pending_respawns, vec![1]);
    }

    #[test]
    fn test_leaving_ctf_clears_flag() {
        let mut session = arena(17);
        set_game_mode(&mut session, GameMode::Ctf);
        update_flag(&mut session, SIM_DT);
        assert_eq!(session.flag.status(), FlagStatus::HeldByEnemy);
        set_game_mode(&mut session, GameMode::Normal);
        assert_eq!(session.flag, Flag::None);
    }
}
