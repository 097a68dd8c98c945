//! Projectile integration, hit resolution and damage

use super::collision::{out_of_bounds, projectile_hits_tank};
use super::state::{Flag, GameEvent, GameMode, GameSession, Side, TankId};
use crate::consts::{BULLET_SPEED, PLAYER_DAMAGE};

/// Damage a projectile from `owner` deals at the current difficulty
pub fn projectile_damage(session: &GameSession, owner: TankId) -> u32 {
    match owner.side() {
        Side::Player => PLAYER_DAMAGE,
        Side::Enemy => session.difficulty.enemy_damage(),
    }
}

/// First live tank (other than the owner) the projectile overlaps.
///
/// Player shells can also hit the boss; enemy shells pass through it.
fn find_target(session: &GameSession, position: glam::Vec2, owner: TankId) -> Option<TankId> {
    let roster_hit = session
        .tanks
        .iter()
        .enumerate()
        .map(|(idx, tank)| (TankId::Tank(idx), tank))
        .find(|(id, tank)| {
            *id != owner && tank.is_alive() && projectile_hits_tank(position, tank.position)
        })
        .map(|(id, _)| id);
    if roster_hit.is_some() {
        return roster_hit;
    }

    match (&session.boss, owner.side()) {
        (Some(boss), Side::Player)
            if boss.is_alive() && projectile_hits_tank(position, boss.position) =>
        {
            Some(TankId::Boss)
        }
        _ => None,
    }
}

/// Advance every projectile one step and resolve what it hits
pub fn update_projectiles(session: &mut GameSession) {
    let in_flight = std::mem::take(&mut session.projectiles);
    let mut survivors = Vec::with_capacity(in_flight.len());

    for mut projectile in in_flight {
        projectile.position += projectile.direction * BULLET_SPEED;
        let pos = projectile.position;

        if out_of_bounds(pos) {
            continue;
        }

        if session.obstacles.blocks_projectile(pos) {
            session.spawn_explosion(pos);
            continue;
        }

        if let Some(target) = find_target(session, pos, projectile.owner) {
            session.spawn_explosion(pos);
            let amount = projectile_damage(session, projectile.owner);
            damage_tank(session, target, amount, Some(projectile.owner));
            continue;
        }

        survivors.push(projectile);
    }

    session.projectiles = survivors;
}

/// Apply damage to a tank. Dead or missing targets are ignored.
///
/// Returns true if this call killed the tank.
pub fn damage_tank(
    session: &mut GameSession,
    target: TankId,
    amount: u32,
    source: Option<TankId>,
) -> bool {
    let Some(tank) = session.tank_mut(target) else {
        return false;
    };
    let death_position = tank.position;
    if !tank.take_damage(amount) {
        return false;
    }

    session.events.push(GameEvent::TankDestroyed {
        victim: target,
        by: source,
    });

    match target {
        TankId::Boss => {
            log::info!("Boss destroyed");
            session.end_match(Side::Player);
        }
        TankId::Tank(idx) => {
            if let Some(shooter) = source {
                if shooter.side() != target.side() {
                    session.scores[shooter.side().score_index()] += 1;
                }
            }
            log::debug!(
                "Tank {} destroyed by {:?}, scores {:?}",
                idx,
                source,
                session.scores
            );

            if session.game_mode == GameMode::Ctf {
                on_ctf_death(session, idx, death_position);
            }
            if !session.pending_respawns.contains(&idx) {
                session.pending_respawns.push(idx);
            }
        }
    }
    true
}

fn on_ctf_death(session: &mut GameSession, idx: usize, position: glam::Vec2) {
    match session.flag {
        Flag::HeldByEnemy { holder } if holder == idx => {
            session.flag = Flag::Dropped { position };
            session.events.push(GameEvent::FlagDropped { position });
            log::info!("Flag dropped at ({:.1}, {:.1})", position.x, position.y);
        }
        Flag::HeldByPlayer { .. } if idx == 0 => {
            session.end_match(Side::Enemy);
        }
        _ => {}
    }
}

/// Destroy any roster tank standing in a hazard area
pub fn apply_hazards(session: &mut GameSession) {
    for idx in 0..session.tanks.len() {
        let tank = &session.tanks[idx];
        if tank.is_alive() && session.obstacles.hazard_at(tank.position) {
            let health = tank.health;
            damage_tank(session, TankId::Tank(idx), health, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::obstacles::{Obstacle, ObstacleField, ObstacleKind};
    use crate::sim::state::{Difficulty, Projectile, Tank};
    use glam::Vec2;

    fn arena() -> GameSession {
        let mut session = GameSession::new(21);
        session.obstacles = ObstacleField::default();
        session.tanks[0].position = Vec2::new(-30.0, -30.0);
        session.tanks[1].position = Vec2::new(30.0, 30.0);
        session
    }

    fn shell(position: Vec2, direction: Vec2, owner: TankId) -> Projectile {
        Projectile {
            position,
            direction,
            owner,
        }
    }

    #[test]
    fn test_projectile_leaves_arena() {
        let mut session = arena();
        session
            .projectiles
            .push(shell(Vec2::new(GRID_LENGTH - 0.2, 0.0), Vec2::X, TankId::PLAYER));
        update_projectiles(&mut session);
        assert!(session.projectiles.is_empty());
        assert!(session.explosions.is_empty());
    }

    #[test]
    fn test_projectile_hits_obstacle() {
        let mut session = arena();
        // Blocks within 1.5 + TANK_RADIUS of (0, 3.9); one step lands at 3.4
        session.obstacles = ObstacleField::new(vec![Obstacle::new(
            Vec2::new(0.0, 3.9),
            ObstacleKind::Cube {
                size: 3.0,
                drift: None,
            },
        )]);
        session
            .projectiles
            .push(shell(Vec2::ZERO, Vec2::Y, TankId::PLAYER));
        update_projectiles(&mut session);
        assert!(session.projectiles.is_empty());
        assert_eq!(session.explosions.len(), 1);
    }

    #[test]
    fn test_projectile_grazing_obstacle_edge_flies_on() {
        let mut session = arena();
        // Exactly at the padded reach is not a hit
        session.obstacles = ObstacleField::new(vec![Obstacle::new(
            Vec2::new(0.0, 4.0),
            ObstacleKind::Cube {
                size: 3.0,
                drift: None,
            },
        )]);
        session
            .projectiles
            .push(shell(Vec2::ZERO, Vec2::Y, TankId::PLAYER));
        update_projectiles(&mut session);
        assert_eq!(session.projectiles.len(), 1);
        assert!(session.explosions.is_empty());
    }

    #[test]
    fn test_projectile_flies_on() {
        let mut session = arena();
        session
            .projectiles
            .push(shell(Vec2::ZERO, Vec2::X, TankId::PLAYER));
        update_projectiles(&mut session);
        assert_eq!(session.projectiles.len(), 1);
        assert!((session.projectiles[0].position.x - BULLET_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_owner_is_never_hit() {
        let mut session = arena();
        let player = session.tanks[0].position;
        session
            .projectiles
            .push(shell(player, Vec2::X, TankId::PLAYER));
        update_projectiles(&mut session);
        assert_eq!(session.tanks[0].health, TANK_MAX_HEALTH);
        assert_eq!(session.projectiles.len(), 1);
    }

    #[test]
    fn test_enemy_damage_follows_difficulty() {
        for (difficulty, expected) in [
            (Difficulty::Easy, 2),
            (Difficulty::Medium, 4),
            (Difficulty::Hard, 2),
        ] {
            let mut session = arena();
            session.difficulty = difficulty;
            let player = session.tanks[0].position;
            session
                .projectiles
                .push(shell(player - Vec2::X, Vec2::X, TankId::Tank(1)));
            update_projectiles(&mut session);
            assert_eq!(session.tanks[0].health, TANK_MAX_HEALTH - expected);
        }
    }

    #[test]
    fn test_kill_scores_and_queues_respawn() {
        let mut session = arena();
        session.tanks[1].health = 20;
        let enemy = session.tanks[1].position;
        session
            .projectiles
            .push(shell(enemy - Vec2::Y, Vec2::Y, TankId::PLAYER));
        update_projectiles(&mut session);
        assert_eq!(session.tanks[1].health, 0);
        assert_eq!(session.scores, [1, 0]);
        assert_eq!(session.pending_respawns, vec![1]);
    }

    #[test]
    fn test_friendly_kill_does_not_score() {
        let mut session = arena();
        session.tanks.push(Tank::new(Vec2::new(0.0, 30.0), 0.0));
        assert!(damage_tank(&mut session, TankId::Tank(2), 500, Some(TankId::Tank(1))));
        assert_eq!(session.scores, [0, 0]);
    }

    #[test]
    fn test_damage_missing_or_dead_is_noop() {
        let mut session = arena();
        assert!(!damage_tank(&mut session, TankId::Tank(9), 50, None));
        assert!(!damage_tank(&mut session, TankId::Boss, 50, None));
        session.tanks[1].health = 0;
        assert!(!damage_tank(&mut session, TankId::Tank(1), 50, Some(TankId::PLAYER)));
        assert_eq!(session.scores, [0, 0]);
        assert!(session.pending_respawns.is_empty());
    }

    #[test]
    fn test_enemy_shell_passes_through_boss() {
        let mut session = arena();
        session.boss = Some(Tank::boss(Vec2::new(0.0, 0.5), 180.0));
        session
            .projectiles
            .push(shell(Vec2::ZERO, Vec2::Y, TankId::Tank(1)));
        update_projectiles(&mut session);
        assert_eq!(session.boss.as_ref().unwrap().health, 500);
        assert_eq!(session.projectiles.len(), 1);
    }

    #[test]
    fn test_boss_death_ends_match() {
        let mut session = arena();
        let mut boss = Tank::boss(Vec2::new(0.0, 0.5), 180.0);
        boss.health = PLAYER_DAMAGE;
        session.boss = Some(boss);
        session
            .projectiles
            .push(shell(Vec2::ZERO, Vec2::Y, TankId::PLAYER));
        update_projectiles(&mut session);
        assert!(session.game_over);
        assert_eq!(session.winner, Some(Side::Player));
    }

    #[test]
    fn test_ctf_holder_death_drops_flag() {
        let mut session = arena();
        session.game_mode = GameMode::Ctf;
        session.flag = Flag::HeldByEnemy { holder: 1 };
        let enemy = session.tanks[1].position;
        damage_tank(&mut session, TankId::Tank(1), 500, Some(TankId::PLAYER));
        assert_eq!(session.flag, Flag::Dropped { position: enemy });
    }

    #[test]
    fn test_ctf_player_death_with_flag_loses() {
        let mut session = arena();
        session.game_mode = GameMode::Ctf;
        session.flag = Flag::HeldByPlayer { hold_timer: 3.0 };
        damage_tank(&mut session, TankId::PLAYER, 500, Some(TankId::Tank(1)));
        assert!(session.game_over);
        assert_eq!(session.winner, Some(Side::Enemy));
    }

    #[test]
    fn test_lava_destroys_tank() {
        let mut session = arena();
        session.obstacles = ObstacleField::new(vec![Obstacle::new(
            Vec2::new(30.0, 30.0),
            ObstacleKind::Lava { size: 4.0 },
        )]);
        apply_hazards(&mut session);
        assert_eq!(session.tanks[1].health, 0);
        assert_eq!(session.scores, [0, 0]);
        assert_eq!(session.pending_respawns, vec![1]);
        assert!(session.tanks[0].is_alive());
    }
}
