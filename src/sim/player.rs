//! Player tank controls

use super::collision::out_of_bounds;
use super::state::{GameSession, Projectile, TankId};
use crate::consts::{PLAYER_ROTATION_STEP, TANK_SPEED};
use crate::{heading_vector, wrap_degrees};

/// Step forward (`direction = 1.0`) or backward (`-1.0`) along the heading.
/// Blocked steps are dropped.
pub fn drive(session: &mut GameSession, direction: f32) {
    let speed = TANK_SPEED * session.speed_multiplier();
    let Some(player) = session.player().filter(|p| p.is_alive()) else {
        return;
    };
    let next = player.position + heading_vector(player.rotation) * speed * direction;
    if out_of_bounds(next) || session.obstacles.blocks_movement(next) {
        return;
    }
    if let Some(player) = session.player_mut() {
        player.position = next;
    }
}

/// Turn left (`direction = 1.0`) or right (`-1.0`) by one step
pub fn rotate(session: &mut GameSession, direction: f32) {
    if let Some(player) = session.player_mut().filter(|p| p.is_alive()) {
        player.rotation = wrap_degrees(player.rotation + PLAYER_ROTATION_STEP * direction);
    }
}

pub fn fire(session: &mut GameSession) {
    let Some(player) = session.player().filter(|p| p.is_alive()) else {
        return;
    };
    let shot = Projectile {
        position: player.position,
        direction: heading_vector(player.rotation),
        owner: TankId::PLAYER,
    };
    session.projectiles.push(shot);
}
