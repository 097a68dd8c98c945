//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session in a fixed order:
//! respawns, AI, projectiles, hazards, mode rules, obstacle animation,
//! explosion retirement.

use serde::{Deserialize, Serialize};

use super::state::GameSession;
use super::{ai, combat, rules};

/// Commands produced by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveForward,
    MoveBackward,
    RotateLeft,
    RotateRight,
    Fire,
    TogglePause,
    MenuUp,
    MenuDown,
    MenuConfirm,
    MenuBack,
    ToggleCamera,
    ToggleAutoTeleport,
    Restart,
}

/// Input commands for a single tick, applied in order before simulating
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn with(commands: &[Command]) -> Self {
        Self {
            commands: commands.to_vec(),
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    session.events.clear();

    for &command in &input.commands {
        session.apply_command(command);
    }

    // Nothing moves while the menu is open
    if session.is_paused() {
        return;
    }

    if session.game_over {
        session.retire_explosions();
        return;
    }

    session.tick_count += 1;
    session.elapsed += f64::from(dt);

    rules::process_respawns(session);

    ai::update_enemies(session, dt);
    ai::update_boss(session);

    combat::update_projectiles(session);
    combat::apply_hazards(session);

    rules::check_win_conditions(session);
    rules::update_flag(session, dt);
    rules::update_powerup(session);
    rules::update_portal(session);
    rules::update_auto_teleport(session);
    session.obstacles.tick(dt, &mut session.rng);

    session.retire_explosions();
}
