//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (roster index, boss last)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod menu;
pub mod obstacles;
pub mod player;
pub mod rules;
pub mod state;
pub mod tick;

pub use menu::{MenuPage, MenuState};
pub use obstacles::{ArenaLayout, Obstacle, ObstacleField, ObstacleKind};
pub use state::{
    AiMode, AiState, Difficulty, Explosion, Flag, FlagStatus, GameEvent, GameMode, GameSession,
    Portal, PowerUp, PowerUpEffect, Projectile, Side, Tank, TankId,
};
pub use tick::{Command, TickInput, tick};
