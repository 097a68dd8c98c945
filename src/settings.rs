//! Session settings
//!
//! Loaded from an optional JSON file by the runner; everything has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_CTF_HOLD_SECONDS;
use crate::sim::{ArenaLayout, Difficulty, GameMode};

/// Session settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Starting difficulty
    pub difficulty: Difficulty,
    /// Starting game mode
    pub game_mode: GameMode,
    /// Seconds the player must hold the flag to win a CTF match
    pub ctf_hold_seconds: f32,
    /// Fixed RNG seed (random when absent)
    pub seed: Option<u64>,
    /// Start with auto-teleport enabled
    pub auto_teleport: bool,
    /// Obstacle layout
    pub arena: ArenaLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            game_mode: GameMode::Normal,
            ctf_hold_seconds: DEFAULT_CTF_HOLD_SECONDS,
            seed: None,
            auto_teleport: false,
            arena: ArenaLayout::Open,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a file, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings to a file
    pub fn save(&self, path: &Path) {
        match self.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {}", path.display(), e);
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }

    /// Replace out-of-range values with defaults
    fn sanitize(&mut self) {
        if !self.ctf_hold_seconds.is_finite() || self.ctf_hold_seconds <= 0.0 {
            log::warn!(
                "ctf_hold_seconds {} out of range, using {}",
                self.ctf_hold_seconds,
                DEFAULT_CTF_HOLD_SECONDS
            );
            self.ctf_hold_seconds = DEFAULT_CTF_HOLD_SECONDS;
        }
    }
}
