//! Pause menu state machine and command dispatch
//!
//! Rendering of the menu lives outside the crate; this module only tracks
//! which page and row are selected and applies the chosen option.

use serde::{Deserialize, Serialize};

use super::player;
use super::rules::{set_difficulty, set_game_mode, toggle_auto_teleport};
use super::state::{Difficulty, GameMode, GameSession};
use super::tick::Command;

/// Pause menu pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuPage {
    /// Resume / Restart / Difficulty / Game Mode
    Main,
    Difficulty,
    GameMode,
}

impl MenuPage {
    pub fn option_count(&self) -> usize {
        match self {
            MenuPage::Main => 4,
            MenuPage::Difficulty => Difficulty::ALL.len(),
            MenuPage::GameMode => GameMode::ALL.len(),
        }
    }
}

/// Rows of the main page
const MAIN_RESUME: usize = 0;
const MAIN_RESTART: usize = 1;
const MAIN_DIFFICULTY: usize = 2;
const MAIN_GAME_MODE: usize = 3;

/// Whether the game is running or which menu row is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MenuState {
    #[default]
    Playing,
    Paused { page: MenuPage, index: usize },
}

impl MenuState {
    pub fn paused_main() -> Self {
        MenuState::Paused {
            page: MenuPage::Main,
            index: 0,
        }
    }
}

impl GameSession {
    /// Apply one input command synchronously.
    ///
    /// Gameplay commands are ignored while paused or after the match ends;
    /// menu commands are ignored while playing.
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.reset(),
            Command::ToggleCamera => self.first_person_camera = !self.first_person_camera,
            Command::MenuUp => self.move_selection(-1),
            Command::MenuDown => self.move_selection(1),
            Command::MenuConfirm => self.confirm_selection(),
            Command::MenuBack => self.menu_back(),
            gameplay => {
                if self.is_paused() || self.game_over {
                    return;
                }
                match gameplay {
                    Command::MoveForward => player::drive(self, 1.0),
                    Command::MoveBackward => player::drive(self, -1.0),
                    Command::RotateLeft => player::rotate(self, 1.0),
                    Command::RotateRight => player::rotate(self, -1.0),
                    Command::Fire => player::fire(self),
                    Command::ToggleAutoTeleport => toggle_auto_teleport(self),
                    _ => {}
                }
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.menu = match self.menu {
            MenuState::Playing => MenuState::paused_main(),
            MenuState::Paused { .. } => MenuState::Playing,
        };
    }

    fn move_selection(&mut self, step: isize) {
        if let MenuState::Paused { page, index } = self.menu {
            let count = page.option_count() as isize;
            let next = (index as isize + step).rem_euclid(count) as usize;
            self.menu = MenuState::Paused { page, index: next };
        }
    }

    fn confirm_selection(&mut self) {
        let MenuState::Paused { page, index } = self.menu else {
            return;
        };
        let index = index % page.option_count();

        self.menu = match page {
            MenuPage::Main => match index {
                MAIN_RESUME => MenuState::Playing,
                MAIN_RESTART => {
                    self.reset();
                    MenuState::Playing
                }
                MAIN_DIFFICULTY => MenuState::Paused {
                    page: MenuPage::Difficulty,
                    index: self.difficulty.menu_index(),
                },
                // MAIN_GAME_MODE
                _ => MenuState::Paused {
                    page: MenuPage::GameMode,
                    index: self.game_mode.menu_index(),
                },
            },
            MenuPage::Difficulty => {
                set_difficulty(self, Difficulty::ALL[index]);
                MenuState::Paused {
                    page: MenuPage::Main,
                    index: MAIN_DIFFICULTY,
                }
            }
            MenuPage::GameMode => {
                set_game_mode(self, GameMode::ALL[index]);
                MenuState::Paused {
                    page: MenuPage::Main,
                    index: MAIN_GAME_MODE,
                }
            }
        };
    }

    fn menu_back(&mut self) {
        self.menu = match self.menu {
            MenuState::Playing => return,
            MenuState::Paused {
                page: MenuPage::Main,
                ..
            } => MenuState::Playing,
            MenuState::Paused { .. } => MenuState::paused_main(),
        };
    }
}
