//! Game state and core simulation types
//!
//! Everything the tick orchestrator mutates lives in [`GameSession`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::menu::MenuState;
use super::obstacles::{ArenaLayout, ObstacleField};
use crate::consts::*;
use crate::settings::Settings;

/// AI difficulty tier. All per-tier numbers are table lookups on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu order
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Position in the difficulty menu
    pub fn menu_index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Degrees an enemy turns toward the player per tick.
    ///
    /// Not monotonic: hard enemies turn slowest.
    pub fn rotation_step(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 1.0,
        }
    }

    /// Enemy forward step per tick
    pub fn move_speed(&self) -> f32 {
        match self {
            Difficulty::Hard => TANK_SPEED * 0.4,
            _ => TANK_SPEED * 0.5,
        }
    }

    /// Probability that an enemy shot is thrown off by up to ±40°
    pub fn miss_chance(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.4,
            Difficulty::Medium => 0.3,
            Difficulty::Hard => 0.2,
        }
    }

    /// Seconds between enemy shots
    pub fn fire_cooldown(&self) -> f32 {
        match self {
            Difficulty::Easy => 4.0,
            Difficulty::Medium => 3.0,
            Difficulty::Hard => 2.0,
        }
    }

    /// Damage dealt by enemy and boss projectiles
    pub fn enemy_damage(&self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => 2,
        }
    }
}

/// Match rules in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Normal,
    Ctf,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Normal, GameMode::Ctf];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal",
            GameMode::Ctf => "Capture the Flag",
        }
    }

    pub fn menu_index(&self) -> usize {
        match self {
            GameMode::Normal => 0,
            GameMode::Ctf => 1,
        }
    }
}

/// The two opposing sides; also indexes `GameSession::scores`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn score_index(&self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }
}

/// Identifies a tank: a roster slot or the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankId {
    Tank(usize),
    Boss,
}

impl TankId {
    pub const PLAYER: TankId = TankId::Tank(0);

    pub fn side(&self) -> Side {
        match self {
            TankId::Tank(0) => Side::Player,
            _ => Side::Enemy,
        }
    }
}

/// Enemy AI behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiMode {
    #[default]
    Chasing,
    Avoiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiState {
    pub mode: AiMode,
    /// Ticks left in `Avoiding`
    pub avoid_timer: u32,
    /// -1 or +1
    pub avoid_direction: i8,
}

impl Default for AiState {
    fn default() -> Self {
        Self {
            mode: AiMode::Chasing,
            avoid_timer: 0,
            avoid_direction: 1,
        }
    }
}

/// A tank entity. The player, enemies and boss share this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Horizontal position (x, z)
    pub position: Vec2,
    /// Heading in degrees, [0, 360)
    pub rotation: f32,
    pub health: u32,
    pub max_health: u32,
    #[serde(default)]
    pub ai: AiState,
    /// Seconds until the next AI shot is allowed
    #[serde(default)]
    pub fire_cooldown: f32,
}

impl Tank {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation: crate::wrap_degrees(rotation),
            health: TANK_MAX_HEALTH,
            max_health: TANK_MAX_HEALTH,
            ai: AiState::default(),
            fire_cooldown: 0.0,
        }
    }

    pub fn boss(position: Vec2, rotation: f32) -> Self {
        let max_health = TANK_MAX_HEALTH * BOSS_HEALTH_MULTIPLIER;
        Self {
            health: max_health,
            max_health,
            ..Self::new(position, rotation)
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract health, saturating at zero. Returns true if this hit killed the tank.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        !self.is_alive()
    }

    /// Bring the tank back at full health with fresh AI state
    pub fn restore(&mut self, position: Vec2, rotation: f32) {
        self.position = position;
        self.rotation = crate::wrap_degrees(rotation);
        self.health = self.max_health;
        self.ai = AiState::default();
        self.fire_cooldown = 0.0;
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    /// Unit vector
    pub direction: Vec2,
    pub owner: TankId,
}

/// Cosmetic explosion spawned by projectile impacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub position: Vec2,
    /// Ticks remaining
    pub lifetime: u32,
}

/// The single field power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub position: Vec2,
    /// Sim time (seconds) it appeared
    pub spawn_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpEffect {
    Heal,
    SpeedBoost,
}

/// Capture-the-flag objective
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Flag {
    /// Not yet placed (or not in CTF mode)
    #[default]
    None,
    HeldByEnemy { holder: usize },
    Dropped { position: Vec2 },
    HeldByPlayer { hold_timer: f32 },
}

/// Flag state without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagStatus {
    None,
    HeldByEnemy,
    Dropped,
    HeldByPlayer,
}

impl Flag {
    pub fn status(&self) -> FlagStatus {
        match self {
            Flag::None => FlagStatus::None,
            Flag::HeldByEnemy { .. } => FlagStatus::HeldByEnemy,
            Flag::Dropped { .. } => FlagStatus::Dropped,
            Flag::HeldByPlayer { .. } => FlagStatus::HeldByPlayer,
        }
    }

    /// Roster index of the carrier
    pub fn holder(&self) -> Option<usize> {
        match self {
            Flag::HeldByEnemy { holder } => Some(*holder),
            Flag::HeldByPlayer { .. } => Some(0),
            _ => None,
        }
    }

    /// Ground position, only while dropped
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Flag::Dropped { position } => Some(*position),
            _ => None,
        }
    }

    pub fn hold_timer(&self) -> f32 {
        match self {
            Flag::HeldByPlayer { hold_timer } => *hold_timer,
            _ => 0.0,
        }
    }
}

/// Cosmetic teleport marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub position: Vec2,
    pub ticks_left: u32,
}

/// Things that happened during the last tick, for renderers and logs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Explosion { position: Vec2 },
    TankDestroyed { victim: TankId, by: Option<TankId> },
    TankRespawned { index: usize },
    BossSpawned,
    PowerUpSpawned { position: Vec2 },
    PowerUpCollected { effect: PowerUpEffect },
    Teleported { position: Vec2 },
    FlagDropped { position: Vec2 },
    FlagCaptured,
    MatchOver { winner: Side },
}

/// The authoritative session aggregate
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub rng: Pcg32,
    /// Index 0 is the player, the rest are enemies
    pub tanks: Vec<Tank>,
    pub boss: Option<Tank>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub obstacles: ObstacleField,
    /// Layout rebuilt on every reset
    pub arena: ArenaLayout,
    pub powerup: Option<PowerUp>,
    /// Sim time the field last became empty of power-ups
    pub powerup_idle_since: f64,
    /// Idle seconds before the next power-up appears
    pub powerup_idle_delay: f64,
    /// Sim time the speed boost wears off
    pub speed_boost_until: Option<f64>,
    pub flag: Flag,
    pub ctf_hold_seconds: f32,
    pub portal: Option<Portal>,
    pub auto_teleport: bool,
    pub last_auto_teleport: f64,
    /// Kills by side: [player, enemy]
    pub scores: [u32; 2],
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
    pub game_over: bool,
    pub winner: Option<Side>,
    pub menu: MenuState,
    /// Render hint only
    pub first_person_camera: bool,
    /// Simulated seconds since start
    pub elapsed: f64,
    pub tick_count: u64,
    /// Roster slots waiting to reappear
    pub pending_respawns: Vec<usize>,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session with default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, &Settings::default())
    }

    pub fn with_settings(seed: u64, settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let obstacles = ObstacleField::for_arena(settings.arena, &mut rng);
        let mut session = Self {
            seed,
            rng,
            tanks: vec![
                Tank::new(Vec2::new(0.0, 0.0), 0.0),
                Tank::new(Vec2::new(30.0, 30.0), 180.0),
            ],
            boss: None,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            obstacles,
            arena: settings.arena,
            powerup: None,
            powerup_idle_since: 0.0,
            powerup_idle_delay: POWERUP_MIN_IDLE,
            speed_boost_until: None,
            flag: Flag::None,
            ctf_hold_seconds: settings.ctf_hold_seconds,
            portal: None,
            auto_teleport: false,
            last_auto_teleport: 0.0,
            scores: [0, 0],
            difficulty: Difficulty::Easy,
            game_mode: settings.game_mode,
            game_over: false,
            winner: None,
            menu: MenuState::Playing,
            first_person_camera: false,
            elapsed: 0.0,
            tick_count: 0,
            pending_respawns: Vec::new(),
            events: Vec::new(),
        };
        super::rules::start_powerup_idle(&mut session);
        super::rules::set_difficulty(&mut session, settings.difficulty);
        if settings.auto_teleport {
            super::rules::toggle_auto_teleport(&mut session);
        }

        // Fixed start points can land on a dense layout's obstacles
        for idx in 0..session.tanks.len() {
            let position = session.tanks[idx].position;
            if !super::rules::spot_is_clear(&session, position, Some(TankId::Tank(idx)))
                && !super::rules::respawn_tank(&mut session, idx)
            {
                session.tanks[idx].health = 0;
                session.pending_respawns.push(idx);
            }
        }
        session.events.clear();
        session
    }

    /// Reinitialize the match, keeping difficulty, mode and roster size
    pub fn reset(&mut self) {
        self.scores = [0, 0];
        self.projectiles.clear();
        self.explosions.clear();
        self.game_over = false;
        self.winner = None;
        self.powerup = None;
        self.speed_boost_until = None;
        self.boss = None;
        self.auto_teleport = false;
        self.last_auto_teleport = self.elapsed;
        self.portal = None;
        self.flag = Flag::None;
        self.menu = MenuState::Playing;
        self.obstacles = ObstacleField::for_arena(self.arena, &mut self.rng);
        self.pending_respawns.clear();
        super::rules::start_powerup_idle(self);

        for idx in 0..self.tanks.len() {
            if !super::rules::respawn_tank(self, idx) {
                // Keep it out of play until a clear spot turns up
                self.tanks[idx].health = 0;
                self.pending_respawns.push(idx);
            }
        }
        log::info!("Match reset ({} tanks, {:?})", self.tanks.len(), self.difficulty);
    }

    /// Roster slot 0, if the roster is not empty
    pub fn player(&self) -> Option<&Tank> {
        self.tanks.first()
    }

    pub fn player_mut(&mut self) -> Option<&mut Tank> {
        self.tanks.first_mut()
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        match id {
            TankId::Tank(idx) => self.tanks.get(idx),
            TankId::Boss => self.boss.as_ref(),
        }
    }

    pub fn tank_mut(&mut self, id: TankId) -> Option<&mut Tank> {
        match id {
            TankId::Tank(idx) => self.tanks.get_mut(idx),
            TankId::Boss => self.boss.as_mut(),
        }
    }

    pub fn boss_active(&self) -> bool {
        self.boss.is_some()
    }

    pub fn is_paused(&self) -> bool {
        !matches!(self.menu, MenuState::Playing)
    }

    /// Current player movement multiplier from power-ups
    pub fn speed_multiplier(&self) -> f32 {
        if self.speed_boost_until.is_some() {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn spawn_explosion(&mut self, position: Vec2) {
        self.explosions.push(Explosion {
            position,
            lifetime: EXPLOSION_LIFETIME,
        });
        self.events.push(GameEvent::Explosion { position });
    }

    /// Count down explosion lifetimes and drop finished ones
    pub fn retire_explosions(&mut self) {
        for explosion in &mut self.explosions {
            explosion.lifetime = explosion.lifetime.saturating_sub(1);
        }
        self.explosions.retain(|e| e.lifetime > 0);
    }

    pub fn end_match(&mut self, winner: Side) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.winner = Some(winner);
        self.events.push(GameEvent::MatchOver { winner });
        log::info!(
            "Match over: {:?} wins (scores {:?}, tick {})",
            winner,
            self.scores,
            self.tick_count
        );
    }
}
