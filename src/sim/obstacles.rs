//! Obstacle field: static and animated obstacles that block tanks and shells

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{inside_square, within_padded_circle};
use crate::consts::GRID_LENGTH;
use crate::{heading_vector, wrap_degrees};

/// Seconds between random heading changes of a drifting cube
pub const DRIFT_REDIRECT_SECS: f32 = 5.0;
/// Drift speed of moving cubes (units per second)
pub const DRIFT_SPEED: f32 = 18.0;
/// Barrier collision radius is its size times this
pub const BARRIER_REACH: f32 = 1.5;

/// Distance between cell centres in the grid layout
pub const GRID_SPACING: f32 = 8.0;
/// Cells per side in the grid layout
pub const GRID_CELLS: i32 = 12;
/// Cells closer than this to the origin stay open
pub const GRID_CLEAR_CENTER: f32 = 6.0;

/// Which obstacle layout a match is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArenaLayout {
    /// A handful of moving and blinking obstacles in an open field
    #[default]
    Open,
    /// Dense grid of lava pools, spinning blades, buildings and cubes
    Grid,
}

impl ArenaLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArenaLayout::Open => "Open",
            ArenaLayout::Grid => "Grid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(ArenaLayout::Open),
            "grid" => Some(ArenaLayout::Grid),
            _ => None,
        }
    }
}

/// Linear motion that bounces inside the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub speed: f32,
    /// Unit vector
    pub direction: Vec2,
    /// Seconds since the last random redirect
    pub since_redirect: f32,
}

/// Timed visibility toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blink {
    pub visible: bool,
    pub elapsed: f32,
    /// Seconds to stay in the current phase
    pub dwell: f32,
}

impl Blink {
    pub fn new(rng: &mut Pcg32) -> Self {
        Self {
            visible: true,
            elapsed: 0.0,
            dwell: Self::roll_dwell(true, rng),
        }
    }

    fn roll_dwell(visible: bool, rng: &mut Pcg32) -> f32 {
        if visible {
            rng.random_range(5.0..=10.0)
        } else {
            rng.random_range(3.0..=7.0)
        }
    }

    fn tick(&mut self, dt: f32, rng: &mut Pcg32) {
        self.elapsed += dt;
        if self.elapsed >= self.dwell {
            self.visible = !self.visible;
            self.elapsed = 0.0;
            self.dwell = Self::roll_dwell(self.visible, rng);
        }
    }
}

/// Obstacle variants, each with only the fields it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Rigid block, optionally drifting
    Cube { size: f32, drift: Option<Drift> },
    /// Spinning bar
    Barrier {
        size: f32,
        /// Degrees
        rotation: f32,
        /// Degrees per second
        rotation_speed: f32,
    },
    /// Tall static block
    Building { size: f32 },
    /// Damaging floor area; never blocks
    Lava { size: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec2,
    pub kind: ObstacleKind,
    #[serde(default)]
    pub blink: Option<Blink>,
}

impl Obstacle {
    pub fn new(position: Vec2, kind: ObstacleKind) -> Self {
        Self {
            position,
            kind,
            blink: None,
        }
    }

    pub fn with_blink(mut self, blink: Blink) -> Self {
        self.blink = Some(blink);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.blink.as_ref().is_none_or(|b| b.visible)
    }

    /// Solid test for a tank centred at `point`
    pub fn is_solid_at(&self, point: Vec2) -> bool {
        if !self.is_visible() {
            return false;
        }
        match &self.kind {
            ObstacleKind::Cube { size, .. } | ObstacleKind::Building { size } => {
                within_padded_circle(point, self.position, size / 2.0)
            }
            ObstacleKind::Barrier { size, .. } => {
                within_padded_circle(point, self.position, size * BARRIER_REACH)
            }
            ObstacleKind::Lava { .. } => false,
        }
    }

    pub fn is_hazard_at(&self, point: Vec2) -> bool {
        if !self.is_visible() {
            return false;
        }
        match &self.kind {
            ObstacleKind::Lava { size } => inside_square(point, self.position, *size),
            _ => false,
        }
    }

    /// Advance animation by `dt` seconds
    pub fn tick(&mut self, dt: f32, rng: &mut Pcg32) {
        let Obstacle {
            position,
            kind,
            blink,
        } = self;

        match kind {
            ObstacleKind::Cube {
                size,
                drift: Some(drift),
            } => {
                let limit = (GRID_LENGTH - *size / 2.0).max(0.0);
                let mut next = *position + drift.direction * drift.speed * dt;
                if next.x.abs() > limit {
                    drift.direction.x = -drift.direction.x;
                    next.x = next.x.clamp(-limit, limit);
                }
                if next.y.abs() > limit {
                    drift.direction.y = -drift.direction.y;
                    next.y = next.y.clamp(-limit, limit);
                }

                drift.since_redirect += dt;
                if drift.since_redirect >= DRIFT_REDIRECT_SECS {
                    drift.direction = heading_vector(rng.random_range(0.0..360.0));
                    drift.since_redirect = 0.0;
                }
                *position = next;
            }
            ObstacleKind::Barrier {
                rotation,
                rotation_speed,
                ..
            } => {
                *rotation = wrap_degrees(*rotation + *rotation_speed * dt);
            }
            _ => {}
        }

        if let Some(blink) = blink {
            blink.tick(dt, rng);
        }
    }
}

/// All obstacles in the arena
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Build the field for a layout
    pub fn for_arena(arena: ArenaLayout, rng: &mut Pcg32) -> Self {
        match arena {
            ArenaLayout::Open => Self::default_layout(rng),
            ArenaLayout::Grid => Self::grid_layout(),
        }
    }

    /// Regular grid of mixed obstacles with an open centre.
    ///
    /// Cell kinds follow fixed index patterns so every match on this layout
    /// looks the same. Cells matching no pattern are left open.
    pub fn grid_layout() -> Self {
        let origin = -GRID_SPACING * (GRID_CELLS - 1) as f32 / 2.0;
        let mut obstacles = Vec::new();

        for i in 0..GRID_CELLS {
            for j in 0..GRID_CELLS {
                let position = Vec2::new(
                    origin + GRID_SPACING * i as f32,
                    origin + GRID_SPACING * j as f32,
                );
                if position.x.abs() < GRID_CLEAR_CENTER && position.y.abs() < GRID_CLEAR_CENTER {
                    continue;
                }

                let kind = if (i + j) % 4 == 2 {
                    ObstacleKind::Lava { size: 5.0 }
                } else if (i - j).rem_euclid(3) == 0 {
                    ObstacleKind::Barrier {
                        size: 2.0,
                        rotation: 0.0,
                        rotation_speed: 120.0,
                    }
                } else if (i * j) % 5 == 1 {
                    ObstacleKind::Building { size: 3.0 }
                } else if (i * j) % 4 == 0 {
                    ObstacleKind::Cube {
                        size: 2.0,
                        drift: None,
                    }
                } else {
                    continue;
                };
                obstacles.push(Obstacle::new(position, kind));
            }
        }
        Self::new(obstacles)
    }

    /// The standard arena layout
    pub fn default_layout(rng: &mut Pcg32) -> Self {
        let drifting = |x: f32, z: f32, size: f32, direction: Vec2| {
            Obstacle::new(
                Vec2::new(x, z),
                ObstacleKind::Cube {
                    size,
                    drift: Some(Drift {
                        speed: DRIFT_SPEED,
                        direction,
                        since_redirect: 0.0,
                    }),
                },
            )
        };

        Self::new(vec![
            Obstacle::new(
                Vec2::new(10.0, 10.0),
                ObstacleKind::Cube {
                    size: 3.0,
                    drift: None,
                },
            ),
            drifting(-15.0, -15.0, 4.0, Vec2::X),
            Obstacle::new(
                Vec2::new(20.0, -10.0),
                ObstacleKind::Cube {
                    size: 5.0,
                    drift: None,
                },
            )
            .with_blink(Blink::new(rng)),
            Obstacle::new(
                Vec2::new(-20.0, 15.0),
                ObstacleKind::Barrier {
                    size: 3.0,
                    rotation: 0.0,
                    rotation_speed: 30.0,
                },
            ),
            drifting(0.0, -25.0, 4.0, Vec2::Y),
        ])
    }

    pub fn blocks_movement(&self, point: Vec2) -> bool {
        self.obstacles.iter().any(|o| o.is_solid_at(point))
    }

    /// Shells are stopped by the same solid footprints that stop tanks
    pub fn blocks_projectile(&self, point: Vec2) -> bool {
        self.blocks_movement(point)
    }

    pub fn hazard_at(&self, point: Vec2) -> bool {
        self.obstacles.iter().any(|o| o.is_hazard_at(point))
    }

    pub fn tick(&mut self, dt: f32, rng: &mut Pcg32) {
        for obstacle in &mut self.obstacles {
            obstacle.tick(dt, rng);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }
}
