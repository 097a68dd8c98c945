//! Distance and containment predicates
//!
//! Everything is measured on the horizontal plane; height never matters.

use glam::Vec2;

use crate::consts::{GRID_LENGTH, TANK_RADIUS};

/// True if the point lies outside the square arena
#[inline]
pub fn out_of_bounds(point: Vec2) -> bool {
    point.x.abs() > GRID_LENGTH || point.y.abs() > GRID_LENGTH
}

/// Projectile-vs-tank hit test
#[inline]
pub fn projectile_hits_tank(projectile: Vec2, tank: Vec2) -> bool {
    projectile.distance(tank) < TANK_RADIUS
}

/// Two tank footprints overlap. Also used for pickup and placement checks.
#[inline]
pub fn tanks_overlap(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < TANK_RADIUS * 2.0
}

/// Circle test used by round obstacles, padded by the tank radius
#[inline]
pub fn within_padded_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius + TANK_RADIUS
}

/// Axis-aligned square footprint test (no padding)
#[inline]
pub fn inside_square(point: Vec2, center: Vec2, size: f32) -> bool {
    let half = size / 2.0;
    (point.x - center.x).abs() < half && (point.y - center.y).abs() < half
}
