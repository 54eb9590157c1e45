//! Collision oracle - the single capability the AI needs from level geometry
//!
//! Everything geometry-dependent (grid build, line of sight, cover, local
//! avoidance) goes through [`CollisionOracle`]. When no oracle is available
//! the callers treat the world as fully open.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Answers whether an upright capsule at `point` intersects static geometry
pub trait CollisionOracle {
    /// `point` is the capsule base. Also true outside the arena bounds.
    fn check_collision(&self, point: Vec3, radius: f32, height: f32) -> bool;
}

/// Query an optional oracle; a missing oracle never blocks
#[inline]
pub fn is_blocked(oracle: Option<&dyn CollisionOracle>, point: Vec3, radius: f32, height: f32) -> bool {
    match oracle {
        Some(oracle) => oracle.check_collision(point, radius, height),
        None => false,
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Does an upright cylinder (base `point`, `radius`, `height`) touch this box?
    pub fn intersects_capsule(&self, point: Vec3, radius: f32, height: f32) -> bool {
        if point.y + height < self.min.y || point.y > self.max.y {
            return false;
        }
        let cx = point.x.clamp(self.min.x, self.max.x);
        let cz = point.z.clamp(self.min.z, self.max.z);
        let dx = point.x - cx;
        let dz = point.z - cz;
        dx * dx + dz * dz <= radius * radius
    }
}

/// Square arena with box obstacles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub half_extent: f32,
    pub boxes: Vec<Aabb>,
}

impl BoxGeometry {
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent,
            boxes: Vec::new(),
        }
    }

    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.boxes.push(Aabb::new(min, max));
        self
    }

    /// Axis-aligned wall from `from` to `to` on the ground plane
    ///
    /// The wall is snapped to whichever axis dominates `to - from`.
    pub fn with_wall(self, from: Vec3, to: Vec3, thickness: f32, height: f32) -> Self {
        let half = thickness * 0.5;
        let d = to - from;
        let (min, max) = if d.x.abs() >= d.z.abs() {
            (
                Vec3::new(from.x.min(to.x), 0.0, from.z - half),
                Vec3::new(from.x.max(to.x), height, from.z + half),
            )
        } else {
            (
                Vec3::new(from.x - half, 0.0, from.z.min(to.z)),
                Vec3::new(from.x + half, height, from.z.max(to.z)),
            )
        };
        self.with_box(min, max)
    }

    pub fn out_of_bounds(&self, point: Vec3) -> bool {
        point.x.abs() > self.half_extent || point.z.abs() > self.half_extent
    }
}

impl CollisionOracle for BoxGeometry {
    fn check_collision(&self, point: Vec3, radius: f32, height: f32) -> bool {
        self.out_of_bounds(point)
            || self
                .boxes
                .iter()
                .any(|b| b.intersects_capsule(point, radius, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_oracle_never_blocks() {
        assert!(!is_blocked(None, Vec3::new(1e6, 0.0, 1e6), 1.0, 1.0));
    }

    #[test]
    fn test_out_of_bounds_collides() {
        let geo = BoxGeometry::new(10.0);
        assert!(geo.check_collision(Vec3::new(11.0, 0.0, 0.0), 0.1, 1.0));
        assert!(!geo.check_collision(Vec3::new(9.0, 0.0, -9.0), 0.1, 1.0));
    }

    #[test]
    fn test_box_hit_respects_radius() {
        let geo = BoxGeometry::new(10.0).with_box(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(geo.check_collision(Vec3::new(0.5, 0.0, 0.5), 0.1, 1.0));
        assert!(geo.check_collision(Vec3::new(1.3, 0.0, 0.5), 0.4, 1.0));
        assert!(!geo.check_collision(Vec3::new(1.6, 0.0, 0.5), 0.4, 1.0));
    }

    #[test]
    fn test_capsule_above_box_is_clear() {
        let geo = BoxGeometry::new(10.0).with_box(Vec3::ZERO, Vec3::new(1.0, 2.0, 1.0));
        assert!(!geo.check_collision(Vec3::new(0.5, 3.0, 0.5), 0.1, 1.0));
    }

    #[test]
    fn test_wall_snaps_to_axis() {
        let geo = BoxGeometry::new(10.0).with_wall(
            Vec3::new(-3.0, 0.0, 2.0),
            Vec3::new(3.0, 0.0, 2.0),
            0.5,
            3.0,
        );
        assert!(geo.check_collision(Vec3::new(0.0, 0.0, 2.0), 0.1, 1.0));
        assert!(!geo.check_collision(Vec3::new(0.0, 0.0, 3.0), 0.1, 1.0));
        assert!(!geo.check_collision(Vec3::new(4.0, 0.0, 2.0), 0.1, 1.0));
    }
}
