//! Coarse obstacle map built once per level from the collision oracle

use glam::{Vec2, Vec3};

use crate::core::config::ArenaConfig;
use crate::spatial::collision::CollisionOracle;

/// Boolean obstacle grid over the square arena (`true` = obstructed)
///
/// Row-major over (x, z), origin at `(-half_extent, -half_extent)`. Built
/// when a level loads, immutable while the level runs.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    size: usize,
    cell_size: f32,
    origin: Vec2,
    obstructed: Vec<bool>,
}

impl OccupancyGrid {
    /// Grid with every cell open
    pub fn open(arena: &ArenaConfig) -> Self {
        let size = arena.grid_size();
        Self {
            size,
            cell_size: arena.cell_size,
            origin: Vec2::splat(-arena.half_extent),
            obstructed: vec![false; size * size],
        }
    }

    /// Sample the oracle every `sample_stride` cells
    ///
    /// Returns `None` without an oracle; planners then fall back to direct paths.
    pub fn build(oracle: Option<&dyn CollisionOracle>, arena: &ArenaConfig) -> Option<Self> {
        let Some(oracle) = oracle else {
            tracing::warn!("No collision oracle - occupancy grid not built, paths will be direct");
            return None;
        };

        let mut grid = Self::open(arena);
        let stride = arena.sample_stride.max(1);
        let size = grid.size();
        let mut sampled = 0usize;

        for z in (0..size).step_by(stride) {
            for x in (0..size).step_by(stride) {
                sampled += 1;
                let point = grid.grid_to_world(x, z, 0.0);
                if oracle.check_collision(point, arena.probe_radius, arena.probe_height) {
                    grid.set_obstructed(x, z, true);
                }
            }
        }

        tracing::info!(
            "Occupancy grid built: {}x{} cells, {} sampled, {} obstructed",
            size,
            size,
            sampled,
            grid.obstructed_count()
        );
        Some(grid)
    }

    /// Cells per side
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World point to cell, clamped onto the grid
    pub fn world_to_grid(&self, point: Vec3) -> (usize, usize) {
        let last = self.size as i32 - 1;
        let to_cell = |v: f32, origin: f32| (((v - origin) / self.cell_size).floor() as i32).clamp(0, last) as usize;
        (to_cell(point.x, self.origin.x), to_cell(point.z, self.origin.y))
    }

    /// Cell center at altitude `y`
    pub fn grid_to_world(&self, x: usize, z: usize, y: f32) -> Vec3 {
        Vec3::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            y,
            self.origin.y + (z as f32 + 0.5) * self.cell_size,
        )
    }

    /// In bounds and not obstructed
    pub fn is_valid_cell(&self, x: i32, z: i32) -> bool {
        self.index(x, z).is_some_and(|i| !self.obstructed[i])
    }

    /// Out-of-range cells read as obstructed
    pub fn is_obstructed(&self, x: usize, z: usize) -> bool {
        x >= self.size || z >= self.size || self.obstructed[z * self.size + x]
    }

    /// Out-of-range writes are ignored
    pub fn set_obstructed(&mut self, x: usize, z: usize, obstructed: bool) {
        if x < self.size && z < self.size {
            self.obstructed[z * self.size + x] = obstructed;
        }
    }

    pub fn obstructed_count(&self) -> usize {
        self.obstructed.iter().filter(|&&c| c).count()
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        let size = self.size as i32;
        (x >= 0 && z >= 0 && x < size && z < size).then(|| z as usize * self.size + x as usize)
    }
}
