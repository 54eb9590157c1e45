//! Pluggable path planners
//!
//! Every planner returns at least one point - the destination. Planning
//! failures are never surfaced; they degrade to a direct path.

use glam::Vec3;

use crate::core::config::{PathStrategy, PathingConfig};
use crate::navigation::astar::{find_cell_path, SearchLimits, SearchOutcome};
use crate::spatial::occupancy::OccupancyGrid;

/// Trait for path planning strategies
pub trait PathPlanner {
    /// Waypoints from `start` (excluded) to `end` (included). Never empty.
    fn find_path(&self, start: Vec3, end: Vec3) -> Vec<Vec3>;

    fn strategy(&self) -> PathStrategy;
}

/// Straight line to the destination
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPlanner;

impl PathPlanner for DirectPlanner {
    fn find_path(&self, _start: Vec3, end: Vec3) -> Vec<Vec3> {
        vec![end]
    }

    fn strategy(&self) -> PathStrategy {
        PathStrategy::Direct
    }
}

/// A* over an occupancy grid, direct fallback when the grid is missing,
/// an endpoint is obstructed, or the search budget runs out
#[derive(Debug, Clone)]
pub struct GridPlanner {
    grid: Option<OccupancyGrid>,
    limits: SearchLimits,
}

impl GridPlanner {
    pub fn new(grid: Option<OccupancyGrid>, limits: SearchLimits) -> Self {
        Self { grid, limits }
    }

    pub fn grid(&self) -> Option<&OccupancyGrid> {
        self.grid.as_ref()
    }
}

impl PathPlanner for GridPlanner {
    fn find_path(&self, start: Vec3, end: Vec3) -> Vec<Vec3> {
        let Some(grid) = &self.grid else {
            return vec![end];
        };

        let start_cell = grid.world_to_grid(start);
        let end_cell = grid.world_to_grid(end);
        if !grid.is_valid_cell(start_cell.0 as i32, start_cell.1 as i32)
            || !grid.is_valid_cell(end_cell.0 as i32, end_cell.1 as i32)
        {
            tracing::debug!("Path endpoint obstructed ({:?} -> {:?}), going direct", start_cell, end_cell);
            return vec![end];
        }

        match find_cell_path(grid, start_cell, end_cell, self.limits) {
            SearchOutcome::Found(cells) if !cells.is_empty() => {
                let mut path: Vec<Vec3> = cells
                    .into_iter()
                    .map(|(x, z)| grid.grid_to_world(x, z, end.y))
                    .collect();
                // Goal cell center is swapped for the exact destination
                if let Some(last) = path.last_mut() {
                    *last = end;
                }
                path
            }
            SearchOutcome::Found(_) => vec![end],
            SearchOutcome::NoPath => {
                tracing::debug!("No grid path {:?} -> {:?}, going direct", start_cell, end_cell);
                vec![end]
            }
            SearchOutcome::BudgetExceeded => {
                tracing::debug!("Search budget exceeded {:?} -> {:?}, going direct", start_cell, end_cell);
                vec![end]
            }
        }
    }

    fn strategy(&self) -> PathStrategy {
        PathStrategy::GridSearch
    }
}

/// Build the planner selected by configuration
pub fn planner_for(config: &PathingConfig, grid: Option<OccupancyGrid>) -> Box<dyn PathPlanner> {
    match config.strategy {
        PathStrategy::Direct => {
            tracing::info!("Path planning set to direct-line mode");
            Box::new(DirectPlanner)
        }
        PathStrategy::GridSearch => Box::new(GridPlanner::new(
            grid,
            SearchLimits {
                max_open_nodes: config.max_open_nodes,
                max_expansions: config.max_expansions,
            },
        )),
    }
}
