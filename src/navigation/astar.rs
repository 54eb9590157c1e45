//! A* search over the occupancy grid
//!
//! 4-connected, unit step cost, Manhattan heuristic. Equal f-scores pop in
//! insertion order. Both the open set and the number of expansions are
//! bounded so a single call has a fixed worst-case cost.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::spatial::occupancy::OccupancyGrid;

pub type Cell = (usize, usize);

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Per-call search budget
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub max_open_nodes: usize,
    pub max_expansions: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_open_nodes: 200,
            max_expansions: 200,
        }
    }
}

/// Result of a grid search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Cells from start to goal, start excluded, goal included
    Found(Vec<Cell>),
    NoPath,
    BudgetExceeded,
}

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f_cost: u32,
    seq: u64,
    index: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.seq == other.seq
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; earlier insertion wins ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn manhattan(a: Cell, b: Cell) -> u32 {
    (a.0.abs_diff(b.0) + a.1.abs_diff(b.1)) as u32
}

/// Find a shortest 4-connected path between two cells
///
/// Start and goal must be valid cells; the caller decides what to do with an
/// invalid endpoint.
pub fn find_cell_path(grid: &OccupancyGrid, start: Cell, goal: Cell, limits: SearchLimits) -> SearchOutcome {
    if start == goal {
        return SearchOutcome::Found(Vec::new());
    }

    let size = grid.size();
    let index_of = |c: Cell| c.1 * size + c.0;
    let cell_of = |i: usize| (i % size, i / size);

    let mut g_scores = vec![u32::MAX; size * size];
    let mut came_from = vec![usize::MAX; size * size];
    let mut closed = vec![false; size * size];
    let mut open_set = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expansions = 0usize;

    let start_index = index_of(start);
    let goal_index = index_of(goal);
    g_scores[start_index] = 0;
    open_set.push(OpenNode {
        f_cost: manhattan(start, goal),
        seq,
        index: start_index,
    });

    while let Some(current) = open_set.pop() {
        if closed[current.index] {
            continue;
        }
        if current.index == goal_index {
            return SearchOutcome::Found(reconstruct_path(&came_from, start_index, goal_index, cell_of));
        }

        closed[current.index] = true;
        expansions += 1;
        if expansions > limits.max_expansions {
            return SearchOutcome::BudgetExceeded;
        }

        let (cx, cz) = cell_of(current.index);
        let current_g = g_scores[current.index];

        for (dx, dz) in NEIGHBORS {
            let nx = cx as i32 + dx;
            let nz = cz as i32 + dz;
            if !grid.is_valid_cell(nx, nz) {
                continue;
            }

            let neighbor = (nx as usize, nz as usize);
            let neighbor_index = index_of(neighbor);
            if closed[neighbor_index] {
                continue;
            }

            let tentative_g = current_g + 1;
            if tentative_g < g_scores[neighbor_index] {
                came_from[neighbor_index] = current.index;
                g_scores[neighbor_index] = tentative_g;

                seq += 1;
                open_set.push(OpenNode {
                    f_cost: tentative_g + manhattan(neighbor, goal),
                    seq,
                    index: neighbor_index,
                });
            }
        }

        if open_set.len() > limits.max_open_nodes {
            return SearchOutcome::BudgetExceeded;
        }
    }

    SearchOutcome::NoPath
}

/// Walk came_from back to the start; start excluded
fn reconstruct_path(
    came_from: &[usize],
    start_index: usize,
    goal_index: usize,
    cell_of: impl Fn(usize) -> Cell,
) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal_index;
    while current != start_index {
        path.push(cell_of(current));
        current = came_from[current];
    }
    path.reverse();
    path
}
