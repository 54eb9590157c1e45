//! Navigation: grid search, planner strategies, waypoint following

pub mod astar;
pub mod follower;
pub mod planner;

pub use astar::{find_cell_path, SearchLimits, SearchOutcome};
pub use follower::PathFollower;
pub use planner::{planner_for, DirectPlanner, GridPlanner, PathPlanner};
