//! Spatial layer: collision oracle and occupancy map

pub mod collision;
pub mod occupancy;

pub use collision::{is_blocked, Aabb, BoxGeometry, CollisionOracle};
pub use occupancy::OccupancyGrid;
