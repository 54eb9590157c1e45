//! Property tests for planning, grid mapping and threat accounting

use arena_tactics::core::config::{ArenaConfig, ThreatConfig};
use arena_tactics::navigation::astar::SearchLimits;
use arena_tactics::navigation::planner::{GridPlanner, PathPlanner};
use arena_tactics::spatial::occupancy::OccupancyGrid;
use arena_tactics::squad::threat::{PlayerAction, ThreatTracker};
use arena_tactics::tactics::state::AgentAIState;
use glam::Vec3;
use proptest::prelude::*;

fn arena() -> ArenaConfig {
    ArenaConfig {
        half_extent: 20.0,
        ..ArenaConfig::default()
    }
}

/// Grid with a scattering of obstructed cells derived from `mask`
fn scattered_grid(mask: &[bool]) -> OccupancyGrid {
    let mut grid = OccupancyGrid::open(&arena());
    let size = grid.size();
    for (i, &blocked) in mask.iter().enumerate() {
        if blocked {
            let cell = (i * 7919) % (size * size);
            grid.set_obstructed(cell % size, cell / size, true);
        }
    }
    grid
}

fn action() -> impl Strategy<Value = PlayerAction> {
    prop_oneof![
        Just(PlayerAction::Kill),
        Just(PlayerAction::Damage),
        Just(PlayerAction::Grab),
        Just(PlayerAction::Headshot),
    ]
}

proptest! {
    #[test]
    fn world_to_grid_always_in_range(x in -1.0e4f32..1.0e4, z in -1.0e4f32..1.0e4) {
        let grid = OccupancyGrid::open(&arena());
        let (cx, cz) = grid.world_to_grid(Vec3::new(x, 0.0, z));
        prop_assert!(cx < grid.size());
        prop_assert!(cz < grid.size());
    }

    #[test]
    fn path_is_never_empty_and_ends_at_destination(
        sx in -25.0f32..25.0, sz in -25.0f32..25.0,
        ex in -25.0f32..25.0, ez in -25.0f32..25.0,
        mask in proptest::collection::vec(any::<bool>(), 0..300),
    ) {
        let planner = GridPlanner::new(Some(scattered_grid(&mask)), SearchLimits::default());
        let end = Vec3::new(ex, 0.0, ez);
        let path = planner.find_path(Vec3::new(sx, 0.0, sz), end);
        prop_assert!(!path.is_empty());
        prop_assert_eq!(path.last().copied(), Some(end));
    }

    #[test]
    fn open_grid_paths_are_four_connected(
        sx in -5.0f32..5.0, sz in -5.0f32..5.0,
        ex in -5.0f32..5.0, ez in -5.0f32..5.0,
    ) {
        let grid = OccupancyGrid::open(&arena());
        let planner = GridPlanner::new(Some(grid.clone()), SearchLimits::default());
        let start = Vec3::new(sx, 0.0, sz);
        let path = planner.find_path(start, Vec3::new(ex, 0.0, ez));

        let mut previous = grid.world_to_grid(start);
        for point in &path {
            let cell = grid.world_to_grid(*point);
            let step = previous.0.abs_diff(cell.0) + previous.1.abs_diff(cell.1);
            prop_assert!(step <= 1, "jump from {:?} to {:?}", previous, cell);
            previous = cell;
        }
    }

    #[test]
    fn threat_stays_within_bounds(
        actions in proptest::collection::vec((action(), 0.0f64..30.0), 0..60),
        probe in 0.0f64..60.0,
    ) {
        let config = ThreatConfig::default();
        let mut threat = ThreatTracker::new();
        let mut sorted = actions;
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (action, at) in sorted {
            threat.advance(at, &config);
            threat.record(action, at, &config);
            prop_assert!(threat.level() >= 0.0 && threat.level() <= config.max);
        }
        threat.advance(probe.max(30.0), &config);
        prop_assert!(threat.level() >= 0.0 && threat.level() <= config.max);
    }

    #[test]
    fn alert_stays_within_bounds(deltas in proptest::collection::vec(-200.0f32..200.0, 0..50)) {
        let mut state = AgentAIState::new();
        for (i, delta) in deltas.into_iter().enumerate() {
            state.raise_alert(delta);
            state.decay_alert(i as f64, 3.0, 5.0);
            prop_assert!((0.0..=100.0).contains(&state.alert_level()));
        }
    }
}
