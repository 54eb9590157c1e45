use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;

use arena_tactics::core::config::ArenaConfig;
use arena_tactics::navigation::astar::SearchLimits;
use arena_tactics::navigation::planner::{GridPlanner, PathPlanner};
use arena_tactics::spatial::collision::{BoxGeometry, CollisionOracle};
use arena_tactics::spatial::occupancy::OccupancyGrid;

fn walled_geometry(half: f32) -> BoxGeometry {
    BoxGeometry::new(half)
        .with_wall(Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0), 1.0, 3.0)
        .with_wall(Vec3::new(-5.0, 0.0, 10.0), Vec3::new(-5.0, 0.0, 30.0), 1.0, 3.0)
}

fn bench_grid_build(c: &mut Criterion) {
    let arena = ArenaConfig::default();
    let geometry = walled_geometry(arena.half_extent);
    let oracle: &dyn CollisionOracle = &geometry;
    c.bench_function("occupancy_build_100x100", |b| {
        b.iter(|| OccupancyGrid::build(Some(black_box(oracle)), &arena))
    });
}

fn bench_find_path(c: &mut Criterion) {
    let arena = ArenaConfig::default();
    let geometry = walled_geometry(arena.half_extent);
    let oracle: &dyn CollisionOracle = &geometry;
    let grid = OccupancyGrid::build(Some(oracle), &arena);
    let planner = GridPlanner::new(grid, SearchLimits::default());

    c.bench_function("find_path_open", |b| {
        b.iter(|| planner.find_path(black_box(Vec3::new(-30.0, 0.0, -30.0)), black_box(Vec3::new(-10.0, 0.0, -20.0))))
    });
    c.bench_function("find_path_around_wall", |b| {
        b.iter(|| planner.find_path(black_box(Vec3::new(0.0, 0.0, -5.0)), black_box(Vec3::new(0.0, 0.0, 5.0))))
    });
}

criterion_group!(benches, bench_grid_build, bench_find_path);
criterion_main!(benches);
