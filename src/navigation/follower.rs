//! Cached waypoint following with throttled replanning

use glam::Vec3;

use crate::core::config::PathingConfig;
use crate::core::types::{horizontal_distance, SimTime};
use crate::navigation::planner::PathPlanner;

/// Per-agent path cache
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    waypoints: Vec<Vec3>,
    index: usize,
    /// Destination the cached waypoints were planned to
    current_target: Option<Vec3>,
    last_plan_time: Option<SimTime>,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_target(&self) -> Option<Vec3> {
        self.current_target
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints[self.index.min(self.waypoints.len())..]
    }

    /// Replan when the interval elapsed or the destination drifted too far
    pub fn needs_replan(&self, destination: Vec3, now: SimTime, config: &PathingConfig) -> bool {
        match (self.last_plan_time, self.current_target) {
            (Some(last), Some(target)) => {
                now - last >= config.replan_interval
                    || horizontal_distance(target, destination) > config.replan_drift
            }
            _ => true,
        }
    }

    pub fn replan(&mut self, planner: &dyn PathPlanner, from: Vec3, destination: Vec3, now: SimTime) {
        self.waypoints = planner.find_path(from, destination);
        self.index = 0;
        self.current_target = Some(destination);
        self.last_plan_time = Some(now);
    }

    /// Skip reached waypoints and return the one to steer towards
    ///
    /// Falls back to the raw destination once the list is exhausted.
    pub fn next_target(&mut self, position: Vec3, destination: Vec3, config: &PathingConfig) -> Vec3 {
        while let Some(&waypoint) = self.waypoints.get(self.index) {
            if horizontal_distance(position, waypoint) > config.waypoint_reach {
                return waypoint;
            }
            self.index += 1;
        }
        destination
    }

    /// Replan if due, then return the steering target
    pub fn steer(
        &mut self,
        planner: &dyn PathPlanner,
        position: Vec3,
        destination: Vec3,
        now: SimTime,
        config: &PathingConfig,
    ) -> Vec3 {
        if self.needs_replan(destination, now, config) {
            self.replan(planner, position, destination, now);
        }
        self.next_target(position, destination, config)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
