//! Awareness: line of sight, alert accumulation and target prediction

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::AwarenessConfig;
use crate::core::types::{horizontal_distance, SimTime};
use crate::spatial::collision::CollisionOracle;
use crate::tactics::state::AgentAIState;

/// Eye point above an agent's feet
pub const EYE_HEIGHT: f32 = 1.5;

/// Height of each line-of-sight probe
const LOS_PROBE_HEIGHT: f32 = 0.1;

/// Sample the segment every `step` units, endpoints excluded
///
/// Without an oracle nothing can block, so every pair is visible.
pub fn has_line_of_sight(
    oracle: Option<&dyn CollisionOracle>,
    from: Vec3,
    to: Vec3,
    step: f32,
    probe_radius: f32,
) -> bool {
    let Some(oracle) = oracle else {
        return true;
    };

    let delta = to - from;
    let distance = delta.length();
    if distance <= step || step <= 0.0 {
        return true;
    }

    let dir = delta / distance;
    let mut travelled = step;
    while travelled < distance {
        let sample = from + dir * travelled;
        if oracle.check_collision(sample, probe_radius, LOS_PROBE_HEIGHT) {
            return false;
        }
        travelled += step;
    }

    true
}

/// Result of one awareness pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AwarenessOutcome {
    pub visible: bool,
    /// Alert crossed the broadcast threshold while the player was in sight
    pub broadcast: bool,
}

/// Update an agent's alert from what it can see
pub fn update_awareness(
    state: &mut AgentAIState,
    tracker: &mut TargetTracker,
    agent_position: Vec3,
    player_position: Vec3,
    now: SimTime,
    oracle: Option<&dyn CollisionOracle>,
    config: &AwarenessConfig,
) -> AwarenessOutcome {
    let in_range = horizontal_distance(agent_position, player_position) <= config.sight_range;
    let visible = in_range
        && has_line_of_sight(
            oracle,
            agent_position + Vec3::Y * EYE_HEIGHT,
            player_position + Vec3::Y * EYE_HEIGHT,
            config.los_step,
            config.los_probe_radius,
        );

    if !visible {
        state.decay_alert(now, config.grace_period, config.decay_per_second);
        return AwarenessOutcome {
            visible: false,
            broadcast: false,
        };
    }

    state.raise_alert(config.sighting_gain);
    state.last_known_player_position = Some(player_position);
    state.mark_stimulus(now);
    tracker.record(now, player_position);

    AwarenessOutcome {
        visible: true,
        broadcast: state.alert_level() > config.broadcast_threshold,
    }
}

/// Bounded history of player sightings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetTracker {
    capacity: usize,
    samples: VecDeque<(SimTime, Vec3)>,
}

impl TargetTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn record(&mut self, time: SimTime, position: Vec3) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((time, position));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<Vec3> {
        self.samples.back().map(|(_, p)| *p)
    }

    /// Velocity from the two most recent sightings (units per second)
    pub fn velocity(&self) -> Vec3 {
        let len = self.samples.len();
        if len < 2 {
            return Vec3::ZERO;
        }
        let (t0, p0) = self.samples[len - 2];
        let (t1, p1) = self.samples[len - 1];
        if t1 > t0 {
            (p1 - p0) / (t1 - t0) as f32
        } else {
            Vec3::ZERO
        }
    }

    /// Latest sighting extrapolated `lookahead` seconds ahead
    pub fn predict(&self, lookahead: f32) -> Option<Vec3> {
        self.latest().map(|p| p + self.velocity() * lookahead)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
