//! Core type definitions used throughout the codebase

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Identifier of a formation group (ephemeral, reissued every rebalance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormationId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Simulated seconds since session start
pub type SimTime = f64;

/// Fixed-step simulation clock
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimClock {
    tick: Tick,
    dt: f32,
}

impl SimClock {
    pub fn new(hz: f32) -> Self {
        Self {
            tick: 0,
            dt: 1.0 / hz.max(1.0),
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn now(&self) -> SimTime {
        self.tick as f64 * self.dt as f64
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// Project onto the ground plane (y = 0)
#[inline]
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance ignoring altitude
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flat(a - b).length()
}

/// Rotate a vector around the vertical axis (counter-clockwise seen from above, x towards z)
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Unit vector on the ground plane for a bearing in radians
#[inline]
pub fn bearing_vector(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Bearing in radians of `to` as seen from `from`, on the ground plane
#[inline]
pub fn bearing(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    d.z.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_clock_advances() {
        let mut clock = SimClock::new(10.0);
        assert_eq!(clock.current_tick(), 0);
        for _ in 0..25 {
            clock.advance();
        }
        assert_eq!(clock.current_tick(), 25);
        assert!((clock.now() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let v = rotate_y(Vec3::X, FRAC_PI_2);
        assert!((v - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_bearing_roundtrip() {
        let from = Vec3::new(1.0, 0.0, 1.0);
        let to = from + bearing_vector(0.7) * 5.0;
        assert!((bearing(from, to) - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_distance_ignores_altitude() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId(7).to_string(), "agent#7");
    }
}
