//! Cover search around an agent

use std::f32::consts::TAU;

use glam::Vec3;

use crate::core::config::TacticsConfig;
use crate::core::types::{bearing_vector, flat};
use crate::spatial::collision::CollisionOracle;

/// Probe capsule used for cover checks
#[derive(Debug, Clone, Copy)]
pub struct CoverProbe {
    pub radius: f32,
    pub height: f32,
}

/// First free point on concentric rings whose line towards the threat is
/// blocked one probe-distance further on
///
/// Rings run from `cover_min_radius` outwards in `cover_radius_step`
/// increments, each sampled at `cover_angles` evenly spaced bearings.
/// Returns `None` without an oracle or when nothing qualifies.
pub fn find_cover(
    oracle: Option<&dyn CollisionOracle>,
    agent_position: Vec3,
    threat_position: Vec3,
    probe: CoverProbe,
    config: &TacticsConfig,
) -> Option<Vec3> {
    let oracle = oracle?;
    if config.cover_angles == 0 || config.cover_radius_step <= 0.0 {
        return None;
    }

    let mut radius = config.cover_min_radius;
    while radius <= config.cover_max_radius {
        for k in 0..config.cover_angles {
            let angle = k as f32 * TAU / config.cover_angles as f32;
            let candidate = agent_position + bearing_vector(angle) * radius;
            if oracle.check_collision(candidate, probe.radius, probe.height) {
                continue;
            }

            let toward = flat(threat_position - candidate).normalize_or_zero();
            if toward == Vec3::ZERO {
                continue;
            }

            let shield_point = candidate + toward * config.cover_probe_distance;
            if oracle.check_collision(shield_point, probe.radius, probe.height) {
                return Some(candidate);
            }
        }
        radius += config.cover_radius_step;
    }

    None
}
