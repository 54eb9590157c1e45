//! Evasion headings and collision-aware stepping

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec3;
use rand::Rng;

use crate::core::config::TacticsConfig;
use crate::core::types::{flat, rotate_y};
use crate::spatial::collision::CollisionOracle;
use crate::tactics::state::AgentAIState;

/// Deflection angles tried when the intended step is blocked, in order
const DEFLECTIONS: [f32; 4] = [FRAC_PI_4, -FRAC_PI_4, FRAC_PI_2, -FRAC_PI_2];

/// Perpendicular evasion heading, held for a randomized window
///
/// While the window runs the same heading is returned. Once it lapses a new
/// side is rolled and a fresh window of `evasion_min_ticks..=evasion_max_ticks`
/// starts.
pub fn evasion_heading<R: Rng>(
    state: &mut AgentAIState,
    to_threat: Vec3,
    rng: &mut R,
    config: &TacticsConfig,
) -> Vec3 {
    if state.evasion_cooldown > 0 {
        if let Some(heading) = state.evasion_direction {
            return heading;
        }
    }

    let forward = flat(to_threat).normalize_or_zero();
    let side = if rng.gen_bool(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
    let heading = rotate_y(forward, side);

    state.evasion_direction = Some(heading);
    state.evasion_cooldown = rng.gen_range(config.evasion_min_ticks..=config.evasion_max_ticks);
    heading
}

/// Capsule used when stepping an agent
#[derive(Debug, Clone, Copy)]
pub struct BodyShape {
    pub radius: f32,
    pub height: f32,
}

/// Apply `step` from `position`, deflecting around obstacles
///
/// Tries the full step, then shortened steps rotated ±45° and ±90°. Returns
/// `None` when every candidate is blocked; the agent stays put that tick.
pub fn resolve_step(
    oracle: Option<&dyn CollisionOracle>,
    position: Vec3,
    step: Vec3,
    body: BodyShape,
    config: &TacticsConfig,
) -> Option<Vec3> {
    let Some(oracle) = oracle else {
        return Some(position + step);
    };

    let direct = position + step;
    if !oracle.check_collision(direct, body.radius, body.height) {
        return Some(direct);
    }

    DEFLECTIONS.iter().find_map(|&angle| {
        let candidate = position + rotate_y(step, angle) * config.avoidance_step_factor;
        (!oracle.check_collision(candidate, body.radius, body.height)).then_some(candidate)
    })
}

/// Step of at most `max_distance` towards `target` on the ground plane
pub fn step_towards(position: Vec3, target: Vec3, max_distance: f32) -> Vec3 {
    let delta = flat(target - position);
    let distance = delta.length();
    if distance <= max_distance || distance <= f32::EPSILON {
        delta
    } else {
        delta / distance * max_distance
    }
}

/// Keep a position inside the arena square, `margin` from the edge
pub fn clamp_to_arena(position: Vec3, half_extent: f32, margin: f32) -> Vec3 {
    let limit = (half_extent - margin).max(0.0);
    Vec3::new(position.x.clamp(-limit, limit), position.y, position.z.clamp(-limit, limit))
}
