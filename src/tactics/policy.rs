//! Archetype policies: where an intent leads, and archetype-specific rules

use std::f32::consts::TAU;

use glam::Vec3;

use crate::core::config::TacticsConfig;
use crate::core::types::{bearing_vector, flat, rotate_y, SimTime};
use crate::tactics::intent::Intent;

/// How far ahead an evading agent aims its sidestep
const EVADE_LOOKAHEAD: f32 = 3.0;

/// Movement request produced by a policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOrder {
    pub destination: Vec3,
    pub speed_scale: f32,
    /// Long trips may go through the path planner
    pub pathable: bool,
}

/// Inputs for resolving an intent into a movement order
#[derive(Debug, Clone, Copy)]
pub struct MoveContext {
    pub position: Vec3,
    /// Last known player position
    pub target: Vec3,
    pub cover: Option<Vec3>,
    pub evasion_heading: Option<Vec3>,
    pub flank_angle: f32,
    pub standoff: f32,
    pub flying: bool,
}

/// Resolve an intent into a destination, or `None` to stay in place
pub fn move_order(intent: Intent, ctx: &MoveContext, config: &TacticsConfig) -> Option<MoveOrder> {
    let away = flat(ctx.position - ctx.target).normalize_or_zero();
    let away = if away == Vec3::ZERO { Vec3::X } else { away };

    match intent {
        Intent::Patrol | Intent::Hold | Intent::Detonate => None,
        Intent::Engage => Some(MoveOrder {
            destination: ctx.target,
            speed_scale: 1.0,
            pathable: !ctx.flying,
        }),
        Intent::Flank => Some(MoveOrder {
            destination: ctx.target + bearing_vector(ctx.flank_angle) * config.scout_flank_radius,
            speed_scale: 1.0,
            pathable: true,
        }),
        Intent::Retreat => {
            let destination = if ctx.flying {
                ctx.position + away * config.drone_retreat_distance
            } else {
                ctx.target + away * ctx.standoff
            };
            Some(MoveOrder {
                destination,
                speed_scale: 0.8,
                pathable: !ctx.flying,
            })
        }
        Intent::TakeCover => ctx.cover.map(|cover| MoveOrder {
            destination: cover,
            speed_scale: 1.0,
            pathable: true,
        }),
        Intent::Evade => {
            let heading = ctx.evasion_heading.unwrap_or_else(|| rotate_y(-away, TAU / 4.0));
            Some(MoveOrder {
                destination: ctx.position + heading * EVADE_LOOKAHEAD,
                speed_scale: 1.0,
                pathable: false,
            })
        }
    }
}

/// Ranged standoff distance, pushed out by player threat
pub fn ranged_standoff(threat: f32, config: &TacticsConfig) -> f32 {
    config.ranged_standoff + threat.max(0.0) * config.ranged_standoff_threat_scale
}

/// Ticks between shots, shortened as threat rises
pub fn fire_cooldown(threat: f32, max_threat: f32, config: &TacticsConfig) -> u32 {
    let urgency = if max_threat > 0.0 {
        (threat / max_threat).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let span = config.ranged_fire_cooldown.saturating_sub(config.ranged_min_fire_cooldown) as f32;
    config.ranged_fire_cooldown - (span * urgency).round() as u32
}

/// Shield `(active, opacity)` from remaining health
pub fn shield_state(health_ratio: f32, config: &TacticsConfig) -> (bool, f32) {
    let active = health_ratio > config.shield_threshold;
    let headroom = (1.0 - config.shield_threshold).max(f32::EPSILON);
    let opacity = ((health_ratio - config.shield_threshold) / headroom).clamp(0.0, 1.0);
    (active, opacity)
}

/// Is `source` inside the frontal arc of an agent facing `facing`?
pub fn is_frontal(position: Vec3, facing: Vec3, source: Vec3) -> bool {
    let to_source = flat(source - position).normalize_or_zero();
    let facing = flat(facing).normalize_or_zero();
    to_source.dot(facing) > 0.5
}

/// Damage after an active shield absorbs its share of frontal hits
pub fn shielded_damage(amount: f32, shield_active: bool, frontal: bool, config: &TacticsConfig) -> f32 {
    if shield_active && frontal {
        amount * (1.0 - config.shield_front_reduction)
    } else {
        amount
    }
}

/// Drone altitude: low during the dive, bobbing at hover height otherwise
pub fn drone_altitude(intent: Intent, now: SimTime, phase: f32, config: &TacticsConfig) -> f32 {
    let bob = (TAU * config.drone_bob_hz * now as f32 + phase).sin() * config.drone_altitude_amplitude;
    match intent {
        Intent::Engage => (config.drone_hover_altitude * 0.25 + bob * 0.25).max(0.5),
        _ => config.drone_hover_altitude + bob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> MoveContext {
        MoveContext {
            position: Vec3::new(10.0, 0.0, 0.0),
            target: Vec3::ZERO,
            cover: None,
            evasion_heading: None,
            flank_angle: 0.0,
            standoff: 15.0,
            flying: false,
        }
    }

    #[test]
    fn test_engage_heads_for_target() {
        let config = TacticsConfig::default();
        let order = move_order(Intent::Engage, &ctx(), &config).expect("engage moves");
        assert_eq!(order.destination, Vec3::ZERO);
        assert!(order.pathable);
    }

    #[test]
    fn test_hold_and_patrol_stay_put() {
        let config = TacticsConfig::default();
        assert!(move_order(Intent::Hold, &ctx(), &config).is_none());
        assert!(move_order(Intent::Patrol, &ctx(), &config).is_none());
        assert!(move_order(Intent::Detonate, &ctx(), &config).is_none());
    }

    #[test]
    fn test_ranged_retreat_to_standoff() {
        let config = TacticsConfig::default();
        let order = move_order(Intent::Retreat, &ctx(), &config).expect("retreat moves");
        assert!((order.destination - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_drone_retreat_moves_away() {
        let config = TacticsConfig::default();
        let flying = MoveContext { flying: true, ..ctx() };
        let order = move_order(Intent::Retreat, &flying, &config).expect("retreat moves");
        assert!((order.destination.x - 20.0).abs() < 1e-5);
        assert!(!order.pathable);
    }

    #[test]
    fn test_flank_point_on_ring() {
        let config = TacticsConfig::default();
        let flank = MoveContext {
            flank_angle: 1.2,
            ..ctx()
        };
        let order = move_order(Intent::Flank, &flank, &config).expect("flank moves");
        assert!((order.destination.length() - config.scout_flank_radius).abs() < 1e-4);
    }

    #[test]
    fn test_take_cover_without_point_stays() {
        let config = TacticsConfig::default();
        assert!(move_order(Intent::TakeCover, &ctx(), &config).is_none());
        let covered = MoveContext {
            cover: Some(Vec3::new(8.0, 0.0, 3.0)),
            ..ctx()
        };
        let order = move_order(Intent::TakeCover, &covered, &config).expect("cover moves");
        assert_eq!(order.destination, Vec3::new(8.0, 0.0, 3.0));
    }

    #[test]
    fn test_standoff_grows_with_threat() {
        let config = TacticsConfig::default();
        assert_eq!(ranged_standoff(0.0, &config), 15.0);
        assert!((ranged_standoff(100.0, &config) - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_fire_cooldown_shrinks_with_threat() {
        let config = TacticsConfig::default();
        assert_eq!(fire_cooldown(0.0, 100.0, &config), 90);
        assert_eq!(fire_cooldown(50.0, 100.0, &config), 60);
        assert_eq!(fire_cooldown(100.0, 100.0, &config), 30);
    }

    #[test]
    fn test_shield_drops_below_threshold() {
        let config = TacticsConfig::default();
        let (active, opacity) = shield_state(1.0, &config);
        assert!(active);
        assert_eq!(opacity, 1.0);
        let (active, opacity) = shield_state(0.2, &config);
        assert!(!active);
        assert_eq!(opacity, 0.0);
    }

    #[test]
    fn test_frontal_hits_reduced() {
        let config = TacticsConfig::default();
        assert!(is_frontal(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 5.0)));
        assert!(!is_frontal(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0)));
        assert!((shielded_damage(10.0, true, true, &config) - 2.0).abs() < 1e-5);
        assert_eq!(shielded_damage(10.0, true, false, &config), 10.0);
        assert_eq!(shielded_damage(10.0, false, true, &config), 10.0);
    }

    #[test]
    fn test_drone_dives_below_hover() {
        let config = TacticsConfig::default();
        for i in 0..20 {
            let t = i as f64 * 0.1;
            let diving = drone_altitude(Intent::Engage, t, 0.0, &config);
            let hovering = drone_altitude(Intent::Retreat, t, 0.0, &config);
            assert!(diving < hovering);
            assert!(diving >= 0.5);
        }
    }
}
