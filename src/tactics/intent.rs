//! Intent selection
//!
//! Each tick an agent picks one [`Intent`] from a snapshot of its situation.
//! Selection is a pure function so every archetype's decision table can be
//! exercised without a running arena.

use serde::{Deserialize, Serialize};

use crate::core::config::TacticsConfig;
use crate::core::types::Tick;
use crate::tactics::archetype::Archetype;

/// What an agent is trying to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Unaware of the player
    Patrol,
    /// Close on the player
    Engage,
    /// Circle the player at an offset
    Flank,
    /// Stay put (in cover, or at standoff range)
    Hold,
    /// Back away from the player
    Retreat,
    /// Move to the cached cover point
    TakeCover,
    /// Sidestep perpendicular to the player
    Evade,
    /// Blow up in place
    Detonate,
}

/// Situation snapshot fed to [`select_intent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalInputs {
    pub archetype: Archetype,
    /// Knows roughly where the player is
    pub aware: bool,
    /// Horizontal distance to the last known player position
    pub distance: f32,
    pub health_ratio: f32,
    pub alert_level: f32,
    /// Effective ranged standoff (already scaled by threat)
    pub standoff: f32,
    pub has_cover: bool,
    pub holding_cover: bool,
    /// Evasion window still running
    pub evading: bool,
    pub exploder_triggered: bool,
    /// Agent tick counter (drone cycle phase)
    pub tick: Tick,
}

pub fn select_intent(inputs: &TacticalInputs, config: &TacticsConfig) -> Intent {
    if inputs.archetype == Archetype::Exploder && inputs.exploder_triggered {
        return Intent::Detonate;
    }
    if !inputs.aware {
        return Intent::Patrol;
    }

    match inputs.archetype {
        Archetype::Normal | Archetype::Shielded => Intent::Engage,
        Archetype::Scout => {
            if inputs.evading
                || inputs.distance < config.scout_evade_distance
                || inputs.alert_level > config.scout_evade_alert
            {
                Intent::Evade
            } else {
                Intent::Flank
            }
        }
        Archetype::Heavy => {
            if inputs.health_ratio < config.heavy_cover_health {
                cover_or(inputs, Intent::Engage)
            } else {
                Intent::Engage
            }
        }
        Archetype::Ranged => {
            if inputs.health_ratio < config.ranged_retreat_health {
                cover_or(inputs, Intent::Retreat)
            } else if inputs.distance < inputs.standoff - config.ranged_band {
                Intent::Retreat
            } else if inputs.distance > inputs.standoff + config.ranged_band {
                Intent::Engage
            } else {
                Intent::Hold
            }
        }
        Archetype::Exploder => {
            if inputs.distance <= config.exploder_blast_radius {
                Intent::Detonate
            } else {
                Intent::Engage
            }
        }
        Archetype::Drone => {
            let cycle = config.drone_cycle_ticks.max(1);
            if inputs.tick % cycle < config.drone_dive_ticks {
                Intent::Engage
            } else {
                Intent::Retreat
            }
        }
    }
}

fn cover_or(inputs: &TacticalInputs, fallback: Intent) -> Intent {
    if inputs.holding_cover {
        Intent::Hold
    } else if inputs.has_cover {
        Intent::TakeCover
    } else {
        fallback
    }
}
