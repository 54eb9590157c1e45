//! Agent archetypes and their base stats

use serde::{Deserialize, Serialize};

/// Behavioral profile of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Normal,
    Scout,
    Heavy,
    Ranged,
    Exploder,
    Shielded,
    Drone,
}

/// Base stats for an archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    pub max_health: f32,
    /// World units per second
    pub speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown_ticks: u32,
    /// Ignores ground collision
    pub flying: bool,
}

impl Archetype {
    pub const ALL: [Archetype; 7] = [
        Archetype::Normal,
        Archetype::Scout,
        Archetype::Heavy,
        Archetype::Ranged,
        Archetype::Exploder,
        Archetype::Shielded,
        Archetype::Drone,
    ];

    pub fn stats(&self) -> ArchetypeStats {
        match self {
            Archetype::Normal => ArchetypeStats {
                max_health: 100.0,
                speed: 3.0,
                damage: 10.0,
                attack_range: 2.0,
                attack_cooldown_ticks: 60,
                flying: false,
            },
            // Fast movement multiplier baked into speed
            Archetype::Scout => ArchetypeStats {
                max_health: 60.0,
                speed: 4.8,
                damage: 8.0,
                attack_range: 2.0,
                attack_cooldown_ticks: 45,
                flying: false,
            },
            Archetype::Heavy => ArchetypeStats {
                max_health: 250.0,
                speed: 2.0,
                damage: 25.0,
                attack_range: 2.5,
                attack_cooldown_ticks: 90,
                flying: false,
            },
            Archetype::Ranged => ArchetypeStats {
                max_health: 70.0,
                speed: 2.8,
                damage: 12.0,
                attack_range: 25.0,
                attack_cooldown_ticks: 90,
                flying: false,
            },
            Archetype::Exploder => ArchetypeStats {
                max_health: 50.0,
                speed: 4.5,
                damage: 60.0,
                attack_range: 3.0,
                attack_cooldown_ticks: 0,
                flying: false,
            },
            Archetype::Shielded => ArchetypeStats {
                max_health: 150.0,
                speed: 2.4,
                damage: 12.0,
                attack_range: 2.0,
                attack_cooldown_ticks: 60,
                flying: false,
            },
            Archetype::Drone => ArchetypeStats {
                max_health: 40.0,
                speed: 4.0,
                damage: 8.0,
                attack_range: 2.5,
                attack_cooldown_ticks: 40,
                flying: true,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Normal => "normal",
            Archetype::Scout => "scout",
            Archetype::Heavy => "heavy",
            Archetype::Ranged => "ranged",
            Archetype::Exploder => "exploder",
            Archetype::Shielded => "shielded",
            Archetype::Drone => "drone",
        }
    }
}

/// Archetype-specific runtime state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArchetypeState {
    Plain,
    Scout { flank_angle: f32 },
    /// One-shot detonation guard
    Exploder { triggered: bool },
    Shielded { active: bool, opacity: f32 },
    Drone { altitude: f32 },
}

impl ArchetypeState {
    pub fn for_archetype(archetype: Archetype, flank_angle: f32, altitude: f32) -> Self {
        match archetype {
            Archetype::Scout => ArchetypeState::Scout { flank_angle },
            Archetype::Exploder => ArchetypeState::Exploder { triggered: false },
            Archetype::Shielded => ArchetypeState::Shielded {
                active: true,
                opacity: 1.0,
            },
            Archetype::Drone => ArchetypeState::Drone { altitude },
            Archetype::Normal | Archetype::Heavy | Archetype::Ranged => ArchetypeState::Plain,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self, ArchetypeState::Exploder { triggered: true })
    }

    pub fn shield_active(&self) -> bool {
        matches!(self, ArchetypeState::Shielded { active: true, .. })
    }
}
