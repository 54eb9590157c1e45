//! AI configuration with documented constants
//!
//! Every tunable of the combat AI lives here, grouped by subsystem. Each
//! section is `#[serde(default)]`, so a TOML file only needs the values it
//! overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};

/// Arena extent and collision probe shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Half the side length of the square arena (world units)
    ///
    /// The arena spans `[-half_extent, half_extent]` on x and z.
    pub half_extent: f32,

    /// World units per occupancy grid cell
    pub cell_size: f32,

    /// Only every `sample_stride`-th cell on each axis is probed when the
    /// occupancy grid is built.
    ///
    /// At 2, the oracle is queried for a quarter of the cells. Obstacles
    /// thinner than the stride can fall between samples and stay invisible
    /// to the planner; local avoidance handles those.
    pub sample_stride: usize,

    /// Probe radius used when sampling the grid
    pub probe_radius: f32,
    /// Probe height used when sampling the grid
    pub probe_height: f32,

    /// Capsule used for agent locomotion checks
    pub agent_radius: f32,
    pub agent_height: f32,

    /// Simulation rate in ticks per second
    pub tick_rate: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: 50.0,
            cell_size: 1.0,
            sample_stride: 2,
            probe_radius: 0.4,
            probe_height: 1.0,
            agent_radius: 0.5,
            agent_height: 1.8,
            tick_rate: 60.0,
        }
    }
}

impl ArenaConfig {
    /// Number of cells along one side of the occupancy grid
    pub fn grid_size(&self) -> usize {
        ((self.half_extent * 2.0) / self.cell_size).ceil().max(1.0) as usize
    }
}

/// Which path planner the arena uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    /// A* over the occupancy grid, direct-line fallback on failure
    #[default]
    GridSearch,
    /// Always a straight line to the destination
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    pub strategy: PathStrategy,

    /// Search gives up (direct fallback) once the open set holds more nodes
    pub max_open_nodes: usize,

    /// Search gives up (direct fallback) after expanding this many nodes
    ///
    /// Together with `max_open_nodes` this is the only bound on per-call
    /// planning cost.
    pub max_expansions: usize,

    /// Seconds between unconditional replans
    pub replan_interval: f64,

    /// Replan early when the destination drifts further than this from the
    /// destination of the last plan
    pub replan_drift: f32,

    /// Waypoint counts as reached within this distance
    pub waypoint_reach: f32,

    /// Beyond this distance agents follow planned paths; closer they steer directly
    pub path_distance_threshold: f32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            strategy: PathStrategy::GridSearch,
            max_open_nodes: 200,
            max_expansions: 200,
            replan_interval: 2.0,
            replan_drift: 3.0,
            waypoint_reach: 1.5,
            path_distance_threshold: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwarenessConfig {
    /// Sensing radius for line-of-sight sightings
    pub sight_range: f32,

    /// Spacing between line-of-sight samples
    ///
    /// Cost of one check grows linearly with distance / step, which is why
    /// awareness runs on `update_interval_ticks` instead of every tick.
    pub los_step: f32,
    pub los_probe_radius: f32,

    pub sighting_gain: f32,
    pub damage_gain: f32,
    pub received_alert_gain: f32,

    /// Alert above this broadcasts to nearby agents
    pub broadcast_threshold: f32,

    /// Seconds without a sighting before alert starts to decay
    pub grace_period: f64,
    pub decay_per_second: f32,

    /// Awareness runs once every N ticks per agent (phase-staggered)
    pub update_interval_ticks: u64,

    /// Number of sightings kept for prediction
    pub history_len: usize,
    /// Velocity multiplier applied when predicting the target position
    pub lookahead: f32,
}

impl Default for AwarenessConfig {
    fn default() -> Self {
        Self {
            sight_range: 30.0,
            los_step: 0.5,
            los_probe_radius: 0.1,
            sighting_gain: 20.0,
            damage_gain: 30.0,
            received_alert_gain: 25.0,
            broadcast_threshold: 50.0,
            grace_period: 3.0,
            decay_per_second: 5.0,
            update_interval_ticks: 10,
            history_len: 5,
            lookahead: 0.5,
        }
    }
}

/// How live agents are grouped into squads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// Each unvisited agent seeds a cluster and absorbs unvisited agents
    /// within range of the seed only. Result depends on iteration order.
    #[default]
    SeedRadius,
    /// Union-find over the same distance relation: true connected components
    ConnectedComponents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SquadConfig {
    pub alert_radius: f32,
    pub cluster_distance: f32,
    pub clustering: ClusterMode,

    /// Minimum simulated seconds between two rebalances
    pub rebalance_interval: f64,

    /// Formation targets are refreshed once every N ticks per agent
    pub formation_interval_ticks: u64,

    /// Weight of the formation target when blended with the tactical target
    ///
    /// 0.0 = tactics only, 1.0 = formation only.
    pub formation_blend: f32,

    /// Cache rolled radius/angle per formation slot instead of rerolling per query
    pub stable_slots: bool,

    pub surround_radius_min: f32,
    pub surround_radius_max: f32,
    pub pincer_radius: f32,
    pub pincer_angle_deg: f32,
    pub line_radius: f32,
    pub line_flank_offset_deg: f32,
    pub scatter_jitter_deg: f32,
    pub scatter_radius_gain: f32,
}

impl Default for SquadConfig {
    fn default() -> Self {
        Self {
            alert_radius: 15.0,
            cluster_distance: 12.0,
            clustering: ClusterMode::SeedRadius,
            rebalance_interval: 2.0,
            formation_interval_ticks: 2,
            formation_blend: 0.4,
            stable_slots: true,
            surround_radius_min: 8.0,
            surround_radius_max: 12.0,
            pincer_radius: 10.0,
            pincer_angle_deg: 60.0,
            line_radius: 10.0,
            line_flank_offset_deg: 30.0,
            scatter_jitter_deg: 45.0,
            scatter_radius_gain: 6.0,
        }
    }
}

/// Player threat accounting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    pub kill: f32,
    pub damage: f32,
    pub grab: f32,
    pub headshot: f32,
    pub max: f32,

    /// Amount removed by each scheduled decay
    pub decay_amount: f32,
    /// Seconds between an increment and its decay
    ///
    /// Every increment schedules its own decay. A burst of actions produces
    /// a burst of decays.
    pub decay_delay: f64,

    /// Above this, new formations scatter
    pub scatter_threshold: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            kill: 15.0,
            damage: 5.0,
            grab: 10.0,
            headshot: 20.0,
            max: 100.0,
            decay_amount: 5.0,
            decay_delay: 5.0,
            scatter_threshold: 70.0,
        }
    }
}

/// Archetype policy tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    // === COVER ===
    pub cover_min_radius: f32,
    pub cover_max_radius: f32,
    pub cover_radius_step: f32,
    pub cover_angles: usize,
    /// Distance from a candidate towards the target that must be blocked
    pub cover_probe_distance: f32,
    pub cover_arrival_distance: f32,
    /// Ticks an agent stays put after reaching cover
    pub cover_hold_ticks: u32,

    // === EVASION / AVOIDANCE ===
    pub evasion_min_ticks: u32,
    pub evasion_max_ticks: u32,
    /// Deflected moves use this fraction of the intended step
    pub avoidance_step_factor: f32,

    // === HEAVY ===
    pub heavy_cover_health: f32,

    // === RANGED ===
    pub ranged_retreat_health: f32,
    pub ranged_standoff: f32,
    /// Extra standoff per point of player threat
    pub ranged_standoff_threat_scale: f32,
    pub ranged_band: f32,
    pub ranged_max_range: f32,
    pub ranged_fire_cooldown: u32,
    pub ranged_min_fire_cooldown: u32,

    // === SCOUT ===
    pub scout_flank_radius: f32,
    /// Radians added to the flank angle each tick
    pub scout_flank_rate: f32,
    pub scout_evade_distance: f32,
    pub scout_evade_alert: f32,

    // === EXPLODER ===
    pub exploder_blast_radius: f32,

    // === SHIELDED ===
    /// Shield stays up while health ratio is above this
    pub shield_threshold: f32,
    /// Fraction of front-facing damage absorbed by an active shield
    pub shield_front_reduction: f32,

    // === DRONE ===
    pub drone_cycle_ticks: u64,
    pub drone_dive_ticks: u64,
    pub drone_hover_altitude: f32,
    pub drone_altitude_amplitude: f32,
    pub drone_bob_hz: f32,
    pub drone_retreat_distance: f32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            cover_min_radius: 3.0,
            cover_max_radius: 8.0,
            cover_radius_step: 2.0,
            cover_angles: 8,
            cover_probe_distance: 1.0,
            cover_arrival_distance: 1.0,
            cover_hold_ticks: 120,

            evasion_min_ticks: 60,
            evasion_max_ticks: 120,
            avoidance_step_factor: 0.5,

            heavy_cover_health: 0.4,

            ranged_retreat_health: 0.5,
            ranged_standoff: 15.0,
            ranged_standoff_threat_scale: 0.05,
            ranged_band: 3.0,
            ranged_max_range: 25.0,
            ranged_fire_cooldown: 90,
            ranged_min_fire_cooldown: 30,

            scout_flank_radius: 6.0,
            scout_flank_rate: 0.02,
            scout_evade_distance: 4.0,
            scout_evade_alert: 80.0,

            exploder_blast_radius: 3.0,

            shield_threshold: 0.3,
            shield_front_reduction: 0.8,

            drone_cycle_ticks: 240,
            drone_dive_ticks: 80,
            drone_hover_altitude: 4.0,
            drone_altitude_amplitude: 1.5,
            drone_bob_hz: 0.5,
            drone_retreat_distance: 10.0,
        }
    }
}

/// Complete AI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub arena: ArenaConfig,
    pub pathing: PathingConfig,
    pub awareness: AwarenessConfig,
    pub squad: SquadConfig,
    pub threat: ThreatConfig,
    pub tactics: TacticsConfig,
}

impl AiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.arena.half_extent <= 0.0 || self.arena.cell_size <= 0.0 {
            return Err(ArenaError::Config(format!(
                "arena half_extent ({}) and cell_size ({}) must be positive",
                self.arena.half_extent, self.arena.cell_size
            )));
        }

        if self.arena.sample_stride == 0 {
            return Err(ArenaError::Config("sample_stride must be at least 1".into()));
        }

        if self.arena.tick_rate <= 0.0 {
            return Err(ArenaError::Config("tick_rate must be positive".into()));
        }

        if self.squad.surround_radius_min > self.squad.surround_radius_max {
            return Err(ArenaError::Config(format!(
                "surround_radius_min ({}) should be <= surround_radius_max ({})",
                self.squad.surround_radius_min, self.squad.surround_radius_max
            )));
        }

        if !(0.0..=1.0).contains(&self.squad.formation_blend) {
            return Err(ArenaError::Config(format!(
                "formation_blend ({}) must be within [0, 1]",
                self.squad.formation_blend
            )));
        }

        if self.awareness.update_interval_ticks == 0 || self.squad.formation_interval_ticks == 0 {
            return Err(ArenaError::Config("tick intervals must be at least 1".into()));
        }

        if self.awareness.los_step <= 0.0 {
            return Err(ArenaError::Config("los_step must be positive".into()));
        }

        if self.tactics.evasion_min_ticks > self.tactics.evasion_max_ticks {
            return Err(ArenaError::Config(format!(
                "evasion_min_ticks ({}) should be <= evasion_max_ticks ({})",
                self.tactics.evasion_min_ticks, self.tactics.evasion_max_ticks
            )));
        }

        if self.tactics.drone_dive_ticks > self.tactics.drone_cycle_ticks {
            return Err(ArenaError::Config("drone_dive_ticks exceeds drone_cycle_ticks".into()));
        }

        Ok(())
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<AiConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    AiConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_grid_size_from_extent() {
        let arena = ArenaConfig::default();
        assert_eq!(arena.grid_size(), 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AiConfig::from_toml_str(
            r#"
            [pathing]
            strategy = "direct"

            [squad]
            clustering = "connected_components"
            alert_radius = 20.0
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.pathing.strategy, PathStrategy::Direct);
        assert_eq!(config.squad.clustering, ClusterMode::ConnectedComponents);
        assert_eq!(config.squad.alert_radius, 20.0);
        // Untouched values keep defaults
        assert_eq!(config.squad.cluster_distance, 12.0);
        assert_eq!(config.threat.kill, 15.0);
    }

    #[test]
    fn test_invalid_radius_band_rejected() {
        let mut config = AiConfig::default();
        config.squad.surround_radius_min = 20.0;
        assert!(matches!(config.validate(), Err(ArenaError::Config(_))));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let result = AiConfig::from_toml_str("[arena\nhalf_extent = ");
        assert!(matches!(result, Err(ArenaError::Toml(_))));
    }

    #[test]
    fn test_load_shipped_config() {
        let config = load_config("data/arena_ai.toml").expect("Should load shipped config");
        assert_eq!(config.awareness.grace_period, 3.0);
        assert_eq!(config.pathing.max_open_nodes, 200);
        assert_eq!(config.pathing.max_expansions, 200);
    }
}
