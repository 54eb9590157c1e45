//! Per-agent AI state
//!
//! Owned exclusively by its agent. The squad coordinator only writes the
//! formation role and delivers alerts through [`AgentAIState::receive_alert`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SimTime};

pub const MAX_ALERT: f32 = 100.0;

/// Role inside a formation group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FormationRole {
    Leader,
    Flanker,
    Support,
    /// Live, but not clustered with anyone this rebalance
    Lone,
    #[default]
    None,
}

impl FormationRole {
    pub fn in_formation(&self) -> bool {
        matches!(self, FormationRole::Leader | FormationRole::Flanker | FormationRole::Support)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentAIState {
    /// Always within [0, MAX_ALERT]
    alert_level: f32,
    pub last_known_player_position: Option<Vec3>,
    /// At most one active cover point
    cover_position: Option<Vec3>,
    pub formation_role: FormationRole,
    pub alerted_by: Option<AgentId>,
    /// Ticks left in the current evasion window
    pub evasion_cooldown: u32,
    /// Ticks until the formation target is refreshed
    pub cooperation_cooldown: u32,
    pub last_damage_time: Option<SimTime>,
    /// Held evasion heading while `evasion_cooldown` runs
    pub evasion_direction: Option<Vec3>,
    /// Ticks left sitting in reached cover
    pub cover_hold: u32,
    /// Last sighting, hit or received alert
    last_stimulus_time: Option<SimTime>,
    /// Decay is integrated from here
    decay_checkpoint: Option<SimTime>,
}

impl AgentAIState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_level(&self) -> f32 {
        self.alert_level
    }

    pub fn set_alert_level(&mut self, level: f32) {
        self.alert_level = level.clamp(0.0, MAX_ALERT);
    }

    pub fn raise_alert(&mut self, amount: f32) {
        self.set_alert_level(self.alert_level + amount);
    }

    /// Has this agent any idea where the player is?
    pub fn is_aware(&self) -> bool {
        self.alert_level > 0.0 && self.last_known_player_position.is_some()
    }

    /// Refresh the grace window
    pub fn mark_stimulus(&mut self, now: SimTime) {
        self.last_stimulus_time = Some(now);
        self.decay_checkpoint = None;
    }

    pub fn last_stimulus_time(&self) -> Option<SimTime> {
        self.last_stimulus_time
    }

    /// Decay alert after `grace` seconds without stimulus
    ///
    /// Only the time past the grace window counts, so repeated calls inside
    /// the window never change the level.
    pub fn decay_alert(&mut self, now: SimTime, grace: SimTime, per_second: f32) {
        let Some(stimulus) = self.last_stimulus_time else {
            return;
        };
        let decay_start = stimulus + grace;
        if now <= decay_start {
            return;
        }
        let from = self.decay_checkpoint.map_or(decay_start, |c| c.max(decay_start));
        let elapsed = (now - from) as f32;
        self.set_alert_level(self.alert_level - per_second * elapsed);
        self.decay_checkpoint = Some(now);
    }

    /// Alert hook invoked by the squad coordinator
    pub fn receive_alert(&mut self, source: AgentId, position: Vec3, gain: f32, now: SimTime) {
        self.raise_alert(gain);
        self.alerted_by = Some(source);
        self.last_known_player_position = Some(position);
        self.mark_stimulus(now);
    }

    /// Taking damage: alert up, cover invalidated
    pub fn on_damaged(&mut self, source: Vec3, gain: f32, now: SimTime) {
        self.raise_alert(gain);
        self.last_damage_time = Some(now);
        self.last_known_player_position = Some(source);
        self.cover_position = None;
        self.cover_hold = 0;
        self.mark_stimulus(now);
    }

    pub fn cover_position(&self) -> Option<Vec3> {
        self.cover_position
    }

    /// Replaces any previous cover point
    pub fn set_cover(&mut self, position: Vec3) {
        self.cover_position = Some(position);
    }

    pub fn clear_cover(&mut self) {
        self.cover_position = None;
    }

    /// Count down per-tick windows
    pub fn tick_cooldowns(&mut self) {
        self.evasion_cooldown = self.evasion_cooldown.saturating_sub(1);
        if self.evasion_cooldown == 0 {
            self.evasion_direction = None;
        }
        self.cooperation_cooldown = self.cooperation_cooldown.saturating_sub(1);
        self.cover_hold = self.cover_hold.saturating_sub(1);
    }
}
