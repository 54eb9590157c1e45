//! Player threat level with scheduled decay

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::ThreatConfig;
use crate::core::types::SimTime;

/// Player actions that raise threat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Kill,
    Damage,
    Grab,
    Headshot,
}

impl PlayerAction {
    pub fn gain(&self, config: &ThreatConfig) -> f32 {
        match self {
            PlayerAction::Kill => config.kill,
            PlayerAction::Damage => config.damage,
            PlayerAction::Grab => config.grab,
            PlayerAction::Headshot => config.headshot,
        }
    }
}

/// Threat accumulator
///
/// Every increment schedules its own decay `decay_delay` seconds later.
/// Decays are independent of each other and of later increments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatTracker {
    level: f32,
    /// Due times, oldest first
    pending: VecDeque<SimTime>,
}

impl ThreatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn pending_decays(&self) -> usize {
        self.pending.len()
    }

    /// Raise threat for an action, clamped at `config.max`
    pub fn record(&mut self, action: PlayerAction, now: SimTime, config: &ThreatConfig) -> f32 {
        self.level = (self.level + action.gain(config)).clamp(0.0, config.max);
        let due = now + config.decay_delay;
        // Keep due times ordered even if callers report out of order
        let at = self.pending.partition_point(|&t| t <= due);
        self.pending.insert(at, due);
        self.level
    }

    /// Apply every decay that has come due
    pub fn advance(&mut self, now: SimTime, config: &ThreatConfig) {
        while let Some(&due) = self.pending.front() {
            if due > now {
                break;
            }
            self.pending.pop_front();
            self.level = (self.level - config.decay_amount).max(0.0);
        }
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.pending.clear();
    }
}
