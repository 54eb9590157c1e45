//! Agent record

use std::f32::consts::TAU;

use glam::Vec3;
use serde::Serialize;

use crate::core::config::{AwarenessConfig, TacticsConfig};
use crate::core::types::{AgentId, SimTime};
use crate::navigation::follower::PathFollower;
use crate::squad::coordinator::SquadMember;
use crate::tactics::archetype::{Archetype, ArchetypeState, ArchetypeStats};
use crate::tactics::awareness::TargetTracker;
use crate::tactics::intent::Intent;
use crate::tactics::policy::{is_frontal, shield_state, shielded_damage};
use crate::tactics::state::AgentAIState;

#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub archetype: Archetype,
    pub stats: ArchetypeStats,
    pub position: Vec3,
    /// Unit vector on the ground plane
    pub facing: Vec3,
    pub health: f32,
    pub ai: AgentAIState,
    pub archetype_state: ArchetypeState,
    pub intent: Intent,
    /// Per-agent tick counter, started at a random phase so periodic work
    /// is spread across ticks
    pub tick_counter: u64,
    /// Ticks until the next attack or shot
    pub attack_cooldown: u32,
    /// Last formation slot handed out by the coordinator
    pub formation_target: Option<Vec3>,
    /// Result of the last awareness pass
    pub target_visible: bool,
    /// Drone bob phase offset (radians)
    pub bob_phase: f32,
    #[serde(skip)]
    pub follower: PathFollower,
    #[serde(skip)]
    pub tracker: TargetTracker,
}

impl Agent {
    pub fn new(id: AgentId, archetype: Archetype, position: Vec3, tick_phase: u64, phase: f32, history_len: usize) -> Self {
        let stats = archetype.stats();
        Self {
            id,
            archetype,
            stats,
            position,
            facing: Vec3::Z,
            health: stats.max_health,
            ai: AgentAIState::new(),
            archetype_state: ArchetypeState::for_archetype(archetype, phase, position.y),
            intent: Intent::Patrol,
            tick_counter: tick_phase,
            attack_cooldown: 0,
            formation_target: None,
            target_visible: false,
            bob_phase: phase.rem_euclid(TAU),
            follower: PathFollower::new(),
            tracker: TargetTracker::new(history_len),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        if self.stats.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.stats.max_health).clamp(0.0, 1.0)
    }

    /// Take a hit from `source`; returns the damage actually applied
    ///
    /// An active shield absorbs most of a frontal hit. Any hit raises alert
    /// and invalidates the current cover point.
    pub fn apply_damage(
        &mut self,
        amount: f32,
        source: Vec3,
        now: SimTime,
        awareness: &AwarenessConfig,
        tactics: &TacticsConfig,
    ) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }

        let frontal = is_frontal(self.position, self.facing, source);
        let shield_up = self.refresh_shield(tactics);
        let applied = shielded_damage(amount, shield_up, frontal, tactics);
        self.health = (self.health - applied).max(0.0);
        self.refresh_shield(tactics);
        self.ai.on_damaged(source, awareness.damage_gain, now);
        self.follower.clear();

        if !self.is_alive() {
            tracing::debug!("{} ({}) killed", self.id, self.archetype.name());
        }
        applied
    }
}

impl Agent {
    /// Recompute the shield from current health; returns whether it is up
    pub fn refresh_shield(&mut self, tactics: &TacticsConfig) -> bool {
        let ratio = self.health_ratio();
        match &mut self.archetype_state {
            ArchetypeState::Shielded { active, opacity } => {
                (*active, *opacity) = shield_state(ratio, tactics);
                *active
            }
            _ => false,
        }
    }
}

impl SquadMember for Agent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        Agent::is_alive(self)
    }

    fn ai_state(&self) -> &AgentAIState {
        &self.ai
    }

    fn ai_state_mut(&mut self) -> &mut AgentAIState {
        &mut self.ai
    }
}
